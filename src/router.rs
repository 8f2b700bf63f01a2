use std::path::Path;

use reqwest::Url;

use crate::error::Error;
use crate::error::Error::MissingDatasetIdError;
use crate::model::Distribution;

const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_FILENAME_CHARS: usize = 200;
const DATASET_SEGMENT: &str = "/dataset/";

/// Format family of a distribution, decided by [`Kind::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Csv,
    Zip,
    Api,
    Other,
}

/// Classification rules, evaluated in order. The first matching rule wins and anything left
/// over is [`Kind::Other`].
const RULES: &[(Kind, fn(&Distribution) -> bool)] = &[
    (Kind::Csv, is_csv),
    (Kind::Zip, is_zip),
    (Kind::Api, is_api),
];

fn is_csv(d: &Distribution) -> bool {
    d.media_type == "text/csv" || d.format.eq_ignore_ascii_case("csv")
}

fn is_zip(d: &Distribution) -> bool {
    d.media_type == "application/zip" || d.format.eq_ignore_ascii_case("zip")
}

fn is_api(d: &Distribution) -> bool {
    d.format == "API"
}

impl Kind {
    pub fn classify(distribution: &Distribution) -> Kind {
        RULES
            .iter()
            .find(|(_, matches)| matches(distribution))
            .map(|(kind, _)| *kind)
            .unwrap_or(Kind::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Stream one URL straight to disk.
    FlatFile { url: String },
    /// Page through the data API of the given dataset id.
    PaginatedTable { dataset_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub strategy: Strategy,
    pub file_name: String,
}

/// Decides how a distribution is fetched and under which file name.
///
/// `Ok(None)` means there is nothing to fetch (no usable URL). An API distribution whose URLs
/// carry no `/dataset/{id}` segment is an error instead.
pub fn route(distribution: &Distribution) -> Result<Option<Route>, Error> {
    let kind = Kind::classify(distribution);

    let route = match kind {
        Kind::Api => {
            let dataset_id = distribution
                .api_urls()
                .find_map(dataset_id_from_url)
                .ok_or_else(|| {
                    MissingDatasetIdError(format!(
                        "No dataset id found in the URLs of API distribution `{title}`",
                        title = distribution.title
                    ))
                })?;
            Some(Route {
                strategy: Strategy::PaginatedTable { dataset_id: dataset_id.to_string() },
                file_name: file_name(distribution, ".json"),
            })
        }
        Kind::Csv | Kind::Zip | Kind::Other => distribution.file_url().map(|url| {
            let extension = match kind {
                Kind::Csv => ".csv".to_string(),
                Kind::Zip => ".zip".to_string(),
                _ => fallback_extension(url, &distribution.format),
            };
            Route {
                strategy: Strategy::FlatFile { url: url.to_string() },
                file_name: file_name(distribution, &extension),
            }
        }),
    };

    Ok(route)
}

/// Replaces characters that are not allowed in file names and caps the length.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Directory name of a dataset below the output directory.
pub fn dataset_dir_name(identifier: &str, title: &str) -> String {
    sanitize_filename(&format!("{identifier}_{title}"))
}

fn file_name(distribution: &Distribution, extension: &str) -> String {
    let mut parts = vec![sanitize_filename(&distribution.title)];
    if !distribution.temporal.is_empty() {
        parts.push(sanitize_filename(&distribution.temporal));
    }
    format!("{}{extension}", parts.join("_"))
}

/// Path component following `/dataset/`, e.g. `abc` for `.../dataset/abc/data`.
fn dataset_id_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once(DATASET_SEGMENT)?;
    let id = rest.split(&['/', '?', '#'][..]).next().unwrap_or_default();
    Some(id).filter(|id| !id.is_empty())
}

/// Extension of the last URL path segment, else `.` + the lowercased format. A path ending in
/// `/` has no extension. The result is sanitized, it must never add a path component.
fn fallback_extension(url: &str, format: &str) -> String {
    let extension = Url::parse(url)
        .ok()
        .filter(|url| !url.path().ends_with('/'))
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| !ext.is_empty())
                .map(|ext| format!(".{ext}"))
        })
        .unwrap_or_else(|| format!(".{}", format.to_lowercase()));
    sanitize_filename(&extension)
}
