use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::error::Error::MalformedDatasetError;

const UNKNOWN_DATASET_TITLE: &str = "Unknown Dataset";
const UNKNOWN_DATASET_ID: &str = "unknown-id";
const UNKNOWN: &str = "unknown";

/// The catalog document (`data.json`). Dataset entries stay raw until they are processed so
/// that one malformed entry only costs that dataset.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dataset: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default = "unknown_dataset_id", deserialize_with = "null_as_unknown_dataset_id")]
    pub identifier: String,
    #[serde(default = "unknown_dataset_title", deserialize_with = "null_as_unknown_dataset_title")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub distribution: Vec<Distribution>,
}

impl Dataset {
    pub fn from_value(value: &Value) -> Result<Dataset, Error> {
        Dataset::deserialize(value).map_err(|e| MalformedDatasetError(format!("Malformed dataset entry: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub title: String,
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub format: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temporal: String,
    #[serde(default, rename = "downloadURL", deserialize_with = "null_as_default")]
    pub download_url: String,
    #[serde(default, rename = "accessURL", deserialize_with = "null_as_default")]
    pub access_url: String,
}

impl Distribution {
    /// Where a file distribution is fetched from: the download URL, else the access URL.
    pub fn file_url(&self) -> Option<&str> {
        non_empty(&self.download_url).or_else(|| non_empty(&self.access_url))
    }

    /// URLs that may carry the `/dataset/{id}` segment of an API distribution, access URL first.
    pub fn api_urls(&self) -> impl Iterator<Item = &str> {
        [self.access_url.as_str(), self.download_url.as_str()]
            .into_iter()
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TableStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_rows: u64,
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn unknown_dataset_id() -> String {
    UNKNOWN_DATASET_ID.to_string()
}

fn unknown_dataset_title() -> String {
    UNKNOWN_DATASET_TITLE.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown))
}

fn null_as_unknown_dataset_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_dataset_id))
}

fn null_as_unknown_dataset_title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_dataset_title))
}

#[cfg(test)]
pub(crate) fn distribution(title: &str, format: &str, temporal: &str) -> Distribution {
    Distribution {
        title: title.to_string(),
        format: format.to_string(),
        media_type: String::new(),
        temporal: temporal.to_string(),
        download_url: String::new(),
        access_url: String::new(),
    }
}
