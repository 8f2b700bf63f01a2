use crate::model::Distribution;
use crate::temporal::{extract_latest_token, TemporalToken};

/// Outcome of picking the current distributions of one dataset.
#[derive(Debug, PartialEq)]
pub enum Latest<'a> {
    /// Every distribution carrying the newest token, in catalog order. Undated siblings are
    /// left out.
    Dated {
        token: TemporalToken,
        distributions: Vec<&'a Distribution>,
    },
    /// Nothing in the group could be placed in time, so the whole group is kept.
    Undated(Vec<&'a Distribution>),
}

impl<'a> Latest<'a> {
    pub fn into_distributions(self) -> Vec<&'a Distribution> {
        match self {
            Latest::Dated { distributions, .. } => distributions,
            Latest::Undated(distributions) => distributions,
        }
    }
}

pub fn select_latest(distributions: &[Distribution]) -> Latest<'_> {
    let tokens: Vec<Option<TemporalToken>> = distributions
        .iter()
        .map(|d| extract_latest_token(&d.temporal))
        .collect();

    match tokens.iter().flatten().max().cloned() {
        None => Latest::Undated(distributions.iter().collect()),
        Some(max_token) => Latest::Dated {
            distributions: distributions
                .iter()
                .zip(&tokens)
                .filter(|(_, token)| matches!(token, Some(t) if *t == max_token))
                .map(|(distribution, _)| distribution)
                .collect(),
            token: max_token,
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::latest::{select_latest, Latest};
    use crate::model::{distribution, Distribution};

    fn titles(distributions: &[&Distribution]) -> Vec<String> {
        distributions.iter().map(|d| d.title.clone()).collect()
    }

    #[test]
    fn given_distinct_dates_when_select_latest_then_only_newest() {
        // Given
        let distributions = vec![
            distribution("Old Data", "CSV", "2023-01-01"),
            distribution("Latest Data", "CSV", "2024-01-01"),
            distribution("Middle Data", "CSV", "2023-06-01"),
        ];

        // When
        let latest = select_latest(&distributions);

        // Then
        assert_eq!(titles(&latest.into_distributions()), vec!["Latest Data"]);
    }

    #[test]
    fn given_several_formats_sharing_newest_date_when_select_latest_then_keep_all_of_them() {
        // Given
        let distributions = vec![
            distribution("Old CSV", "CSV", "2023-01-01"),
            distribution("Latest CSV", "CSV", "2024-01-01"),
            distribution("Latest API", "API", "2024-01-01"),
            distribution("Latest ZIP", "ZIP", "2024-01-01"),
        ];

        // When
        let latest = select_latest(&distributions);

        // Then
        let selected = latest.into_distributions();
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|d| d.temporal == "2024-01-01"));
        assert_eq!(titles(&selected), vec!["Latest CSV", "Latest API", "Latest ZIP"]);
    }

    #[test]
    fn given_date_ranges_when_select_latest_then_compare_range_ends() {
        // Given
        let distributions = vec![
            distribution("Q1 2023", "CSV", "2023-01-01 to 2023-03-31"),
            distribution("Q2 2024", "CSV", "2024-04-01 to 2024-06-30"),
            distribution("Q3 2024", "CSV", "2024-07-01 to 2024-09-30"),
        ];

        // When
        let latest = select_latest(&distributions);

        // Then
        assert_eq!(titles(&latest.into_distributions()), vec!["Q3 2024"]);
    }

    #[test]
    fn given_no_distributions_when_select_latest_then_nothing() {
        // When
        let latest = select_latest(&[]);

        // Then
        assert!(latest.into_distributions().is_empty());
    }

    #[test]
    fn given_only_undated_distributions_when_select_latest_then_keep_whole_group_in_order() {
        // Given
        let distributions = vec![
            distribution("B", "CSV", ""),
            distribution("A", "API", "ongoing"),
            distribution("C", "ZIP", ""),
        ];

        // When
        let latest = select_latest(&distributions);

        // Then
        assert!(matches!(latest, Latest::Undated(_)));
        assert_eq!(titles(&latest.into_distributions()), vec!["B", "A", "C"]);
    }

    #[test]
    fn given_dated_and_undated_distributions_when_select_latest_then_drop_undated() {
        // Given
        let distributions = vec![
            distribution("2023", "CSV", "2023-01-01"),
            distribution("no date", "CSV", ""),
            distribution("2024", "CSV", "2024-01-01"),
        ];

        // When
        let latest = select_latest(&distributions);

        // Then
        match latest {
            Latest::Dated { token, distributions } => {
                assert_eq!(token.to_string(), "2024-01-01");
                assert_eq!(titles(&distributions), vec!["2024"]);
            }
            Latest::Undated(_) => panic!("expected a dated selection"),
        }
    }

    #[test]
    fn given_year_and_date_tokens_when_select_latest_then_compare_as_strings() {
        // Given
        let distributions = vec![
            distribution("year", "CSV", "2024"),
            distribution("date", "CSV", "2024-01-01"),
        ];

        // When
        let latest = select_latest(&distributions);

        // Then
        assert_eq!(titles(&latest.into_distributions()), vec!["date"]);
    }
}
