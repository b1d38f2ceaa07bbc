//! Fetch strategy selection.
//!
//! The strategy is an explicit enumerated tag computed once from which
//! criteria fields are populated -- a pure, total function, independent of
//! field values. Precedence order matters: first match wins.

use super::criteria::SearchCriteria;

/// The fetch algorithm chosen from the shape of the incoming criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Title present, no other filters: direct title search.
    TitleOnly,
    /// Title plus at least one of actors/genre/type: title search followed
    /// by residual filtering.
    TitleWithFilters,
    /// No title but at least one filter: server-side discovery plus residual
    /// filtering.
    FiltersOnly,
    /// No criteria at all: shared popular/trending listing.
    PopularFallback,
}

impl Strategy {
    /// Select the strategy for a set of criteria.
    pub fn select(criteria: &SearchCriteria) -> Self {
        match (criteria.has_title(), criteria.has_filters()) {
            (true, false) => Strategy::TitleOnly,
            (true, true) => Strategy::TitleWithFilters,
            (false, true) => Strategy::FiltersOnly,
            (false, false) => Strategy::PopularFallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::criteria::MediaKind;

    #[test]
    fn title_only() {
        let criteria = SearchCriteria {
            title: Some("Inception".to_string()),
            ..Default::default()
        };
        assert_eq!(Strategy::select(&criteria), Strategy::TitleOnly);
    }

    #[test]
    fn title_with_each_filter_kind() {
        let with_genre = SearchCriteria {
            title: Some("Inception".to_string()),
            genre: Some("Sci-Fi".to_string()),
            ..Default::default()
        };
        let with_actor = SearchCriteria {
            title: Some("Inception".to_string()),
            actors: vec!["Leonardo DiCaprio".to_string()],
            ..Default::default()
        };
        let with_type = SearchCriteria {
            title: Some("Inception".to_string()),
            kind: MediaKind::Movie,
            ..Default::default()
        };
        assert_eq!(Strategy::select(&with_genre), Strategy::TitleWithFilters);
        assert_eq!(Strategy::select(&with_actor), Strategy::TitleWithFilters);
        assert_eq!(Strategy::select(&with_type), Strategy::TitleWithFilters);
    }

    #[test]
    fn filters_only() {
        let criteria = SearchCriteria {
            genre: Some("Drama".to_string()),
            ..Default::default()
        };
        assert_eq!(Strategy::select(&criteria), Strategy::FiltersOnly);
    }

    #[test]
    fn empty_criteria_fall_back_to_popular() {
        assert_eq!(
            Strategy::select(&SearchCriteria::default()),
            Strategy::PopularFallback
        );
    }

    #[test]
    fn selection_ignores_field_values() {
        // Same shape, wildly different values: same strategy.
        let a = SearchCriteria {
            title: Some("a".to_string()),
            ..Default::default()
        };
        let b = SearchCriteria {
            title: Some("Batman v Superman: Dawn of Justice".to_string()),
            ..Default::default()
        };
        assert_eq!(Strategy::select(&a), Strategy::select(&b));
    }
}
