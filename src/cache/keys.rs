//! Cache key construction.
//!
//! Every key is prefixed with its data class so each class can carry its own
//! TTL policy. A key deterministically belongs to exactly one class; the
//! prefixes are disjoint, so classes cannot collide.

use sha2::{Digest, Sha256};

use crate::metadata::provider::TitleKind;

/// Genre id-to-name table for one media kind.
pub fn genres(kind: TitleKind) -> String {
    format!("genres:{}", kind.as_str())
}

/// Shared popular/trending listing (no per-criteria variation).
pub fn popular() -> String {
    "search:popular".to_string()
}

/// Title-search hit list for one media kind.
pub fn title_search(kind: TitleKind, title: &str) -> String {
    format!("search:title:{}:{}", kind.as_str(), normalize(title))
}

/// Discovery hit list, keyed by a hash of the normalized server-side filters.
pub fn discover(kind: TitleKind, genre: Option<&str>, actor: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str());
    hasher.update(b"\x1f");
    hasher.update(normalize(genre.unwrap_or_default()));
    hasher.update(b"\x1f");
    hasher.update(normalize(actor.unwrap_or_default()));
    format!("search:discover:{}", hex::encode(hasher.finalize()))
}

/// Primary-provider cast listing for one title.
pub fn credits(kind: TitleKind, id: u64) -> String {
    format!("credits:{}:{}", kind.as_str(), id)
}

/// Primary-to-secondary cross-reference (external id, possibly absent).
pub fn xref(kind: TitleKind, id: u64) -> String {
    format!("xref:{}:{}", kind.as_str(), id)
}

/// Secondary-provider record keyed by external id.
pub fn secondary(external_id: &str) -> String {
    format!("omdb:{}", external_id)
}

/// Secondary-provider record keyed by title and year, for titles without a
/// usable external id.
pub fn secondary_by_title(title: &str, year: Option<u16>) -> String {
    match year {
        Some(y) => format!("omdb:t:{}:{}", normalize(title), y),
        None => format!("omdb:t:{}", normalize(title)),
    }
}

/// Lowercase and collapse internal whitespace so equivalent queries share a
/// cache entry.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_whitespace_and_case() {
        assert_eq!(normalize("  The  Dark   Knight "), "the dark knight");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn equivalent_titles_share_a_key() {
        assert_eq!(
            title_search(TitleKind::Movie, "Dune  Part Two"),
            title_search(TitleKind::Movie, "dune part two"),
        );
    }

    #[test]
    fn classes_have_disjoint_prefixes() {
        let keys = [
            genres(TitleKind::Movie),
            popular(),
            title_search(TitleKind::Movie, "x"),
            discover(TitleKind::Movie, Some("Action"), None),
            credits(TitleKind::Movie, 1),
            xref(TitleKind::Movie, 1),
            secondary("tt1"),
        ];
        for (i, a) in keys.iter().enumerate() {
            for (j, b) in keys.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn discover_key_is_deterministic_and_filter_sensitive() {
        let a = discover(TitleKind::Series, Some("Drama"), Some("Bryan Cranston"));
        let b = discover(TitleKind::Series, Some("drama"), Some("Bryan  Cranston"));
        let c = discover(TitleKind::Series, Some("Comedy"), Some("Bryan Cranston"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn secondary_title_key_includes_year_when_known() {
        assert_eq!(
            secondary_by_title("Heat", Some(1995)),
            "omdb:t:heat:1995"
        );
        assert_eq!(secondary_by_title("Heat", None), "omdb:t:heat");
    }
}
