//! Residual client-side predicate evaluation.
//!
//! [`matches`] is the correctness fallback for every criterion a provider's
//! query API cannot express faithfully. It is pure, synchronous, and total:
//! it never fails and never mutates its input.

use super::criteria::{CanonicalMovie, SearchCriteria};

/// Whether a merged record satisfies the residual criteria.
///
/// Semantics:
/// - `type`: exact match; `any` short-circuits to true.
/// - `genre`: case-insensitive membership test against the record's genres.
/// - `actors`: satisfied if at least one requested actor name matches any of
///   the record's actors (case-insensitive, whitespace-normalized, substring
///   or exact). This is an any-of contract, not a strict subset requirement.
pub fn matches(movie: &CanonicalMovie, criteria: &SearchCriteria) -> bool {
    if !criteria.kind.matches(movie.kind) {
        return false;
    }

    if let Some(genre) = criteria.genre.as_deref() {
        let wanted = genre.trim();
        if !wanted.is_empty()
            && !movie
                .genres
                .iter()
                .any(|g| g.trim().eq_ignore_ascii_case(wanted))
        {
            return false;
        }
    }

    if !criteria.actors.is_empty() {
        let found = criteria.actors.iter().any(|wanted| {
            let wanted = normalize(wanted);
            !wanted.is_empty()
                && movie
                    .actors
                    .iter()
                    .any(|actor| normalize(actor).contains(&wanted))
        });
        if !found {
            return false;
        }
    }

    true
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
