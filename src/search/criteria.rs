//! Search criteria and the canonical response entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metadata::provider::TitleKind;

/// Media type filter as supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    #[default]
    Any,
}

impl MediaKind {
    /// The concrete kinds this filter fans out to, in query order.
    pub fn kinds(&self) -> &'static [TitleKind] {
        match self {
            MediaKind::Movie => &[TitleKind::Movie],
            MediaKind::Series => &[TitleKind::Series],
            MediaKind::Any => &[TitleKind::Movie, TitleKind::Series],
        }
    }

    /// Whether a concrete kind satisfies this filter. `Any` always matches.
    pub fn matches(&self, kind: TitleKind) -> bool {
        match self {
            MediaKind::Movie => kind == TitleKind::Movie,
            MediaKind::Series => kind == TitleKind::Series,
            MediaKind::Any => true,
        }
    }
}

/// Already-validated search criteria, constructed once per request.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub title: Option<String>,
    pub actors: Vec<String>,
    pub kind: MediaKind,
    pub genre: Option<String>,
}

impl SearchCriteria {
    /// Whether a non-blank title was supplied.
    pub fn has_title(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Whether any non-title filter (actors, genre, or a concrete type) was
    /// supplied.
    pub fn has_filters(&self) -> bool {
        !self.actors.is_empty()
            || self.genre.as_deref().is_some_and(|g| !g.trim().is_empty())
            || self.kind != MediaKind::Any
    }
}

/// Which provider(s) contributed to a merged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Primary,
    Secondary,
    Merged,
}

/// The one entity crossing the system boundary: a fully merged movie or
/// series record. Immutable after construction.
///
/// Serialization is the wire contract: `type` carries the concrete kind,
/// `source` carries provenance, and `ratings` is a string-keyed object
/// (ordered map, so repeated serialization is byte-identical).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMovie {
    /// External id when known, otherwise the Primary provider id.
    pub id: String,
    pub title: String,
    pub year: Option<u16>,
    #[serde(rename = "type")]
    pub kind: TitleKind,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub director: Option<String>,
    pub runtime: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
    pub ratings: BTreeMap<String, String>,
    #[serde(rename = "source")]
    pub provenance: Provenance,
}
