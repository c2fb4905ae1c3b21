//! Lookup planning
//!
//! Decides which external metadata catalogs to ask about a scanned code and
//! in what order. Building a plan never fails and never touches the network;
//! the caller executes the attempts in sequence and stops at the first record.

use crate::codes::{classify, CodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// External metadata catalog an attempt is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    /// Japanese book distribution catalog keyed by JAN/ISBN (openBD)
    JanCatalog,
    /// General ISBN catalog (Google Books)
    IsbnCatalog,
    /// Fallback ISBN catalog (National Diet Library)
    SecondaryIsbnCatalog,
}

impl LookupSource {
    /// Every source, generic ISBN catalog first
    pub const ALL: [LookupSource; 3] = [
        LookupSource::IsbnCatalog,
        LookupSource::JanCatalog,
        LookupSource::SecondaryIsbnCatalog,
    ];
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JanCatalog => write!(f, "JAN catalog"),
            Self::IsbnCatalog => write!(f, "ISBN catalog"),
            Self::SecondaryIsbnCatalog => write!(f, "secondary ISBN catalog"),
        }
    }
}

/// A single planned lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupAttempt {
    pub source: LookupSource,
    pub code: String,
}

impl LookupAttempt {
    fn new(source: LookupSource, code: &str) -> Self {
        Self {
            source,
            code: code.to_string(),
        }
    }
}

/// Ordered lookups for one code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupPlan {
    /// Classification the plan was derived from
    pub kind: CodeKind,
    pub attempts: Vec<LookupAttempt>,
}

impl LookupPlan {
    /// Iterates attempts in execution order
    pub fn iter(&self) -> impl Iterator<Item = &LookupAttempt> {
        self.attempts.iter()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Position of the first attempt against `source`, if planned
    pub fn position_of(&self, source: LookupSource) -> Option<usize> {
        self.attempts.iter().position(|a| a.source == source)
    }
}

impl<'a> IntoIterator for &'a LookupPlan {
    type Item = &'a LookupAttempt;
    type IntoIter = std::slice::Iter<'a, LookupAttempt>;

    fn into_iter(self) -> Self::IntoIter {
        self.attempts.iter()
    }
}

/// Builds the lookup plan for `code`.
///
/// | kind            | attempts                                          |
/// |-----------------|---------------------------------------------------|
/// | Japanese JAN    | JAN catalog, ISBN catalog                         |
/// | ISBN-13/ISBN-10 | ISBN catalog, secondary ISBN catalog              |
/// | Unknown         | ISBN catalog, JAN catalog, secondary ISBN catalog |
///
/// The secondary ISBN catalog is the last resort for every code that is not a
/// JAN. Every attempt carries the raw code. JAN→ISBN conversion is not part of
/// dispatch.
pub fn resolve_lookup_plan(code: &str) -> LookupPlan {
    let kind = classify(code);

    let sources: &[LookupSource] = match kind {
        CodeKind::JapaneseJan => &[LookupSource::JanCatalog, LookupSource::IsbnCatalog],
        CodeKind::Isbn13 | CodeKind::Isbn10 => &[
            LookupSource::IsbnCatalog,
            LookupSource::SecondaryIsbnCatalog,
        ],
        CodeKind::Unknown => &[
            LookupSource::IsbnCatalog,
            LookupSource::JanCatalog,
            LookupSource::SecondaryIsbnCatalog,
        ],
    };

    let attempts = sources
        .iter()
        .map(|source| LookupAttempt::new(*source, code))
        .collect();

    log::debug!("Lookup plan for {} ({}): {:?}", code, kind, sources);

    LookupPlan { kind, attempts }
}
