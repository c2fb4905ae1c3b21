//! Sequential execution of lookup plans

use crate::{GoogleBooksSource, MetadataSource, NdlSource, OpenBdSource};
use shelfscan_config::LookupConfig;
use shelfscan_core::{normalize_code, resolve_lookup_plan, BookRecord, LookupPlan, LookupSource};
use std::collections::HashMap;
use std::fmt;

/// What happened to one planned attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStatus {
    /// The source returned a record; execution stopped here
    Found,
    /// The source had no record
    Empty,
    /// Transport or parse failure; treated as "nothing"
    Failed(String),
    /// No source is registered for this step
    Skipped,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::Empty => write!(f, "no record"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub source: LookupSource,
    /// Display name of the source that served the attempt
    pub provider: Option<String>,
    pub code: String,
    pub status: AttemptStatus,
}

/// Result of running a plan
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub plan: LookupPlan,
    pub record: Option<BookRecord>,
    /// One report per executed attempt, in order
    pub attempts: Vec<AttemptReport>,
}

impl LookupOutcome {
    pub fn found(&self) -> bool {
        self.record.is_some()
    }

    /// Name of the source that produced the record
    pub fn provider(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.status == AttemptStatus::Found)
            .and_then(|a| a.provider.as_deref())
    }
}

/// Runs lookup plans against registered sources
///
/// Attempts run one at a time in plan order. Each attempt is tried at most
/// once; a failure is logged and execution moves to the next attempt.
#[derive(Default)]
pub struct LookupExecutor {
    sources: HashMap<LookupSource, Box<dyn MetadataSource>>,
}

impl LookupExecutor {
    /// Creates an executor with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Google Books, openBD and NDL wired from configuration
    pub fn from_config(config: &LookupConfig) -> Self {
        Self::new()
            .with_source(
                LookupSource::IsbnCatalog,
                Box::new(GoogleBooksSource::from_config(config)),
            )
            .with_source(
                LookupSource::JanCatalog,
                Box::new(OpenBdSource::from_config(config)),
            )
            .with_source(
                LookupSource::SecondaryIsbnCatalog,
                Box::new(NdlSource::from_config(config)),
            )
    }

    /// Registers (or replaces) the source serving `kind`
    pub fn with_source(mut self, kind: LookupSource, source: Box<dyn MetadataSource>) -> Self {
        self.sources.insert(kind, source);
        self
    }

    pub fn source(&self, kind: LookupSource) -> Option<&dyn MetadataSource> {
        self.sources.get(&kind).map(|s| s.as_ref())
    }

    /// Normalizes `code`, builds its plan and executes it
    pub fn lookup(&self, code: &str) -> LookupOutcome {
        let code = normalize_code(code);
        self.execute(&resolve_lookup_plan(&code))
    }

    /// Executes `plan`, stopping at the first record
    pub fn execute(&self, plan: &LookupPlan) -> LookupOutcome {
        let mut attempts = Vec::with_capacity(plan.len());
        let mut record = None;

        for attempt in plan {
            let Some(source) = self.sources.get(&attempt.source) else {
                log::debug!("No source registered for {}, skipping", attempt.source);
                attempts.push(AttemptReport {
                    source: attempt.source,
                    provider: None,
                    code: attempt.code.clone(),
                    status: AttemptStatus::Skipped,
                });
                continue;
            };

            let provider = source.metadata().name;
            if !source.is_available() {
                log::warn!("{} is unavailable, skipping {}", provider, attempt.code);
                attempts.push(AttemptReport {
                    source: attempt.source,
                    provider: Some(provider),
                    code: attempt.code.clone(),
                    status: AttemptStatus::Skipped,
                });
                continue;
            }
            log::debug!("Looking up {} via {}", attempt.code, provider);

            let status = match source.lookup(&attempt.code) {
                Ok(Some(mut found)) => {
                    if found.source.is_none() {
                        found.source = Some(provider.clone());
                    }
                    record = Some(found);
                    AttemptStatus::Found
                }
                Ok(None) => AttemptStatus::Empty,
                Err(e) => {
                    log::warn!("{} lookup for {} failed: {}", provider, attempt.code, e);
                    AttemptStatus::Failed(e.to_string())
                }
            };

            attempts.push(AttemptReport {
                source: attempt.source,
                provider: Some(provider),
                code: attempt.code.clone(),
                status,
            });

            if record.is_some() {
                break;
            }
        }

        if record.is_none() {
            log::info!("No metadata found for {}", plan_code(plan));
        }

        LookupOutcome {
            plan: plan.clone(),
            record,
            attempts,
        }
    }
}

fn plan_code(plan: &LookupPlan) -> &str {
    plan.iter().next().map(|a| a.code.as_str()).unwrap_or_default()
}
