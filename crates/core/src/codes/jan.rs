//! JAN → ISBN-13 recovery
//!
//! A Japanese book JAN carries the ISBN's digits but not unambiguously: the
//! publisher-code boundary is lost. Conversion is therefore a search over a
//! fixed, ordered list of hypotheses, and the first candidate whose checksum
//! holds wins. A checksum match is necessary but not sufficient, so a result
//! is a plausible ISBN rather than a proven inverse.

use super::checksum::{compute_check_digit, is_valid_isbn13};
use super::classify::JAN_PREFIXES;
use std::fmt;

/// Publisher-code digits in trial order
const PUBLISHER_DIGITS: [char; 10] = ['4', '0', '1', '2', '3', '5', '6', '7', '8', '9'];

/// Prefixes eligible for the 979 alternate-prefix hypothesis
const ALTERNATE_PREFIX_ELIGIBLE: [&str; 3] = ["192", "198", "199"];

/// Which rule produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypothesisRule {
    /// `978` + JAN digits `[3, 12)`
    FixedOffsetA,
    /// `978` + JAN digits `[4, 13)`
    FixedOffsetB,
    /// Offset A's digits behind the given EAN prefix (`979` tried before `978`)
    AlternatePrefix(&'static str),
    /// `978` + publisher digit + JAN digits `[4, 12)`
    PublisherDigit(char),
}

impl fmt::Display for HypothesisRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedOffsetA => write!(f, "fixed offset [3,12)"),
            Self::FixedOffsetB => write!(f, "fixed offset [4,13)"),
            Self::AlternatePrefix(prefix) => write!(f, "alternate prefix {}", prefix),
            Self::PublisherDigit(d) => write!(f, "publisher digit {}", d),
        }
    }
}

/// One conversion candidate: a 13-digit string with a computed check digit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis {
    pub rule: HypothesisRule,
    pub candidate: String,
}

impl Hypothesis {
    fn from_body(rule: HypothesisRule, body: String) -> Option<Self> {
        let check = compute_check_digit(&body)?;
        Some(Self {
            rule,
            candidate: format!("{}{}", body, check),
        })
    }
}

/// Lists the conversion candidates for `jan` in trial order.
///
/// Yields nothing unless `jan` is 13 ASCII digits with a Japanese book prefix.
/// At most 14 candidates are produced.
pub fn jan_hypotheses(jan: &str) -> impl Iterator<Item = Hypothesis> {
    let mut hypotheses = Vec::new();

    if jan.len() != 13 || !jan.bytes().all(|b| b.is_ascii_digit()) {
        return hypotheses.into_iter();
    }

    let prefix = &jan[..3];
    if !JAN_PREFIXES.contains(&prefix) {
        return hypotheses.into_iter();
    }

    let offset_a = &jan[3..12];
    let offset_b = &jan[4..13];
    let publisher_tail = &jan[4..12];

    hypotheses.extend(Hypothesis::from_body(
        HypothesisRule::FixedOffsetA,
        format!("978{}", offset_a),
    ));
    hypotheses.extend(Hypothesis::from_body(
        HypothesisRule::FixedOffsetB,
        format!("978{}", offset_b),
    ));

    if ALTERNATE_PREFIX_ELIGIBLE.contains(&prefix) {
        for ean_prefix in ["979", "978"] {
            hypotheses.extend(Hypothesis::from_body(
                HypothesisRule::AlternatePrefix(ean_prefix),
                format!("{}{}", ean_prefix, offset_a),
            ));
        }
    }

    for digit in PUBLISHER_DIGITS {
        hypotheses.extend(Hypothesis::from_body(
            HypothesisRule::PublisherDigit(digit),
            format!("978{}{}", digit, publisher_tail),
        ));
    }

    hypotheses.into_iter()
}

/// Recovers a plausible ISBN-13 from a Japanese book JAN.
///
/// Returns the first hypothesis whose candidate passes [`is_valid_isbn13`], or
/// `None` when the input is not a Japanese book JAN or nothing validates.
/// Absence of a result is an ordinary outcome, not an error.
pub fn convert_jan_to_isbn(jan: &str) -> Option<String> {
    let found = jan_hypotheses(jan).find(|h| is_valid_isbn13(&h.candidate));

    match &found {
        Some(h) => log::debug!("JAN {} converted via {}: {}", jan, h.rule, h.candidate),
        None => log::debug!("JAN {} produced no valid ISBN-13", jan),
    }

    found.map(|h| h.candidate)
}
