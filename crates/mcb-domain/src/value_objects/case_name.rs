//! Case identity value object and the collection-naming rules that enforce isolation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque case identifier. Every persisted record carries one (§3).
///
/// Construction validates that the name is non-empty and safe to use as a
/// collection-name prefix: ASCII alphanumeric plus `-`/`_`, no leading digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseName(String);

impl CaseName {
    /// Validate and construct a `CaseName`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputInvalid`] if `raw` is empty or contains characters
    /// that would make it unsafe as a vector-collection-name prefix.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(Error::input_invalid("caseName cannot be empty"));
        }
        let mut chars = raw.chars();
        let first = chars.next().expect("non-empty checked above");
        if first.is_ascii_digit() {
            return Err(Error::input_invalid(format!(
                "caseName '{raw}' must not start with a digit"
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::input_invalid(format!(
                "caseName '{raw}' must be ASCII alphanumeric, '-' or '_'"
            )));
        }
        Ok(Self(raw))
    }

    /// Borrow the raw case name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of this case's primary chunk collection.
    #[must_use]
    pub fn chunks_collection(&self) -> String {
        format!("{}_chunks", self.0)
    }

    /// Name of this case's hybrid (dense + sparse) chunk collection.
    #[must_use]
    pub fn hybrid_collection(&self) -> String {
        format!("{}_chunks_hybrid", self.0)
    }

    /// Name of this case's facts collection.
    #[must_use]
    pub fn facts_collection(&self) -> String {
        format!("{}_facts", self.0)
    }

    /// Name of one of this case's auxiliary collections (depositions/exhibits/timeline).
    #[must_use]
    pub fn auxiliary_collection(&self, kind: AuxiliaryCollection) -> String {
        format!("{}_{}", self.0, kind.suffix())
    }

    /// True if `collection_name` belongs to this case (starts with the exact case name
    /// followed by `_`), enforcing the case-isolation invariant from §4.6.
    #[must_use]
    pub fn owns_collection(&self, collection_name: &str) -> bool {
        collection_name
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl fmt::Display for CaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Auxiliary per-case collections named in §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuxiliaryCollection {
    /// Deposition transcripts
    Depositions,
    /// Exhibits
    Exhibits,
    /// Timeline entries
    Timeline,
}

impl AuxiliaryCollection {
    fn suffix(self) -> &'static str {
        match self {
            Self::Depositions => "depositions",
            Self::Exhibits => "exhibits",
            Self::Timeline => "timeline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(CaseName::parse("").is_err());
    }

    #[test]
    fn rejects_leading_digit() {
        assert!(CaseName::parse("1case").is_err());
    }

    #[test]
    fn rejects_unsafe_characters() {
        assert!(CaseName::parse("case/../etc").is_err());
    }

    #[test]
    fn accepts_reasonable_name() {
        let c = CaseName::parse("smith_v_acme-2024").expect("valid");
        assert_eq!(c.as_str(), "smith_v_acme-2024");
    }

    #[test]
    fn owns_collection_requires_exact_prefix_and_separator() {
        let c = CaseName::parse("case_a").expect("valid");
        assert!(c.owns_collection("case_a_chunks"));
        assert!(!c.owns_collection("case_ab_chunks"));
        assert!(!c.owns_collection("florida_statutes"));
    }

    #[test]
    fn collection_names_match_spec() {
        let c = CaseName::parse("case1").expect("valid");
        assert_eq!(c.chunks_collection(), "case1_chunks");
        assert_eq!(c.hybrid_collection(), "case1_chunks_hybrid");
        assert_eq!(c.facts_collection(), "case1_facts");
        assert_eq!(
            c.auxiliary_collection(AuxiliaryCollection::Exhibits),
            "case1_exhibits"
        );
    }
}
