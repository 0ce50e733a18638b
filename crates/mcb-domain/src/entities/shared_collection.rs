//! Shared (cross-case) collections (§3, §6.4).

use serde::{Deserialize, Serialize};

/// A named collection whose records have no `caseName` filter (statutes,
/// regulations). The set is closed and configured at startup; insertion
/// requires an admin capability the document pipeline never holds (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedCollection {
    pub name: String,
}

impl SharedCollection {
    /// Default shared collections named in §6.4.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        [
            "florida_statutes",
            "fmcsr_regulations",
            "federal_rules",
            "case_law_precedents",
        ]
        .into_iter()
        .map(|name| Self { name: name.to_owned() })
        .collect()
    }
}
