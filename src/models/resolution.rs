use serde::Serialize;

use super::CatalogRecord;

/// Why a candidate title could not be turned into a catalog record
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    #[error("candidate title is empty")]
    EmptyInput,

    #[error("no catalog search matched the title or its variants")]
    NoSearchMatch,

    #[error("catalog reported the selected title as not found")]
    DetailFetchFailed,

    /// Transport-level failure; behaves like `NoSearchMatch` for control flow
    #[error("catalog provider unavailable")]
    ProviderUnavailable,
}

/// Outcome of resolving one free-text title against the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(CatalogRecord),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// The resolved record, if any
    pub fn into_record(self) -> Option<CatalogRecord> {
        match self {
            Resolution::Resolved(record) => Some(record),
            Resolution::Unresolved(_) => None,
        }
    }
}
