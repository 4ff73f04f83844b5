//! Core type definitions for The Consult client.
//!
//! Defines the ask request/response shapes exchanged with the backend,
//! the raw citation records it returns, and the normalized study records
//! the UI renders.

use serde::{Deserialize, Serialize};

/// Sentinel filter value that disables a criterion.
pub const ALL_ARTICLES: &str = "All Articles";

/// Article-impact filter tag for studies published in a top journal.
pub const TOP_JOURNAL: &str = "Top Journal";
/// Article-impact filter tag for highly cited studies.
pub const HIGHLY_CITED: &str = "Highly Cited";
/// Publication-date filter window of one year.
pub const WITHIN_LAST_YEAR: &str = "Within last year";
/// Publication-date filter window of five years.
pub const WITHIN_LAST_5_YEARS: &str = "Within last 5 years";
/// COI filter requiring a disclosure.
pub const WITH_DISCLOSURES: &str = "With Disclosures";
/// COI filter requiring no disclosure.
pub const WITHOUT_DISCLOSURES: &str = "Without Disclosures";

/// Answer-generation mode requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Clinical,
    Research,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Clinical => write!(f, "clinical"),
            Mode::Research => write!(f, "research"),
        }
    }
}

/// Evidence filters applied to the study list.
///
/// The three criteria are independent and combined with logical AND;
/// [`ALL_ARTICLES`] (or an empty impact list) disables a criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceFilters {
    pub article_impact: Vec<String>,
    pub publication_date: String,
    pub coi_disclosure: String,
}

impl Default for EvidenceFilters {
    fn default() -> Self {
        Self {
            article_impact: Vec::new(),
            publication_date: ALL_ARTICLES.to_string(),
            coi_disclosure: ALL_ARTICLES.to_string(),
        }
    }
}

/// One logical ask request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<EvidenceFilters>,
}

impl AskRequest {
    /// Build a request from an already-validated question.
    pub fn new(question: impl Into<String>, mode: Mode) -> Self {
        Self {
            question: question.into(),
            mode,
            patient_context: None,
            filters: None,
        }
    }

    /// Attach evidence filters.
    pub fn with_filters(mut self, filters: EvidenceFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Attach optional patient context passed through to the backend verbatim.
    pub fn with_patient_context(mut self, context: impl Into<String>) -> Self {
        self.patient_context = Some(context.into());
        self
    }
}

/// Author field as delivered on the wire: a single delimited string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    One(String),
    Many(Vec<String>),
}

/// A citation record as provided by the server.
///
/// Every field is optional; absence is a normal, expected condition.
/// The `*_flag` fields are boolean-like strings (`"true"` / `"1"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCitation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub pmid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<AuthorField>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub pubmed_url: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub coi_flag: Option<String>,
    #[serde(default)]
    pub is_last_year: Option<String>,
    #[serde(default)]
    pub is_last_5_years: Option<String>,
    #[serde(default)]
    pub is_top_journal: Option<String>,
}

/// A normalized, display-ready study record.
///
/// `citation_number` is positional and reassigned whenever the visible list
/// is filtered and renumbered; `id` is the stable identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Study {
    pub id: String,
    pub citation_number: usize,
    pub title: String,
    pub authors: String,
    pub journal: String,
    pub year: Option<i32>,
    pub has_coi: bool,
    pub top_journal: bool,
    pub highly_cited: bool,
    pub summary: Option<String>,
    pub url: Option<String>,
}

/// Final result of one ask request.
///
/// The citation ordering defines citation numbering 1..N before any
/// filtering is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AskResult {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<RawCitation>,
}

/// One decoded event from the streaming response body.
///
/// Events are transient: each is folded into the accumulating answer and
/// citation list, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental answer fragment.
    Message { delta: String },
    /// A wholesale replacement of the citation list.
    Citations { citations: Vec<RawCitation> },
    /// A server-reported failure; aborts the parse.
    Error { message: String },
    /// Explicit stream termination.
    End,
}
