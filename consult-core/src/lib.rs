//! # Consult Core
//!
//! Core client library for The Consult, an AI-powered medical literature
//! Q&A tool. Provides the streaming ask client with single-shot fallback,
//! the event-stream parser, citation normalization and linking, and the
//! query/filter session state.

pub mod citations;
pub mod client;
pub mod config;
pub mod error;
pub mod linker;
pub mod session;
pub mod stream;
pub mod types;

// Re-export commonly used types at the crate root.
pub use citations::{format_authors, study_from_citation};
pub use client::AskClient;
pub use config::{load_config, ConsultConfig};
pub use error::{AskError, ConfigError, ConsultError, Result};
pub use linker::{
    activate_citation, classify_link, link_citation_markers, AnchorTarget, LinkAction,
    StudyAnchors,
};
pub use session::{ConsultSession, Phase};
pub use stream::SseAccumulator;
pub use types::{
    AskRequest, AskResult, AuthorField, EvidenceFilters, Mode, RawCitation, StreamEvent, Study,
};
