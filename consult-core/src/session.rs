//! Query and filter state for one Consult session.
//!
//! Holds the current question mode, evidence filters, streamed answer, and
//! normalized study list, and derives the filtered, renumbered view. The
//! session has two observable phases: `Idle` until the first submission,
//! then `Active` forever after.

use crate::citations::study_from_citation;
use crate::error::AskError;
use crate::types::{
    AskRequest, AskResult, EvidenceFilters, Mode, Study, ALL_ARTICLES, HIGHLY_CITED, TOP_JOURNAL,
    WITHIN_LAST_5_YEARS, WITHIN_LAST_YEAR, WITH_DISCLOSURES, WITHOUT_DISCLOSURES,
};
use tracing::debug;

/// Shown when a completed request produced an empty answer.
const NO_ANSWER_PLACEHOLDER: &str = "The service did not return an answer.";

/// Observable session phase. Once `Active`, never returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
}

/// State owner for the question, filters, and results of a session.
#[derive(Debug)]
pub struct ConsultSession {
    phase: Phase,
    mode: Mode,
    filters: EvidenceFilters,
    patient_context: Option<String>,
    answer: String,
    studies: Vec<Study>,
    /// Reference year for the recency filters.
    reference_year: i32,
}

impl ConsultSession {
    pub fn new(reference_year: i32) -> Self {
        Self {
            phase: Phase::Idle,
            mode: Mode::default(),
            filters: EvidenceFilters::default(),
            patient_context: None,
            answer: String::new(),
            studies: Vec::new(),
            reference_year,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn filters(&self) -> &EvidenceFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: EvidenceFilters) {
        self.filters = filters;
    }

    pub fn set_patient_context(&mut self, context: Option<String>) {
        self.patient_context = context;
    }

    /// The current answer text (possibly partial while a request streams).
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Studies numbered 1..N in the server's citation order, unfiltered.
    pub fn studies(&self) -> &[Study] {
        &self.studies
    }

    /// Validate the question and build the request for this submission.
    ///
    /// An empty question (after trimming) aborts with no request built and
    /// no state change beyond what the caller displays. On success the
    /// session becomes `Active` and the prior answer is cleared.
    pub fn begin_submission(&mut self, question: &str) -> Result<AskRequest, AskError> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(AskError::EmptyQuestion);
        }

        self.phase = Phase::Active;
        self.answer.clear();

        let mut request =
            AskRequest::new(trimmed, self.mode).with_filters(self.filters.clone());
        if let Some(context) = &self.patient_context {
            request = request.with_patient_context(context.clone());
        }
        Ok(request)
    }

    /// Record a partial answer from the in-flight stream.
    pub fn apply_partial(&mut self, partial: &str) {
        self.answer.clear();
        self.answer.push_str(partial);
    }

    /// Finalize a completed request: fix up the answer and normalize the
    /// citations into studies numbered 1..N in citation order.
    pub fn apply_result(&mut self, result: AskResult) {
        let trimmed = result.answer.trim();
        self.answer = if trimmed.is_empty() {
            NO_ANSWER_PLACEHOLDER.to_string()
        } else {
            trimmed.to_string()
        };
        self.studies = result
            .citations
            .iter()
            .enumerate()
            .map(|(index, citation)| study_from_citation(citation, index))
            .collect();
        debug!(studies = self.studies.len(), "Finalized ask result");
    }

    /// Record a failed request: prior studies stay untouched, only the
    /// in-flight answer buffer is dropped.
    pub fn apply_failure(&mut self) {
        self.answer.clear();
    }

    /// The filtered study list, renumbered 1..N in filtered order for
    /// display badges.
    ///
    /// Answer-text citation markers still refer to the original numbering;
    /// a study filtered out of view is simply unresolvable by the linker.
    pub fn filtered_studies(&self) -> Vec<Study> {
        self.studies
            .iter()
            .filter(|study| self.passes_filters(study))
            .cloned()
            .enumerate()
            .map(|(index, mut study)| {
                study.citation_number = index + 1;
                study
            })
            .collect()
    }

    /// Evaluate the three filter criteria independently, combined with AND.
    fn passes_filters(&self, study: &Study) -> bool {
        self.passes_impact(study) && self.passes_recency(study) && self.passes_coi(study)
    }

    fn passes_impact(&self, study: &Study) -> bool {
        let impact = &self.filters.article_impact;
        if impact.is_empty() || impact.iter().any(|tag| tag == ALL_ARTICLES) {
            return true;
        }
        let wants_top = impact.iter().any(|tag| tag == TOP_JOURNAL);
        let wants_cited = impact.iter().any(|tag| tag == HIGHLY_CITED);
        (wants_top && study.top_journal) || (wants_cited && study.highly_cited)
    }

    fn passes_recency(&self, study: &Study) -> bool {
        if self.filters.publication_date == ALL_ARTICLES {
            return true;
        }
        // Missing publication data passes every recency filter.
        let Some(year) = study.year else {
            return true;
        };
        let age = self.reference_year - year;
        match self.filters.publication_date.as_str() {
            p if p == WITHIN_LAST_YEAR => age <= 1,
            p if p == WITHIN_LAST_5_YEARS => age <= 5,
            _ => true,
        }
    }

    fn passes_coi(&self, study: &Study) -> bool {
        match self.filters.coi_disclosure.as_str() {
            d if d == WITH_DISCLOSURES => study.has_coi,
            d if d == WITHOUT_DISCLOSURES => !study.has_coi,
            _ => true,
        }
    }
}
