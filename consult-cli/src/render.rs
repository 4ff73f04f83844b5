//! Terminal rendering of answers and study cards.
//!
//! The answer text goes through the citation linker first, so markers are
//! already markdown anchors; this module renders those anchors the only way
//! a terminal can — citation links collapse back to their badge number,
//! external links show their URL.

use consult_core::{classify_link, link_citation_markers, LinkAction, Study};
use regex::Regex;
use std::sync::LazyLock;

static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("link pattern is valid"));

/// Render answer text for the terminal: rewrite citation markers, resolve
/// markdown links, and wrap paragraphs to `width` columns.
pub fn render_answer(answer: &str, width: usize) -> String {
    let linked = link_citation_markers(answer);
    let resolved = MD_LINK.replace_all(&linked, |caps: &regex::Captures<'_>| {
        let text = &caps[1];
        match classify_link(&caps[2]) {
            LinkAction::Citation(number) => format!("[{number}]"),
            LinkAction::External(url) => {
                if text == url {
                    url
                } else {
                    format!("{text} ({url})")
                }
            }
        }
    });

    resolved
        .split("\n\n")
        .map(|paragraph| textwrap::fill(paragraph.trim(), width))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render one study card. The leading `[n]` badge is the display citation
/// number from the filtered, renumbered view.
pub fn render_study(study: &Study) -> String {
    let mut lines = Vec::new();

    let year = study
        .year
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    lines.push(format!("[{}] {}", study.citation_number, study.title));
    lines.push(format!("    {} - {}{}", study.authors, study.journal, year));

    let mut tags = Vec::new();
    if study.top_journal {
        tags.push("Top journal");
    }
    if study.highly_cited {
        tags.push("Highly cited");
    }
    if study.has_coi {
        tags.push("COI disclosure");
    }
    if !tags.is_empty() {
        lines.push(format!("    Tags: {}", tags.join(", ")));
    }
    if let Some(summary) = &study.summary {
        lines.push(format!("    {summary}"));
    }
    if let Some(url) = &study.url {
        lines.push(format!("    {url}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_answer_collapses_citation_links() {
        let out = render_answer("Effective per [3, 7] and [12].", 80);
        assert_eq!(out, "Effective per [3], [7] and [12].");
    }

    #[test]
    fn test_render_answer_shows_external_urls() {
        let out = render_answer("See [the trial](https://example.org/trial).", 80);
        assert_eq!(out, "See the trial (https://example.org/trial).");
    }

    #[test]
    fn test_render_answer_wraps_paragraphs() {
        let out = render_answer("alpha beta gamma delta\n\nsecond paragraph", 11);
        assert_eq!(out, "alpha beta\ngamma delta\n\nsecond\nparagraph");
    }

    #[test]
    fn test_render_study_card() {
        let study = Study {
            id: "c-1".to_string(),
            citation_number: 2,
            title: "Aspirin in primary prevention".to_string(),
            authors: "Smith J, Doe A".to_string(),
            journal: "NEJM".to_string(),
            year: Some(2022),
            has_coi: true,
            top_journal: true,
            highly_cited: false,
            summary: Some("RCT of 10,000 patients.".to_string()),
            url: Some("https://pubmed.ncbi.nlm.nih.gov/12345/".to_string()),
        };
        let card = render_study(&study);
        assert_eq!(
            card,
            "[2] Aspirin in primary prevention\n\
             \x20   Smith J, Doe A - NEJM (2022)\n\
             \x20   Tags: Top journal, COI disclosure\n\
             \x20   RCT of 10,000 patients.\n\
             \x20   https://pubmed.ncbi.nlm.nih.gov/12345/"
        );
    }

    #[test]
    fn test_render_study_minimal() {
        let study = Study {
            id: "citation-1".to_string(),
            citation_number: 1,
            title: "Untitled reference".to_string(),
            authors: "Authors not provided".to_string(),
            journal: "Journal not specified".to_string(),
            year: None,
            has_coi: false,
            top_journal: false,
            highly_cited: false,
            summary: None,
            url: None,
        };
        let card = render_study(&study);
        assert_eq!(
            card,
            "[1] Untitled reference\n\
             \x20   Authors not provided - Journal not specified"
        );
    }
}
