//! Rewriting of inline citation markers into addressable links.
//!
//! Answer text embeds markers like `[3]` or `[3, 7, 12]` referring to
//! numbered studies. Before the text reaches the markdown renderer, every
//! marker is rewritten into individual anchors (`[3](#study-3)`), so the
//! markers survive markdown link syntax. Click behavior is expressed
//! against injected capabilities rather than a concrete rendering surface.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Anchor prefix deriving a study element identity from its citation number.
pub const ANCHOR_PREFIX: &str = "#study-";

/// How long an activated study stays visually highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// A bracketed group of comma-separated integers.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(\d+(?:\s*,\s*\d+)*)\s*\]").expect("marker pattern is valid")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern is valid"));

/// Rewrite every citation marker in `text` into markdown anchors.
///
/// Each number inside a bracket becomes its own link; a bracket with
/// multiple numbers becomes multiple adjacent links joined by `", "`.
pub fn link_citation_markers(text: &str) -> String {
    MARKER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let links: Vec<String> = NUMBER
                .find_iter(&caps[1])
                .map(|m| format!("[{n}]({ANCHOR_PREFIX}{n})", n = m.as_str()))
                .collect();
            links.join(", ")
        })
        .into_owned()
}

/// What a rendered link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// A citation anchor; activating it scrolls to the study.
    Citation(usize),
    /// An ordinary link, opened in a new context without interception.
    External(String),
}

/// Classify a link target. Targets not matching the citation-anchor
/// pattern are ordinary external links.
pub fn classify_link(href: &str) -> LinkAction {
    if let Some(rest) = href.strip_prefix(ANCHOR_PREFIX) {
        if let Ok(number) = rest.parse::<usize>() {
            return LinkAction::Citation(number);
        }
    }
    LinkAction::External(href.to_string())
}

/// A rendered study element that can be brought into view.
pub trait AnchorTarget {
    /// Scroll the element into the viewport (smooth, centered).
    fn scroll_into_view(&mut self);
    /// Apply a temporary visual highlight for `duration`.
    fn highlight(&mut self, duration: Duration);
}

/// Lookup from citation number to a rendered study element.
///
/// Numbers refer to the original server-ordered citation list, not the
/// filtered/renumbered view.
pub trait StudyAnchors {
    fn resolve_anchor(&mut self, citation_number: usize) -> Option<&mut dyn AnchorTarget>;
}

/// Activate a citation link: scroll to and highlight the study.
///
/// An unresolved number is a no-op — the study may have been filtered out
/// of view even though the answer text still references it.
pub fn activate_citation(anchors: &mut dyn StudyAnchors, citation_number: usize) {
    match anchors.resolve_anchor(citation_number) {
        Some(target) => {
            target.scroll_into_view();
            target.highlight(HIGHLIGHT_DURATION);
        }
        None => {
            tracing::debug!(citation_number, "Citation link has no rendered study");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_single_marker_rewritten() {
        assert_eq!(
            link_citation_markers("Shown effective [12]."),
            "Shown effective [12](#study-12)."
        );
    }

    #[test]
    fn test_multi_number_marker_preserves_separator() {
        let out = link_citation_markers("Effective per [3, 7] and [12].");
        assert_eq!(
            out,
            "Effective per [3](#study-3), [7](#study-7) and [12](#study-12)."
        );
    }

    #[test]
    fn test_marker_with_internal_whitespace() {
        assert_eq!(
            link_citation_markers("See [ 3 ,7 , 12 ]."),
            "See [3](#study-3), [7](#study-7), [12](#study-12)."
        );
    }

    #[test]
    fn test_non_numeric_brackets_untouched() {
        let text = "See [review] and [3a] for details.";
        assert_eq!(link_citation_markers(text), text);
    }

    #[test]
    fn test_classify_citation_anchor() {
        assert_eq!(classify_link("#study-7"), LinkAction::Citation(7));
    }

    #[test]
    fn test_classify_external_targets() {
        assert_eq!(
            classify_link("https://pubmed.ncbi.nlm.nih.gov/1/"),
            LinkAction::External("https://pubmed.ncbi.nlm.nih.gov/1/".into())
        );
        assert_eq!(
            classify_link("#study-abc"),
            LinkAction::External("#study-abc".into())
        );
    }

    #[derive(Default)]
    struct RecordingTarget {
        scrolled: usize,
        highlights: Vec<Duration>,
    }

    impl AnchorTarget for RecordingTarget {
        fn scroll_into_view(&mut self) {
            self.scrolled += 1;
        }
        fn highlight(&mut self, duration: Duration) {
            self.highlights.push(duration);
        }
    }

    #[derive(Default)]
    struct MapAnchors {
        targets: HashMap<usize, RecordingTarget>,
    }

    impl StudyAnchors for MapAnchors {
        fn resolve_anchor(&mut self, citation_number: usize) -> Option<&mut dyn AnchorTarget> {
            self.targets
                .get_mut(&citation_number)
                .map(|t| t as &mut dyn AnchorTarget)
        }
    }

    #[test]
    fn test_activate_scrolls_and_highlights_for_two_seconds() {
        let mut anchors = MapAnchors::default();
        anchors.targets.insert(3, RecordingTarget::default());

        activate_citation(&mut anchors, 3);

        let target = &anchors.targets[&3];
        assert_eq!(target.scrolled, 1);
        assert_eq!(target.highlights, vec![Duration::from_secs(2)]);
    }

    #[test]
    fn test_activate_missing_study_is_noop() {
        let mut anchors = MapAnchors::default();
        anchors.targets.insert(3, RecordingTarget::default());

        // Filtered-out study: nothing happens, nothing panics.
        activate_citation(&mut anchors, 99);
        assert_eq!(anchors.targets[&3].scrolled, 0);
    }
}
