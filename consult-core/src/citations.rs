//! Normalization of raw citation records into display-ready studies.
//!
//! Pure functions, no I/O. Handles the optional-everything wire shape:
//! author strings with affiliations, boolean-like flag strings, and
//! loosely formatted publication dates.

use crate::types::{AuthorField, RawCitation, Study};
use chrono::{Datelike, NaiveDate};

/// Authors shown before truncating to "et al.".
pub const MAX_DISPLAY_AUTHORS: usize = 6;

const AUTHORS_FALLBACK: &str = "Authors not provided";
const TITLE_FALLBACK: &str = "Untitled reference";
const JOURNAL_FALLBACK: &str = "Journal not specified";

/// Interpret a boolean-like flag string (`"true"` / `"1"`, case-insensitive).
pub fn flag_is_set(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let normalized = v.trim().to_ascii_lowercase();
            normalized == "true" || normalized == "1"
        }
        None => false,
    }
}

/// Extract the publication year from a loosely formatted date string.
///
/// Accepts ISO dates (`2023-04-17`) and strings containing a standalone
/// four-digit year (`2023 Apr`, `Apr 2021`, `17 Apr 2021`). Anything else
/// yields `None` — missing data is normal and must not be an error.
pub fn publication_year(date: Option<&str>) -> Option<i32> {
    let date = date?.trim();
    if date.is_empty() {
        return None;
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    // First digit run of exactly four characters is the year.
    let mut run = String::new();
    for c in date.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() {
            run.push(c);
        } else {
            if run.len() == 4 {
                return run.parse().ok();
            }
            run.clear();
        }
    }
    None
}

/// Format an author field into a display string.
///
/// Lists are trimmed and truncated; delimited strings additionally get
/// affiliations stripped and names compressed to `"Last FI"` form. Empty
/// input yields a fixed placeholder.
pub fn format_authors(authors: Option<&AuthorField>) -> String {
    match authors {
        None => AUTHORS_FALLBACK.to_string(),
        Some(AuthorField::Many(list)) => {
            let trimmed: Vec<&str> = list
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .collect();
            if trimmed.is_empty() {
                AUTHORS_FALLBACK.to_string()
            } else {
                truncate_author_list(&trimmed)
            }
        }
        Some(AuthorField::One(raw)) => {
            let shortened = shorten_author_string(raw);
            if shortened.is_empty() {
                AUTHORS_FALLBACK.to_string()
            } else {
                shortened
            }
        }
    }
}

/// Normalize a raw citation into a numbered [`Study`].
///
/// `index` is the zero-based position in the server-ordered citation list;
/// the resulting `citation_number` is `index + 1`.
pub fn study_from_citation(citation: &RawCitation, index: usize) -> Study {
    let citation_number = index + 1;
    let id = non_empty(citation.id.as_deref())
        .or_else(|| non_empty(citation.pmid.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("citation-{citation_number}"));

    Study {
        id,
        citation_number,
        title: non_empty(citation.title.as_deref())
            .unwrap_or(TITLE_FALLBACK)
            .to_string(),
        authors: format_authors(citation.authors.as_ref()),
        journal: non_empty(citation.journal.as_deref())
            .unwrap_or(JOURNAL_FALLBACK)
            .to_string(),
        year: publication_year(citation.publication_date.as_deref()),
        has_coi: flag_is_set(citation.coi_flag.as_deref()),
        top_journal: flag_is_set(citation.is_top_journal.as_deref()),
        // The wire carries no highly-cited flag today.
        highly_cited: false,
        summary: non_empty(citation.snippet.as_deref()).map(str::to_string),
        url: non_empty(citation.pubmed_url.as_deref()).map(str::to_string),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Shorten a semicolon-delimited author string.
///
/// Authors come as `"Name (Affiliation); ..."`; affiliations are stripped
/// and each name compressed to `"Last FI"` (names already in that form are
/// kept as-is). Falls back to the trimmed input if nothing survives.
fn shorten_author_string(raw: &str) -> String {
    let formatted: Vec<String> = raw
        .split(';')
        .map(|part| compress_name(&strip_parenthesized(part)))
        .filter(|name| !name.is_empty())
        .collect();

    if formatted.is_empty() {
        return raw.trim().to_string();
    }
    let refs: Vec<&str> = formatted.iter().map(String::as_str).collect();
    truncate_author_list(&refs)
}

/// Join authors with commas, capping at [`MAX_DISPLAY_AUTHORS`] + "et al.".
fn truncate_author_list(authors: &[&str]) -> String {
    if authors.len() > MAX_DISPLAY_AUTHORS {
        format!("{} et al.", authors[..MAX_DISPLAY_AUTHORS].join(", "))
    } else {
        authors.join(", ")
    }
}

/// Remove parenthesized segments (affiliations) and squeeze whitespace.
fn strip_parenthesized(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut depth = 0usize;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compress a full name to `"Last FI"` form.
///
/// A name whose final token already looks like initials (short, all
/// uppercase) is treated as pre-compressed and kept; otherwise the last
/// token is the surname and the preceding tokens become initials.
fn compress_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.len() {
        0 => String::new(),
        1 => tokens[0].to_string(),
        _ => {
            let last = tokens[tokens.len() - 1];
            if looks_like_initials(last) {
                return tokens.join(" ");
            }
            let initials: String = tokens[..tokens.len() - 1]
                .iter()
                .filter_map(|t| t.chars().next())
                .map(|c| c.to_ascii_uppercase())
                .collect();
            if initials.is_empty() {
                last.to_string()
            } else {
                format!("{last} {initials}")
            }
        }
    }
}

fn looks_like_initials(token: &str) -> bool {
    token.len() <= 3 && token.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flag_is_set_variants() {
        assert!(flag_is_set(Some("true")));
        assert!(flag_is_set(Some("True ")));
        assert!(flag_is_set(Some("1")));
        assert!(!flag_is_set(Some("false")));
        assert!(!flag_is_set(Some("0")));
        assert!(!flag_is_set(Some("")));
        assert!(!flag_is_set(None));
    }

    #[test]
    fn test_publication_year_formats() {
        assert_eq!(publication_year(Some("2023-04-17")), Some(2023));
        assert_eq!(publication_year(Some("2021 Apr")), Some(2021));
        assert_eq!(publication_year(Some("2019")), Some(2019));
        assert_eq!(publication_year(Some("")), None);
        assert_eq!(publication_year(None), None);
    }

    #[test]
    fn test_publication_year_month_name_first() {
        assert_eq!(publication_year(Some("Apr 2021")), Some(2021));
        assert_eq!(publication_year(Some("17 Apr 2021")), Some(2021));
        assert_eq!(publication_year(Some("Spring issue")), None);
        assert_eq!(publication_year(Some("20230417")), None);
    }

    #[test]
    fn test_format_authors_strips_affiliations_and_compresses() {
        let field = AuthorField::One("Smith J (Harvard); Doe A (MIT); Lee K".to_string());
        assert_eq!(format_authors(Some(&field)), "Smith J, Doe A, Lee K");
    }

    #[test]
    fn test_format_authors_compresses_full_names() {
        let field = AuthorField::One("John Smith; Maria del Carmen Fernandez".to_string());
        assert_eq!(format_authors(Some(&field)), "Smith J, Fernandez MDC");
    }

    #[test]
    fn test_format_authors_truncates_past_six() {
        let field = AuthorField::One(
            "Smith J; Doe A; Lee K; Park S; Chen L; Patel R; Garcia M".to_string(),
        );
        assert_eq!(
            format_authors(Some(&field)),
            "Smith J, Doe A, Lee K, Park S, Chen L, Patel R et al."
        );
    }

    #[test]
    fn test_format_authors_list_form() {
        let field = AuthorField::Many(vec![
            " Smith J ".to_string(),
            String::new(),
            "Doe A".to_string(),
        ]);
        assert_eq!(format_authors(Some(&field)), "Smith J, Doe A");
    }

    #[test]
    fn test_format_authors_list_truncates_past_six() {
        let names: Vec<String> = (1..=8).map(|i| format!("Author {i}")).collect();
        let field = AuthorField::Many(names);
        let formatted = format_authors(Some(&field));
        assert!(formatted.ends_with("et al."));
        assert_eq!(formatted.matches(',').count(), 5);
    }

    #[test]
    fn test_format_authors_missing() {
        assert_eq!(format_authors(None), "Authors not provided");
        let empty = AuthorField::Many(vec![]);
        assert_eq!(format_authors(Some(&empty)), "Authors not provided");
        let blank = AuthorField::One("   ".to_string());
        assert_eq!(format_authors(Some(&blank)), "Authors not provided");
    }

    #[test]
    fn test_strip_parenthesized_handles_nesting() {
        assert_eq!(
            strip_parenthesized("Smith J (Harvard (Boston))"),
            "Smith J"
        );
        assert_eq!(strip_parenthesized("  Doe   A  "), "Doe A");
    }

    #[test]
    fn test_study_from_citation_full_record() {
        let citation = RawCitation {
            id: Some("c-42".to_string()),
            pmid: Some("12345".to_string()),
            title: Some("Aspirin in primary prevention".to_string()),
            authors: Some(AuthorField::One("Smith J (Harvard)".to_string())),
            journal: Some("NEJM".to_string()),
            publication_date: Some("2022-01-15".to_string()),
            pubmed_url: Some("https://pubmed.ncbi.nlm.nih.gov/12345/".to_string()),
            snippet: Some("RCT of 10,000 patients.".to_string()),
            coi_flag: Some("true".to_string()),
            is_top_journal: Some("1".to_string()),
            ..RawCitation::default()
        };
        let study = study_from_citation(&citation, 2);
        assert_eq!(study.id, "c-42");
        assert_eq!(study.citation_number, 3);
        assert_eq!(study.title, "Aspirin in primary prevention");
        assert_eq!(study.authors, "Smith J");
        assert_eq!(study.journal, "NEJM");
        assert_eq!(study.year, Some(2022));
        assert!(study.has_coi);
        assert!(study.top_journal);
        assert!(!study.highly_cited);
        assert_eq!(study.summary.as_deref(), Some("RCT of 10,000 patients."));
        assert_eq!(
            study.url.as_deref(),
            Some("https://pubmed.ncbi.nlm.nih.gov/12345/")
        );
    }

    #[test]
    fn test_study_from_citation_empty_record_uses_placeholders() {
        let study = study_from_citation(&RawCitation::default(), 0);
        assert_eq!(study.id, "citation-1");
        assert_eq!(study.citation_number, 1);
        assert_eq!(study.title, "Untitled reference");
        assert_eq!(study.authors, "Authors not provided");
        assert_eq!(study.journal, "Journal not specified");
        assert_eq!(study.year, None);
        assert!(!study.has_coi);
        assert!(study.summary.is_none());
        assert!(study.url.is_none());
    }

    #[test]
    fn test_study_id_falls_back_to_pmid() {
        let citation = RawCitation {
            pmid: Some("998".to_string()),
            ..RawCitation::default()
        };
        assert_eq!(study_from_citation(&citation, 0).id, "998");
    }
}
