//! Assignee extraction.
//!
//! Notation precedence, highest first: arrow (`→ Name` / `> Name`),
//! keyword (`assigned to: Name`, `owner: Name`), parenthesized `(Name)`,
//! bracketed `[Name]`, and `@mention`. Only the winning notation's span is
//! removed from the line; seeing more than one notation marks the field
//! ambiguous so scoring can dock confidence.

use std::sync::LazyLock;

use regex::Regex;

static RE_ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[→>]\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)").unwrap()
});
static RE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:assigned\s+to|owner)\s*:?\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)").unwrap()
});
static RE_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\)").unwrap());
static RE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\]").unwrap());
static RE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z][A-Za-z0-9_]*)").unwrap());

/// A recognized assignee with the full notation span (arrow, brackets and
/// keyword included) for removal from the task name.
pub(crate) struct AssigneeMatch {
    pub name: String,
    pub span: (usize, usize),
    /// Count of distinct notations that matched the line.
    pub candidates: usize,
}

pub(crate) fn find_assignee(text: &str) -> Option<AssigneeMatch> {
    let patterns: &[&Regex] = &[&RE_ARROW, &RE_KEYWORD, &RE_PAREN, &RE_BRACKET, &RE_MENTION];
    let candidates = patterns.iter().filter(|re| re.is_match(text)).count();

    for re in patterns {
        if let Some(caps) = re.captures(text) {
            let full = caps.get(0)?;
            let name = caps.get(1)?.as_str().trim().to_string();
            if name.is_empty() {
                continue;
            }
            return Some(AssigneeMatch {
                name,
                span: (full.start(), full.end()),
                candidates,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_assignee() {
        let found = find_assignee("Write requirements → Aykut").unwrap();
        assert_eq!(found.name, "Aykut");
        assert_eq!(found.candidates, 1);
    }

    #[test]
    fn test_ascii_arrow_assignee() {
        let found = find_assignee("Write requirements > Aykut").unwrap();
        assert_eq!(found.name, "Aykut");
    }

    #[test]
    fn test_arrow_full_name() {
        let found = find_assignee("Review draft → Jane Smith").unwrap();
        assert_eq!(found.name, "Jane Smith");
    }

    #[test]
    fn test_keyword_assignee() {
        assert_eq!(find_assignee("Fix login assigned to: Hasan").unwrap().name, "Hasan");
        assert_eq!(find_assignee("Fix login owner: Hasan").unwrap().name, "Hasan");
        assert_eq!(find_assignee("Fix login Assigned To Hasan").unwrap().name, "Hasan");
    }

    #[test]
    fn test_paren_assignee() {
        let text = "Order supplies (Maria)";
        let found = find_assignee(text).unwrap();
        assert_eq!(found.name, "Maria");
        assert_eq!(&text[found.span.0..found.span.1], "(Maria)");
    }

    #[test]
    fn test_bracket_assignee() {
        let found = find_assignee("Order supplies [Maria]").unwrap();
        assert_eq!(found.name, "Maria");
    }

    #[test]
    fn test_mention_assignee() {
        let found = find_assignee("Deploy staging @deniz").unwrap();
        assert_eq!(found.name, "deniz");
    }

    #[test]
    fn test_arrow_beats_mention() {
        let found = find_assignee("Deploy staging → Hasan cc @deniz").unwrap();
        assert_eq!(found.name, "Hasan");
        assert_eq!(found.candidates, 2);
    }

    #[test]
    fn test_lowercase_after_arrow_not_a_name() {
        assert!(find_assignee("Write requirements → tomorrow maybe").is_none());
    }

    #[test]
    fn test_no_assignee() {
        assert!(find_assignee("Write requirements").is_none());
    }
}
