// src/matcher.rs
use once_cell::sync::OnceCell;
use regex::Regex;

/// Normalize for matching: Unicode lowercase, collapse whitespace, trim.
/// Channel posts are frequently Cyrillic, so this must be real case
/// folding, not ASCII-only.
pub fn normalize(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    let lowered = s.to_lowercase();
    re_ws.replace_all(&lowered, " ").trim().to_string()
}

/// Decides whether a message text reads like a vacancy posting.
///
/// Keywords are normalized once at construction; matching is a substring
/// test over the normalized text. An empty keyword set matches nothing:
/// relevance has to be configured explicitly, it is never match-all.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| normalize(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let text = normalize(text);
        if text.is_empty() {
            return false;
        }
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        let m = KeywordMatcher::new(["hiring"]);
        assert!(m.matches("Urgent HIRING now"));
        assert!(m.matches("hiring"));
        assert!(!m.matches("fired"));
    }

    #[test]
    fn empty_text_never_matches() {
        let m = KeywordMatcher::new(["hiring"]);
        assert!(!m.matches(""));
        assert!(!m.matches("   \n\t  "));
    }

    #[test]
    fn empty_keyword_set_never_matches() {
        let m = KeywordMatcher::new(Vec::<String>::new());
        assert!(!m.matches("hire me"));
        let blanks = KeywordMatcher::new(["", "  "]);
        assert_eq!(blanks.keyword_count(), 0);
        assert!(!blanks.matches("anything"));
    }

    #[test]
    fn cyrillic_case_folds() {
        let m = KeywordMatcher::new(["вакансия"]);
        assert!(m.matches("ВАКАНСИЯ: Rust разработчик"));
        assert!(m.matches("Новая Вакансия в команде"));
        assert!(!m.matches("просто болтовня"));
    }

    #[test]
    fn whitespace_collapses_before_matching() {
        let m = KeywordMatcher::new(["remote  job"]);
        assert!(m.matches("100% REMOTE\n\tJOB, apply now"));
    }

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  Ищем   QA\nинженера  "), "ищем qa инженера");
        assert_eq!(normalize(""), "");
    }
}
