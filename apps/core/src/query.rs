pub const CODE_SHORTCUT_DIGITS: usize = 4;
pub const LIKE_ESCAPE: char = '\\';
/// Longest input, in characters, any surface will search for.
pub const MAX_QUERY_CHARS: usize = 256;

/// Classified search input. Built fresh for every debounced firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw: String,
    /// LIKE pattern for free text (`%term%`), or the code itself for shortcuts.
    pub normalized: String,
    pub code_value: Option<String>,
}

impl SearchQuery {
    /// Returns `None` for empty or whitespace-only input; nothing is fetched then.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(code) = parse_code_shortcut(trimmed) {
            return Some(Self {
                raw: raw.to_string(),
                normalized: code.to_string(),
                code_value: Some(code.to_string()),
            });
        }

        Some(Self {
            raw: raw.to_string(),
            normalized: contains_pattern(trimmed),
            code_value: None,
        })
    }

    pub fn is_code_shortcut(&self) -> bool {
        self.code_value.is_some()
    }

    pub fn text_pattern(&self) -> Option<&str> {
        if self.is_code_shortcut() {
            None
        } else {
            Some(&self.normalized)
        }
    }
}

pub fn within_max_length(raw: &str) -> bool {
    raw.chars().count() <= MAX_QUERY_CHARS
}

pub fn passes_min_length(raw: &str, min_chars: usize) -> bool {
    raw.trim().chars().count() >= min_chars
}

/// `^#?(\d{4})$`, on already-trimmed input.
pub fn parse_code_shortcut(input: &str) -> Option<&str> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    if digits.len() == CODE_SHORTCUT_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn tokenize_pattern(pattern: &str) -> Vec<PatternToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        let token = match ch {
            '%' => PatternToken::AnyRun,
            '_' => PatternToken::AnyOne,
            LIKE_ESCAPE => PatternToken::Literal(chars.next().unwrap_or(LIKE_ESCAPE)),
            other => PatternToken::Literal(other),
        };
        tokens.push(token);
    }
    tokens
}

/// Evaluates a `LIKE ... ESCAPE '\'` pattern the way SQLite does: ASCII
/// case-insensitive, `%` for any run, `_` for one character.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let tokens = tokenize_pattern(pattern);
    let text: Vec<char> = text.chars().collect();

    let mut t = 0;
    let mut p = 0;
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(PatternToken::AnyRun) => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some(PatternToken::AnyOne) => {
                p += 1;
                t += 1;
                continue;
            }
            Some(PatternToken::Literal(expected)) if expected.eq_ignore_ascii_case(&text[t]) => {
                p += 1;
                t += 1;
                continue;
            }
            _ => {}
        }

        let Some((star, consumed)) = backtrack else {
            return false;
        };
        p = star + 1;
        t = consumed + 1;
        backtrack = Some((star, consumed + 1));
    }

    tokens[p..].iter().all(|token| *token == PatternToken::AnyRun)
}

#[cfg(test)]
mod tests {
    use super::{
        contains_pattern, like_matches, passes_min_length, within_max_length, SearchQuery,
        MAX_QUERY_CHARS,
    };

    #[test]
    fn classifies_four_digit_codes_as_shortcuts() {
        let plain = SearchQuery::parse("1234").unwrap();
        assert!(plain.is_code_shortcut());
        assert_eq!(plain.code_value.as_deref(), Some("1234"));

        let hashed = SearchQuery::parse("#0007").unwrap();
        assert!(hashed.is_code_shortcut());
        assert_eq!(hashed.code_value.as_deref(), Some("0007"));
        assert!(hashed.text_pattern().is_none());
    }

    #[test]
    fn rejects_near_miss_codes() {
        for input in ["12345", "ab12", "123", "##1234", "12 34", "#12a4"] {
            let parsed = SearchQuery::parse(input).unwrap();
            assert!(!parsed.is_code_shortcut(), "{input} should be free text");
            assert!(parsed.code_value.is_none());
        }
    }

    #[test]
    fn empty_input_builds_no_query() {
        assert!(SearchQuery::parse("").is_none());
        assert!(SearchQuery::parse("   \t").is_none());
    }

    #[test]
    fn free_text_is_trimmed_and_wrapped() {
        let parsed = SearchQuery::parse("  neon city ").unwrap();
        assert_eq!(parsed.raw, "  neon city ");
        assert_eq!(parsed.text_pattern(), Some("%neon city%"));
    }

    #[test]
    fn wildcard_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn min_length_counts_trimmed_chars() {
        assert!(!passes_min_length("", 2));
        assert!(!passes_min_length(" a ", 2));
        assert!(passes_min_length("ab", 2));
        assert!(passes_min_length("日本", 2));
    }

    #[test]
    fn max_length_counts_chars_not_bytes() {
        assert!(within_max_length(&"é".repeat(MAX_QUERY_CHARS)));
        assert!(!within_max_length(&"a".repeat(MAX_QUERY_CHARS + 1)));
    }

    #[test]
    fn like_matcher_follows_sqlite_semantics() {
        assert!(like_matches("%punk%", "Cyberpunk Alley"));
        assert!(like_matches("%PUNK%", "cyberpunk"));
        assert!(like_matches("c_t", "cat"));
        assert!(!like_matches("c_t", "cart"));
        assert!(like_matches("%a%b%", "xxaxxbxx"));
        assert!(!like_matches("%100\\%%", "1000 ways"));
        assert!(like_matches("%100\\%%", "100% real"));
        assert!(!like_matches("%a\\_b%", "axb"));
        assert!(like_matches("%", ""));
        assert!(!like_matches("%x%", ""));
    }
}
