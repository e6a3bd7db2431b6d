//! Value splitting for multi-part validators
//!
//! Attribute values often pack several values into one string, separated
//! by spaces or commas. [`Separator`] turns such a string into chunks,
//! and knows not to split inside parentheses so that function-call
//! notation like `url(a b)` stays in one chunk.

/// Splitting behavior shared by the multi-part validators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Separator {
    separator: Option<char>,
    trim: bool,
}

impl Separator {
    /// Splitting on the given character
    pub fn new(separator: char) -> Self {
        Separator {
            separator: Some(separator),
            trim: false,
        }
    }

    /// No separator: every character becomes a chunk
    pub fn none() -> Self {
        Separator::default()
    }

    /// Enable trimming of the produced chunks. Trimming does not happen
    /// here, the validators using this separator apply it.
    pub fn trimming(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Whether chunks should be trimmed before validation
    pub fn should_trim(&self) -> bool {
        self.trim
    }

    /// Split a value into chunks.
    ///
    /// A space separator with trimming enabled drops empty chunks, so
    /// `"a  b c"` gives `["a", "b", "c"]` rather than keeping the empty
    /// strings between consecutive spaces.
    pub fn separate(&self, value: &str) -> Vec<String> {
        match self.separator {
            Some(sep) if value.contains('(') => self.separate_with_parse(value, sep),
            _ => self.separate_without_parse(value),
        }
    }

    fn separate_without_parse(&self, value: &str) -> Vec<String> {
        let Some(sep) = self.separator else {
            return value.chars().map(String::from).collect();
        };
        if sep == ' ' && self.trim {
            return value
                .split(sep)
                .filter(|chunk| !chunk.is_empty())
                .map(String::from)
                .collect();
        }
        value.split(sep).map(String::from).collect()
    }

    /// Split at separator occurrences outside parentheses only
    fn separate_with_parse(&self, value: &str, sep: char) -> Vec<String> {
        let mut open = 0i32;
        let mut chunks = Vec::new();
        let mut current = String::new();
        for ch in value.chars() {
            if ch == sep && open == 0 {
                chunks.push(std::mem::take(&mut current));
                continue;
            }
            current.push(ch);
            if ch == '(' {
                open += 1;
            } else if ch == ')' {
                open -= 1;
            }
        }
        chunks.push(current);
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_separator_splits_characters() {
        let sep = Separator::none();
        assert_eq!(sep.separate("abc"), vec!["a", "b", "c"]);
        assert!(sep.separate("").is_empty());
    }

    #[test]
    fn test_space_with_trim_drops_empty_chunks() {
        let sep = Separator::new(' ').trimming();
        assert_eq!(sep.separate("a  b c     d e"), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_space_without_trim_keeps_empty_chunks() {
        let sep = Separator::new(' ');
        assert_eq!(sep.separate("a  b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_comma_separator() {
        let sep = Separator::new(',');
        assert_eq!(sep.separate("1,2,3"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parentheses_suppress_splitting() {
        let sep = Separator::new(' ');
        assert_eq!(
            sep.separate("url(a b) c"),
            vec!["url(a b)", "c"]
        );
    }

    #[test]
    fn test_comma_with_parenthesized_group() {
        let sep = Separator::new(',');
        assert_eq!(sep.separate("a,(b,c),d"), vec!["a", "(b,c)", "d"]);
    }

    #[test]
    fn test_nested_parentheses() {
        let sep = Separator::new(' ');
        assert_eq!(
            sep.separate("calc(min(1 2) 3) x"),
            vec!["calc(min(1 2) 3)", "x"]
        );
    }
}
