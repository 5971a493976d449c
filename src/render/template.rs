//! `%%TOKEN%%` placeholder substitution.

use std::collections::HashMap;

const DELIMITER: &str = "%%";

/// Placeholder tokens mapped to their literal replacement text.
///
/// Tokens are stored without the surrounding `%%`.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    values: HashMap<String, String>,
}

impl Substitutions {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a token.
    pub fn set(&mut self, token: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(token.into(), value.into());
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(token, value);
        self
    }

    /// Replacement for a token, if known.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no token is defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A text template with `%%TOKEN%%` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Wrap template text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template contains `%%token%%`.
    pub fn contains(&self, token: &str) -> bool {
        self.source.contains(&format!("{DELIMITER}{token}{DELIMITER}"))
    }

    /// Substitute every occurrence of every known token.
    ///
    /// The text is scanned once, left to right. Unknown tokens are copied
    /// through unchanged, and replacement text is never scanned again, so
    /// data that happens to contain `%%...%%` is written verbatim.
    pub fn render(&self, subs: &Substitutions) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(open) = rest.find(DELIMITER) {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + DELIMITER.len()..];

            let Some(close) = after_open.find(DELIMITER) else {
                out.push_str(&rest[open..]);
                return out;
            };

            let token = &after_open[..close];
            if is_token(token) {
                if let Some(value) = subs.get(token) {
                    out.push_str(value);
                    rest = &after_open[close + DELIMITER.len()..];
                    continue;
                }
            }

            // Not a known token: keep the opening delimiter and the text,
            // and let the closing delimiter start the next candidate.
            out.push_str(DELIMITER);
            out.push_str(token);
            rest = &after_open[close..];
        }

        out.push_str(rest);
        out
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}
