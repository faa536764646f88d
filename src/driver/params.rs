//! Connect parameters and the typed literal parser
//!
//! Connect parameters arrive as raw argument text from the host engine.
//! Each argument is either a positional literal or `name=literal`.
//! Literals are parsed, never evaluated:
//! - integers and floats
//! - single- or double-quoted strings
//! - `true` / `false`
//! - `null` / `none`
//!
//! Anything else is rejected as a configuration error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{RemoteError, RemoteResult};
use super::value::RemoteValue;

/// A typed literal parsed from argument text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Literal {
    /// Parses a literal from argument text
    pub fn parse(text: &str) -> RemoteResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RemoteError::InvalidParams("empty literal".into()));
        }

        if let Some(unquoted) = unquote(trimmed) {
            return Ok(Literal::Text(unquoted));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return Ok(Literal::Bool(true)),
            "false" => return Ok(Literal::Bool(false)),
            "null" | "none" => return Ok(Literal::Null),
            _ => {}
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Literal::Integer(i));
        }

        // Restrict floats to plain numeric syntax; `inf` and `NaN` are not literals
        let numeric_chars = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
        if numeric_chars && trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Ok(Literal::Float(f));
            }
        }

        Err(RemoteError::InvalidParams(format!(
            "'{}' is not a literal (expected integer, float, quoted string, bool or null)",
            trimmed
        )))
    }

    /// Returns the text if this is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a bool literal
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&Literal> for RemoteValue {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Integer(i) => RemoteValue::Integer(*i),
            Literal::Float(f) => RemoteValue::Real(*f),
            Literal::Text(s) => RemoteValue::Text(s.clone()),
            Literal::Bool(b) => RemoteValue::Bool(*b),
            Literal::Null => RemoteValue::Null,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Strips matching single or double quotes, collapsing doubled quote characters
pub fn unquote(text: &str) -> Option<String> {
    let first = text.chars().next()?;
    if !matches!(first, '\'' | '"') || text.len() < 2 || !text.ends_with(first) {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    let doubled: String = [first, first].iter().collect();
    Some(inner.replace(&doubled, &first.to_string()))
}

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$")
            .expect("keyword pattern is a valid regex")
    })
}

/// Positional and keyword parameters handed to `RemoteDriver::connect`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectParams {
    /// Positional literals in argument order
    pub positional: Vec<Literal>,
    /// Keyword literals, ordered by name
    pub keyword: BTreeMap<String, Literal>,
}

impl ConnectParams {
    /// Creates empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw argument texts
    pub fn parse<'a>(args: impl IntoIterator<Item = &'a str>) -> RemoteResult<Self> {
        let mut params = Self::new();
        for arg in args {
            match keyword_pattern().captures(arg) {
                Some(caps) => {
                    let name = caps[1].to_string();
                    let value = Literal::parse(&caps[2])?;
                    if params.keyword.insert(name.clone(), value).is_some() {
                        return Err(RemoteError::InvalidParams(format!(
                            "parameter '{}' given more than once",
                            name
                        )));
                    }
                }
                None => params.positional.push(Literal::parse(arg)?),
            }
        }
        Ok(params)
    }

    /// Adds a keyword parameter
    pub fn with_keyword(mut self, name: impl Into<String>, value: Literal) -> Self {
        self.keyword.insert(name.into(), value);
        self
    }

    /// Returns a keyword parameter
    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.keyword.get(name)
    }

    /// Returns a string parameter, by keyword or else at a positional index
    pub fn string(&self, name: &str, position: usize) -> Option<&str> {
        self.get(name)
            .or_else(|| self.positional.get(position))
            .and_then(Literal::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_kinds() {
        assert_eq!(Literal::parse("42").unwrap(), Literal::Integer(42));
        assert_eq!(Literal::parse("-7").unwrap(), Literal::Integer(-7));
        assert_eq!(Literal::parse("2.5").unwrap(), Literal::Float(2.5));
        assert_eq!(Literal::parse("1e3").unwrap(), Literal::Float(1000.0));
        assert_eq!(
            Literal::parse("'orders'").unwrap(),
            Literal::Text("orders".into())
        );
        assert_eq!(
            Literal::parse("\"a\"\"b\"").unwrap(),
            Literal::Text("a\"b".into())
        );
        assert_eq!(Literal::parse("True").unwrap(), Literal::Bool(true));
        assert_eq!(Literal::parse("None").unwrap(), Literal::Null);
    }

    #[test]
    fn test_expressions_rejected() {
        for text in ["__import__('os')", "1 + 1", "inf", "NaN", "orders", ""] {
            let result = Literal::parse(text);
            assert!(result.is_err(), "{} should be rejected", text);
        }
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote("'it''s'"), Some("it's".to_string()));
        assert_eq!(unquote("'open"), None);
        assert_eq!(unquote("'"), None);
        assert_eq!(unquote("plain"), None);
    }

    #[test]
    fn test_positional_and_keyword() {
        let params =
            ConnectParams::parse(["'/tmp/remote.db'", "timeout = 30", "uri=false"]).unwrap();
        assert_eq!(params.positional, vec![Literal::Text("/tmp/remote.db".into())]);
        assert_eq!(params.get("timeout"), Some(&Literal::Integer(30)));
        assert_eq!(params.get("uri").and_then(Literal::as_bool), Some(false));
        assert_eq!(params.string("path", 0), Some("/tmp/remote.db"));
    }

    #[test]
    fn test_quoted_equals_is_positional() {
        let params = ConnectParams::parse(["'a=b'"]).unwrap();
        assert_eq!(params.positional, vec![Literal::Text("a=b".into())]);
        assert!(params.keyword.is_empty());
    }

    #[test]
    fn test_duplicate_keyword_rejected() {
        let result = ConnectParams::parse(["path='a'", "path='b'"]);
        assert!(matches!(result, Err(RemoteError::InvalidParams(_))));
    }
}
