//! Compiled path patterns.
//!
//! A pattern is a sequence of literal segments and `{name}` placeholders.
//! `/user/{id}/solutions` matches `/user/42/solutions` binding `id = "42"`.
//! A placeholder matches exactly one non-empty segment; it never spans a `/`.

use std::collections::HashMap;

use thiserror::Error;

/// Pattern parse failure. Raised at startup, never at request time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern {0:?} contains an empty segment")]
    EmptySegment(String),
    #[error("pattern {0:?} contains an unnamed placeholder")]
    EmptyPlaceholder(String),
    #[error("pattern {0:?}: malformed segment {1:?}")]
    MalformedSegment(String, String),
    #[error("pattern {0:?}: duplicate placeholder {1:?}")]
    DuplicatePlaceholder(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A path pattern compiled at startup.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern string. Malformed input is rejected here so the
    /// route table can refuse to start instead of failing mid-request.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if !raw.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(raw.to_string()));
        }

        let mut segments = Vec::new();
        if raw != "/" {
            for piece in raw[1..].split('/') {
                if piece.is_empty() {
                    return Err(PatternError::EmptySegment(raw.to_string()));
                }
                if let Some(name) = piece.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    if name.is_empty() {
                        return Err(PatternError::EmptyPlaceholder(raw.to_string()));
                    }
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(PatternError::MalformedSegment(
                            raw.to_string(),
                            piece.to_string(),
                        ));
                    }
                    let duplicate = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Placeholder(n) if n.as_str() == name));
                    if duplicate {
                        return Err(PatternError::DuplicatePlaceholder(
                            raw.to_string(),
                            name.to_string(),
                        ));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                } else if piece.contains('{') || piece.contains('}') {
                    return Err(PatternError::MalformedSegment(
                        raw.to_string(),
                        piece.to_string(),
                    ));
                } else {
                    segments.push(Segment::Literal(piece.to_string()));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern source text, used to group rules sharing a pattern.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Match a request path (query already stripped). Returns the bound
    /// placeholder values on success.
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        if !path.starts_with('/') {
            return None;
        }

        let tokens: Vec<&str> = if path == "/" {
            Vec::new()
        } else {
            path[1..].split('/').collect()
        };

        if tokens.len() != self.segments.len() {
            return None;
        }

        let mut vars = HashMap::new();
        for (segment, token) in self.segments.iter().zip(&tokens) {
            match segment {
                Segment::Literal(literal) => {
                    if literal.as_str() != *token {
                        return None;
                    }
                }
                Segment::Placeholder(name) => {
                    if token.is_empty() {
                        return None;
                    }
                    vars.insert(name.clone(), (*token).to_string());
                }
            }
        }
        Some(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::parse("/problem/list").unwrap();
        assert!(pattern.match_path("/problem/list").unwrap().is_empty());
        assert!(pattern.match_path("/problem").is_none());
        assert!(pattern.match_path("/problem/list/extra").is_none());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("/anything").is_none());
    }

    #[test]
    fn test_placeholder_binding() {
        let pattern = PathPattern::parse("/user/{id}").unwrap();
        let vars = pattern.match_path("/user/42").unwrap();
        assert_eq!(vars.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_placeholder_never_spans_slash() {
        let pattern = PathPattern::parse("/user/{id}").unwrap();
        assert!(pattern.match_path("/user/42/solutions").is_none());
    }

    #[test]
    fn test_placeholder_rejects_empty_segment() {
        let pattern = PathPattern::parse("/user/{id}").unwrap();
        assert!(pattern.match_path("/user//").is_none());
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let pattern = PathPattern::parse("/Problem").unwrap();
        assert!(pattern.match_path("/problem").is_none());
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        assert_eq!(
            PathPattern::parse("user/{id}").unwrap_err(),
            PatternError::MissingLeadingSlash("user/{id}".into())
        );
        assert_eq!(
            PathPattern::parse("/user//{id}").unwrap_err(),
            PatternError::EmptySegment("/user//{id}".into())
        );
        assert_eq!(
            PathPattern::parse("/user/{}").unwrap_err(),
            PatternError::EmptyPlaceholder("/user/{}".into())
        );
        assert!(matches!(
            PathPattern::parse("/user/{id"),
            Err(PatternError::MalformedSegment(_, _))
        ));
        assert!(matches!(
            PathPattern::parse("/diff/{id}/{id}"),
            Err(PatternError::DuplicatePlaceholder(_, _))
        ));
    }
}
