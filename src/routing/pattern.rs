//! Path segment pattern compiler.
//!
//! # Responsibilities
//! - Classify one `/`-delimited segment of a route pattern
//! - Validate placeholder names and expression arity
//! - Bind captured values into [`Params`] during matching
//!
//! # Syntax
//! ```text
//! users           static, exact byte comparison
//! <id>            holder, binds the whole segment
//! <id:int>        holder with a descriptive type hint
//! <a,b ~ (x)(y)>  regexp, one name per capture group
//! *               match-all, binds the tail positionally as `*<level>`
//! *path           match-all, binds the tail as `path`
//! *_              match-all, binds nothing
//! ```
//!
//! # Design Decisions
//! - Pure function of the segment text, no shared state
//! - Expressions are anchored to the whole segment
//! - Kind order (`Static < Regexp < Holder < MatchAll`) is the tree's sibling precedence

use regex::Regex;

use crate::routing::error::PatternError;
use crate::routing::params::Params;

/// Parameter name that matches but is never bound.
pub const DISCARD: &str = "_";

/// Segment classification. The derived ordering is match precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentKind {
    Static,
    Regexp,
    Holder,
    MatchAll,
}

/// Compiled form of one path segment.
#[derive(Debug, Clone)]
pub struct PatternSegment {
    kind: SegmentKind,
    raw: String,
    names: Vec<String>,
    type_hint: Option<String>,
    matcher: Option<Regex>,
}

impl PatternSegment {
    /// Compile a single segment (no `/`).
    pub fn compile(raw: &str) -> Result<Self, PatternError> {
        if raw.trim() != raw {
            return Err(PatternError::Whitespace {
                pattern: raw.to_string(),
            });
        }

        if let Some(name) = raw.strip_prefix('*') {
            return Self::compile_match_all(raw, name);
        }

        if raw.contains(&['<', '>'][..]) {
            return Self::compile_bracketed(raw);
        }

        if raw.chars().any(char::is_whitespace) {
            return Err(PatternError::Whitespace {
                pattern: raw.to_string(),
            });
        }

        Ok(Self {
            kind: SegmentKind::Static,
            raw: raw.to_string(),
            names: Vec::new(),
            type_hint: None,
            matcher: None,
        })
    }

    /// The empty static segment every tree is rooted at.
    pub(crate) fn root() -> Self {
        Self {
            kind: SegmentKind::Static,
            raw: String::new(),
            names: Vec::new(),
            type_hint: None,
            matcher: None,
        }
    }

    fn compile_match_all(raw: &str, name: &str) -> Result<Self, PatternError> {
        if name.chars().any(char::is_whitespace) {
            return Err(PatternError::Whitespace {
                pattern: raw.to_string(),
            });
        }

        let names = if name.is_empty() {
            Vec::new()
        } else if is_valid_name(name) {
            vec![name.to_string()]
        } else {
            return Err(PatternError::InvalidName {
                pattern: raw.to_string(),
                name: name.to_string(),
            });
        };

        Ok(Self {
            kind: SegmentKind::MatchAll,
            raw: raw.to_string(),
            names,
            type_hint: None,
            matcher: None,
        })
    }

    fn compile_bracketed(raw: &str) -> Result<Self, PatternError> {
        let malformed = || PatternError::MalformedBrackets {
            pattern: raw.to_string(),
        };

        let inner = raw
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(malformed)?;

        let (declaration, expression) = match inner.split_once('~') {
            Some((declaration, expression)) => (declaration, Some(expression.trim())),
            None => (inner, None),
        };
        if declaration.contains(&['<', '>'][..]) {
            return Err(malformed());
        }

        let (name_list, type_hint) = match declaration.split_once(':') {
            Some((names, hint)) => (names, Some(hint.trim())),
            None => (declaration, None),
        };
        let type_hint = type_hint.filter(|h| !h.is_empty()).map(str::to_string);

        let names: Vec<String> = if name_list.trim().is_empty() {
            Vec::new()
        } else {
            name_list.split(',').map(|n| n.trim().to_string()).collect()
        };
        if let Some(bad) = names.iter().find(|n| !is_valid_name(n)) {
            return Err(PatternError::InvalidName {
                pattern: raw.to_string(),
                name: bad.clone(),
            });
        }

        let Some(expression) = expression else {
            if names.len() != 1 {
                return Err(PatternError::HolderArity {
                    pattern: raw.to_string(),
                    count: names.len(),
                });
            }
            return Ok(Self {
                kind: SegmentKind::Holder,
                raw: raw.to_string(),
                names,
                type_hint,
                matcher: None,
            });
        };

        if names.is_empty() {
            return Err(PatternError::MissingNames {
                pattern: raw.to_string(),
            });
        }

        let matcher =
            Regex::new(&format!("^(?:{expression})$")).map_err(|source| PatternError::Regex {
                pattern: raw.to_string(),
                source,
            })?;

        // A group-less expression with a single name binds the whole match.
        let groups = matcher.captures_len() - 1;
        if groups != names.len() && !(groups == 0 && names.len() == 1) {
            return Err(PatternError::CaptureCount {
                pattern: raw.to_string(),
                names: names.len(),
                groups,
            });
        }

        Ok(Self {
            kind: SegmentKind::Regexp,
            raw: raw.to_string(),
            names,
            type_hint,
            matcher: Some(matcher),
        })
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Pattern text as declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Literal text for static segments.
    pub fn literal(&self) -> Option<&str> {
        (self.kind == SegmentKind::Static).then_some(self.raw.as_str())
    }

    /// Declared parameter names, in capture order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The `int` of `<id:int>`. Informational only.
    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    pub fn is_static(&self) -> bool {
        self.kind == SegmentKind::Static
    }

    /// Test `segment` against the expression and bind its groups on success.
    pub(crate) fn bind_regexp(&self, segment: &str, params: &mut Params) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        let Some(captures) = matcher.captures(segment) else {
            return false;
        };

        if matcher.captures_len() == 1 {
            if let Some(name) = self.names.first() {
                bind_name(name, segment, params);
            }
        } else {
            for (i, name) in self.names.iter().enumerate() {
                let value = captures.get(i + 1).map_or("", |m| m.as_str());
                bind_name(name, value, params);
            }
        }
        true
    }

    pub(crate) fn bind_holder(&self, segment: &str, params: &mut Params) {
        if let Some(name) = self.names.first() {
            bind_name(name, segment, params);
        }
    }

    /// Bind a match-all value; unnamed globs use their nesting level.
    pub(crate) fn bind_glob(&self, level: usize, value: &str, params: &mut Params) {
        match self.names.first() {
            Some(name) => bind_name(name, value, params),
            None => params.push(format!("*{level}"), value),
        }
    }
}

fn bind_name(name: &str, value: &str, params: &mut Params) {
    if name != DISCARD {
        params.push(name, value);
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
