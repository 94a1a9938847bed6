//! Path parameters extracted during matching.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// One bound parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub value: String,
}

/// Failure to read a typed parameter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("path parameter `{0}` is not bound")]
    Missing(String),

    #[error("path parameter `{name}` = `{value}` is invalid: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Ordered parameter bindings, in match order.
///
/// A name bound more than once keeps every binding; lookups return the latest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Parse the value bound to `name`, e.g. `params.parse::<u64>("id")`.
    pub fn parse<T>(&self, name: &str) -> Result<T, ParamError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self
            .get(name)
            .ok_or_else(|| ParamError::Missing(name.to_string()))?;
        value.parse::<T>().map_err(|e| ParamError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Value of the deepest positional glob (`*0`, `*1`, ...).
    ///
    /// With nested globs this is only the deepest glob's share of the path: `/file/*/*` on
    /// `/file/f/a.png` gives `a.png`, with `f` under `*0`. No key holds the whole remainder;
    /// name a single trailing glob (`/file/*rest`) to capture it in one value.
    pub fn tail(&self) -> Option<&str> {
        self.entries
            .iter()
            .filter_map(|p| {
                let level: usize = p.name.strip_prefix('*')?.parse().ok()?;
                Some((level, p.value.as_str()))
            })
            .max_by_key(|(level, _)| *level)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.entries.iter()
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Param {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Drop bindings made after `len`; used to undo an abandoned branch.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
