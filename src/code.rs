use crate::error::{LabelError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

pub const MIN_LEN: usize = 6;
pub const MAX_LEN: usize = 8;

/// A validated cartridge barcode, e.g. `CA0001L6`.
///
/// Only ASCII letters and digits are accepted, so byte length and character
/// count coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code(String);

impl Code {
    pub fn parse(input: &str) -> Result<Self> {
        if !CODE_RE.is_match(input) {
            return Err(LabelError::InvalidFormat(input.to_string()));
        }
        let len = input.len();
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(LabelError::InvalidLength { len });
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Characters that get a colored cell of their own.
    pub fn leading(&self) -> &str {
        &self.0[..self.0.len() - 2]
    }

    /// The two trailing characters that share the last cell.
    pub fn trailing(&self) -> &str {
        &self.0[self.0.len() - 2..]
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
