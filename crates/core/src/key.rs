//! Search keys.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Maximum number of characters in a key.
pub const MAX_KEY_LEN: usize = 2;

/// Extension appended to a key to form its cache file name.
const CACHE_EXTENSION: &str = "json";

/// A short search key drawn from `[a-z0-9]`.
///
/// Keys double as cache file stems, so the constructor rejects anything that
/// is not filesystem-safe instead of escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Validate and wrap a key string.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        let len = value.chars().count();
        if len == 0 || len > MAX_KEY_LEN {
            return Err(Error::InvalidKey(format!("{value:?}: length must be 1-{MAX_KEY_LEN}")));
        }
        if !value.chars().all(is_key_char) {
            return Err(Error::InvalidKey(format!("{value:?}: only [a-z0-9] allowed")));
        }
        Ok(Self(value))
    }

    /// Build a key from symbols already checked by an `Alphabet`.
    pub(crate) fn from_symbols(symbols: &[char]) -> Self {
        Self(symbols.iter().collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the cache entry holding this key's search response.
    pub fn cache_file_name(&self) -> String {
        format!("{}.{CACHE_EXTENSION}", self.0)
    }
}

/// Characters allowed in keys and alphabets.
pub(crate) fn is_key_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
