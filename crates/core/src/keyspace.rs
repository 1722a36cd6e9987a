//! Key-space enumeration strategies.
//!
//! Every strategy yields a lazy `Iterator<Item = Key>`; `None` marks the end
//! of the sequence. Random draws come from the operating system's CSPRNG so
//! the query order is not predictable from the endpoint's side.

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::key::{Key, is_key_char};

/// Lowercase ASCII letters, the default alphabet for random draws.
pub const LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Digits followed by lowercase letters, the default alphabet for exhaustive enumeration.
pub const ALPHANUMERIC: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Boxed key sequence handed to the orchestrator.
pub type KeySource = Box<dyn Iterator<Item = Key> + Send>;

/// How the key space is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyStrategy {
    /// A fixed number of random two-character keys.
    Random,
    /// Every single character, then every ordered pair.
    #[default]
    Exhaustive,
    /// Random two-character keys without end.
    RandomForever,
}

impl KeyStrategy {
    /// Alphabet used when the configuration does not name one.
    pub fn default_alphabet(self) -> &'static str {
        match self {
            KeyStrategy::Random | KeyStrategy::RandomForever => LETTERS,
            KeyStrategy::Exhaustive => ALPHANUMERIC,
        }
    }

    /// Whether the sequence ends on its own.
    pub fn is_bounded(self) -> bool {
        !matches!(self, KeyStrategy::RandomForever)
    }
}

/// An ordered set of distinct, filesystem-safe key symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    pub fn new(symbols: &str) -> Result<Self, Error> {
        if symbols.is_empty() {
            return Err(Error::InvalidAlphabet("alphabet must not be empty".into()));
        }

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(symbols.len());
        for c in symbols.chars() {
            if !is_key_char(c) {
                return Err(Error::InvalidAlphabet(format!("{c:?} is not in [a-z0-9]")));
            }
            if !seen.insert(c) {
                return Err(Error::InvalidAlphabet(format!("{c:?} appears more than once")));
            }
            out.push(c);
        }

        Ok(Self { symbols: out })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

/// Build the key sequence for a strategy.
///
/// `iterations` only applies to [`KeyStrategy::Random`].
pub fn keys(strategy: KeyStrategy, alphabet: Alphabet, iterations: u64) -> KeySource {
    match strategy {
        KeyStrategy::Random => Box::new(RandomKeys::new(alphabet, Some(iterations))),
        KeyStrategy::RandomForever => Box::new(RandomKeys::new(alphabet, None)),
        KeyStrategy::Exhaustive => Box::new(exhaustive(alphabet)),
    }
}

/// Random two-character keys drawn with `OsRng`.
#[derive(Debug)]
pub struct RandomKeys {
    alphabet: Alphabet,
    remaining: Option<u64>,
}

impl RandomKeys {
    /// `remaining = None` never ends.
    pub fn new(alphabet: Alphabet, remaining: Option<u64>) -> Self {
        Self { alphabet, remaining }
    }

    fn draw(&self) -> Key {
        let n = self.alphabet.len();
        let first = self.alphabet.symbols[OsRng.gen_range(0..n)];
        let second = self.alphabet.symbols[OsRng.gen_range(0..n)];
        Key::from_symbols(&[first, second])
    }
}

impl Iterator for RandomKeys {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        Some(self.draw())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => {
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                (n, Some(n))
            }
            None => (usize::MAX, None),
        }
    }
}

/// Every single symbol, then every ordered pair, deduplicated in first-seen order.
pub fn exhaustive(alphabet: Alphabet) -> impl Iterator<Item = Key> + Send {
    let singles: Vec<Key> = alphabet.symbols.iter().map(|&c| Key::from_symbols(&[c])).collect();
    let symbols = alphabet.symbols;
    let pairs = (0..symbols.len() * symbols.len()).map(move |i| {
        let n = symbols.len();
        Key::from_symbols(&[symbols[i / n], symbols[i % n]])
    });

    let mut seen = HashSet::new();
    singles.into_iter().chain(pairs).filter(move |key| seen.insert(key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustive_count() {
        let keys: Vec<Key> = exhaustive(Alphabet::new(ALPHANUMERIC).unwrap()).collect();
        assert_eq!(keys.len(), 36 + 36 * 36);

        let distinct: HashSet<&Key> = keys.iter().collect();
        assert_eq!(distinct.len(), 1332);
    }

    #[test]
    fn test_exhaustive_order() {
        let keys: Vec<String> = exhaustive(Alphabet::new(ALPHANUMERIC).unwrap())
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys[0], "0");
        assert_eq!(keys[35], "z");
        assert_eq!(keys[36], "00");
        assert_eq!(keys[37], "01");
        assert_eq!(keys.last().unwrap(), "zz");
        assert!(keys.iter().all(|k| k.chars().all(|c| ALPHANUMERIC.contains(c))));
    }

    #[test]
    fn test_random_keys_bounded() {
        let keys: Vec<Key> = keys(KeyStrategy::Random, Alphabet::new(LETTERS).unwrap(), 50).collect();
        assert_eq!(keys.len(), 50);
        for key in keys {
            assert_eq!(key.as_str().len(), 2);
            assert!(key.as_str().chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_random_keys_zero_iterations() {
        let mut keys = RandomKeys::new(Alphabet::new(LETTERS).unwrap(), Some(0));
        assert!(keys.next().is_none());
    }

    #[test]
    fn test_random_forever_keeps_going() {
        let keys = keys(KeyStrategy::RandomForever, Alphabet::new("ab").unwrap(), 1);
        assert_eq!(keys.take(500).count(), 500);
    }

    #[test]
    fn test_random_keys_cover_alphabet() {
        let seen: HashSet<char> = RandomKeys::new(Alphabet::new("xyz").unwrap(), Some(300))
            .flat_map(|k| k.as_str().chars().collect::<Vec<_>>())
            .collect();
        assert_eq!(seen, HashSet::from(['x', 'y', 'z']));
    }

    #[test]
    fn test_alphabet_validation() {
        assert!(Alphabet::new(LETTERS).is_ok());
        assert!(matches!(Alphabet::new(""), Err(Error::InvalidAlphabet(_))));
        assert!(matches!(Alphabet::new("abca"), Err(Error::InvalidAlphabet(_))));
        assert!(matches!(Alphabet::new("aB"), Err(Error::InvalidAlphabet(_))));
        assert!(matches!(Alphabet::new("a/"), Err(Error::InvalidAlphabet(_))));
    }

    #[test]
    fn test_strategy_defaults() {
        assert_eq!(KeyStrategy::Random.default_alphabet(), LETTERS);
        assert_eq!(KeyStrategy::Exhaustive.default_alphabet().len(), 36);
        assert!(!KeyStrategy::RandomForever.is_bounded());
        assert!(KeyStrategy::Exhaustive.is_bounded());
    }
}
