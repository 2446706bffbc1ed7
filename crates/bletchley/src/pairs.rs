//! Letter-pair permutations: the [`Reflector`] and the [`Plugboard`].

use std::fmt;

use crate::Error;
use crate::constants::ALPHABET_SIZE;
use crate::letter::{a2i, letter};

/// Parse a whitespace-separated list of uppercase letter pairs into a partial
/// involution. Self pairs are ignored. Errors are built by `err`.
fn parse_pairs(
    pairs: &str,
    err: fn(String) -> Error,
) -> Result<[Option<u8>; ALPHABET_SIZE], Error> {
    let mut map = [None; ALPHABET_SIZE];
    for pair in pairs.split_whitespace() {
        let mut chars = pair.chars();
        let (Some(a), Some(b), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(err(format!(
                "{pair:?} is not a pair, expected a whitespace-separated list of uppercase letter pairs"
            )));
        };
        let (Ok(x), Ok(y)) = (a2i(a), a2i(b)) else {
            return Err(err(format!(
                "{pair:?} is not a pair of uppercase letters"
            )));
        };
        if x == y {
            continue;
        }
        if map[x as usize].is_some() {
            return Err(err(format!("connects {a} more than once")));
        }
        if map[y as usize].is_some() {
            return Err(err(format!("connects {b} more than once")));
        }
        map[x as usize] = Some(y);
        map[y as usize] = Some(x);
    }
    Ok(map)
}

/// Write the pairs of an involution `map`, each pair once, in alphabetical
/// order of the lower letter.
fn fmt_pairs(map: &[u8; ALPHABET_SIZE], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (a, &b) in map.iter().enumerate() {
        if (a as u8) < b {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}{}", letter(a as u8), letter(b))?;
            first = false;
        }
    }
    Ok(())
}

/// A reflector: an involution without fixed points over the whole alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reflector {
    map: [u8; ALPHABET_SIZE],
}

impl Reflector {
    /// Create a reflector from exactly 13 pairs covering every letter, e.g.,
    /// `"AY BR CU DH EQ FS GL IP JX KN MO TZ VW"`.
    pub fn new(pairs: &str) -> Result<Self, Error> {
        let parsed = parse_pairs(pairs, Error::Reflector)?;
        let mut map = [0; ALPHABET_SIZE];
        for (i, m) in parsed.iter().enumerate() {
            let Some(m) = m else {
                return Err(Error::Reflector(
                    "must have exactly 13 pairs covering every letter".to_string(),
                ));
            };
            map[i] = *m;
        }
        Ok(Reflector { map })
    }

    /// Reflect a letter.
    #[inline]
    pub fn transform(&self, c: u8) -> u8 {
        self.map[c as usize]
    }
}

impl fmt::Display for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_pairs(&self.map, f)
    }
}

/// A plugboard (Steckerbrett): a partial involution. Letters not connected
/// map to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugboard {
    map: [u8; ALPHABET_SIZE],
}

impl Plugboard {
    /// Create a plugboard from zero to 13 letter pairs, e.g., `"AB CD"`.
    pub fn new(pairs: &str) -> Result<Self, Error> {
        let parsed = parse_pairs(pairs, Error::Plugboard)?;
        let mut map = [0; ALPHABET_SIZE];
        for (i, m) in parsed.iter().enumerate() {
            map[i] = m.unwrap_or(i as u8);
        }
        Ok(Plugboard { map })
    }

    /// Create a plugboard from pairs of alphabet indexes. Self pairs are
    /// ignored.
    pub fn from_pairs(pairs: &[(u8, u8)]) -> Result<Self, Error> {
        let mut p = Plugboard::default();
        for &(a, b) in pairs {
            if a == b {
                continue;
            }
            let (ai, bi) = (a as usize, b as usize);
            if ai >= ALPHABET_SIZE || bi >= ALPHABET_SIZE {
                return Err(Error::Plugboard(format!("pair ({a}, {b}) is out of range")));
            }
            if p.map[ai] != a || p.map[bi] != b {
                return Err(Error::Plugboard(format!(
                    "connects {} or {} more than once",
                    letter(a),
                    letter(b)
                )));
            }
            p.map[ai] = b;
            p.map[bi] = a;
        }
        Ok(p)
    }

    /// The number of connected pairs.
    pub fn len(&self) -> usize {
        self.map.iter().enumerate().filter(|&(i, &m)| (i as u8) < m).count()
    }

    /// Returns true if no pairs are connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pass a letter through the plugboard.
    #[inline]
    pub fn transform(&self, c: u8) -> u8 {
        self.map[c as usize]
    }
}

impl Default for Plugboard {
    fn default() -> Self {
        let mut map = [0; ALPHABET_SIZE];
        for (i, m) in map.iter_mut().enumerate() {
            *m = i as u8;
        }
        Plugboard { map }
    }
}

impl fmt::Display for Plugboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_pairs(&self.map, f)
    }
}
