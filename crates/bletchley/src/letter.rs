//! Conversion between letters and alphabet indexes in [0,26).

use crate::Error;
use crate::constants::ALPHABET_SIZE;

/// Convert an uppercase ASCII letter to its alphabet index.
pub fn a2i(c: char) -> Result<u8, Error> {
    if c.is_ascii_uppercase() {
        Ok(c as u8 - b'A')
    } else {
        Err(Error::Letter(format!("{c:?} is not an uppercase ASCII letter")))
    }
}

/// Convert an ASCII letter of either case to its alphabet index, returning
/// `None` for anything else.
pub fn a2i_permissive(c: char) -> Option<u8> {
    if c.is_ascii_uppercase() {
        Some(c as u8 - b'A')
    } else if c.is_ascii_lowercase() {
        Some(c as u8 - b'a')
    } else {
        None
    }
}

/// Convert an alphabet index to its uppercase letter.
pub fn i2a(i: u8) -> Result<char, Error> {
    if (i as usize) < ALPHABET_SIZE {
        Ok(letter(i))
    } else {
        Err(Error::Letter(format!("index {i} is outside 0..26")))
    }
}

/// Infallible [`i2a`] for indexes produced by the machines themselves, which
/// are always in range.
#[inline]
pub(crate) fn letter(i: u8) -> char {
    debug_assert!((i as usize) < ALPHABET_SIZE);
    (b'A' + i) as char
}

/// Keep only the ASCII letters of `s`, uppercased.
pub fn letters_only(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Split `s` into blocks of five characters separated by spaces.
pub fn group5(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 5);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && i % 5 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
