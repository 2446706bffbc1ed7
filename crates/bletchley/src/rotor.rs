//! Rotors as part of a [`CipherMachine`](crate::machine::CipherMachine) or a
//! [`Bombe`](crate::bombe::Bombe).
//!
//! A rotor is a permutation of the alphabet that is offset by its current
//! position. The permutation tables are immutable and shared between copies
//! of the same rotor (the Bombe makes one copy per menu edge), so a copy only
//! duplicates the ring setting, notches and position.

use std::fmt;
use std::sync::Arc;

use crate::Error;
use crate::constants::ALPHABET_SIZE;
use crate::letter::{a2i, letter};

const N: u8 = ALPHABET_SIZE as u8;

/// The immutable permutation tables of a rotor.
#[derive(Debug, PartialEq, Eq)]
struct Wiring {
    map: [u8; ALPHABET_SIZE],
    rev_map: [u8; ALPHABET_SIZE],
}

impl Wiring {
    fn parse(wiring: &str) -> Result<Self, Error> {
        if wiring.len() != ALPHABET_SIZE || !wiring.chars().all(|c| c.is_ascii_uppercase()) {
            Err(Error::Rotor(
                "wiring must be 26 unique uppercase letters".to_string(),
            ))?;
        }

        let mut map = [0; ALPHABET_SIZE];
        let mut rev_map = [0; ALPHABET_SIZE];
        let mut seen = [false; ALPHABET_SIZE];
        for (a, c) in wiring.chars().enumerate() {
            let b = a2i(c)?;
            if seen[b as usize] {
                Err(Error::Rotor(format!(
                    "wiring must have each letter exactly once, found {c} twice"
                )))?;
            }
            seen[b as usize] = true;
            map[a] = b;
            rev_map[b as usize] = a as u8;
        }

        Ok(Wiring { map, rev_map })
    }
}

/// Split a rotor specification `"<wiring>[<steps]"` into wiring and steps.
pub fn split_spec(spec: &str) -> Result<(&str, &str), Error> {
    if spec.is_empty() {
        Err(Error::Rotor("empty rotor specification".to_string()))?;
    }
    Ok(spec.split_once('<').unwrap_or((spec, "")))
}

/// A rotor with shared wiring and its own position.
#[derive(Clone, PartialEq, Eq)]
pub struct Rotor {
    wiring: Arc<Wiring>,
    // bit i set when position i (already offset by the ring) is a notch
    notches: u32,
    ring: u8,
    pos: u8,
}

impl Rotor {
    /// Create a new rotor.
    ///
    /// The `wiring` is 26 unique uppercase letters giving the output for the
    /// inputs A..Z, `steps` is zero to 26 unique uppercase letters naming the
    /// positions at which the next rotor steps, and `ring_setting` and
    /// `initial_position` are single uppercase letters. Returns an error on
    /// any malformed argument.
    pub fn new(
        wiring: &str,
        steps: &str,
        ring_setting: char,
        initial_position: char,
    ) -> Result<Self, Error> {
        let wiring = Wiring::parse(wiring)?;
        Self::with_wiring(Arc::new(wiring), steps, ring_setting, initial_position)
    }

    /// Create a new rotor from a `"<wiring>[<steps]"` specification string,
    /// e.g., `"EKMFLGDQVZNTOWYHXUSPAIBRCJ<R"`.
    pub fn from_spec(
        spec: &str,
        ring_setting: char,
        initial_position: char,
    ) -> Result<Self, Error> {
        let (wiring, steps) = split_spec(spec)?;
        Self::new(wiring, steps, ring_setting, initial_position)
    }

    /// Create a rotor inserted back to front, as a Typex operator could do.
    /// Both the inputs and outputs of the wiring are mirrored.
    pub fn reversed(
        wiring: &str,
        steps: &str,
        ring_setting: char,
        initial_position: char,
    ) -> Result<Self, Error> {
        let forward = Wiring::parse(wiring)?;
        let mut map = [0; ALPHABET_SIZE];
        let mut rev_map = [0; ALPHABET_SIZE];
        for (i, &out) in forward.map.iter().enumerate() {
            let input = (N - i as u8) % N;
            let output = (N - out) % N;
            map[input as usize] = output;
            rev_map[output as usize] = input;
        }
        Self::with_wiring(
            Arc::new(Wiring { map, rev_map }),
            steps,
            ring_setting,
            initial_position,
        )
    }

    fn with_wiring(
        wiring: Arc<Wiring>,
        steps: &str,
        ring_setting: char,
        initial_position: char,
    ) -> Result<Self, Error> {
        if steps.len() > ALPHABET_SIZE || !steps.chars().all(|c| c.is_ascii_uppercase()) {
            Err(Error::Rotor(
                "steps must be 0-26 unique uppercase letters".to_string(),
            ))?;
        }
        let ring = a2i(ring_setting).map_err(|_| {
            Error::Rotor("ring setting must be exactly one uppercase letter".to_string())
        })?;
        let initial = a2i(initial_position).map_err(|_| {
            Error::Rotor("initial position must be exactly one uppercase letter".to_string())
        })?;

        let mut notches = 0u32;
        for c in steps.chars() {
            let step = (a2i(c)? + N - ring) % N;
            if notches & (1 << step) != 0 {
                Err(Error::Rotor(format!("steps must be unique, found {c} twice")))?;
            }
            notches |= 1 << step;
        }

        Ok(Rotor {
            wiring,
            notches,
            ring,
            pos: (initial + N - ring) % N,
        })
    }

    /// Step the rotor one position forward, returning the new position.
    #[inline]
    pub fn step(&mut self) -> u8 {
        self.pos = (self.pos + 1) % N;
        self.pos
    }

    /// Pass a letter through the rotor from the entry side.
    #[inline]
    pub fn transform(&self, c: u8) -> u8 {
        let out = self.wiring.map[((c + self.pos) % N) as usize];
        (out + N - self.pos) % N
    }

    /// Pass a letter through the rotor from the reflector side.
    #[inline]
    pub fn rev_transform(&self, c: u8) -> u8 {
        let out = self.wiring.rev_map[((c + self.pos) % N) as usize];
        (out + N - self.pos) % N
    }

    /// The current position, offset by the ring setting.
    #[inline]
    pub fn pos(&self) -> u8 {
        self.pos
    }

    /// Set the current position (offset by the ring setting), modulo 26.
    pub fn set_pos(&mut self, pos: u8) {
        self.pos = pos % N;
    }

    /// Returns true if `pos` is one of the rotor's stepping positions.
    #[inline]
    pub fn is_notch(&self, pos: u8) -> bool {
        self.notches & (1 << (pos % N)) != 0
    }

    /// Returns true if the rotor has any stepping position at all.
    pub fn has_notches(&self) -> bool {
        self.notches != 0
    }

    /// The ring setting as an alphabet index.
    pub fn ring(&self) -> u8 {
        self.ring
    }

    /// The letter shown in the machine's window for the current position.
    pub fn window(&self) -> char {
        letter((self.pos + self.ring) % N)
    }

    /// Returns true if both rotors share the same wiring tables.
    pub fn shares_wiring(&self, other: &Rotor) -> bool {
        Arc::ptr_eq(&self.wiring, &other.wiring)
    }
}

impl fmt::Debug for Rotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wiring: String = self.wiring.map.iter().map(|&i| letter(i)).collect();
        let notches: String = (0..N)
            .filter(|&p| self.is_notch(p))
            .map(|p| letter((p + self.ring) % N))
            .collect();
        f.debug_struct("Rotor")
            .field("wiring", &wiring)
            .field("notches", &notches)
            .field("ring", &letter(self.ring))
            .field("window", &self.window())
            .finish()
    }
}
