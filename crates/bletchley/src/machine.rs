//! The rotor machine core shared by the [`Enigma`](crate::enigma::Enigma) and
//! the [`Typex`](crate::typex::Typex).

use crate::Error;
use crate::constants::ENIGMA_STEPPING_ROTORS;
use crate::letter::{a2i_permissive, letter};
use crate::pairs::{Plugboard, Reflector};
use crate::rotor::Rotor;

/// The permutation a letter passes through before the first and after the
/// last rotor: a plugboard on the Enigma, the input wiring on the Typex.
pub trait Entry {
    /// Pass a letter from the keyboard towards the rotors.
    fn transform(&self, c: u8) -> u8;
    /// Pass a letter from the rotors towards the lamps.
    fn rev_transform(&self, c: u8) -> u8;
}

impl Entry for Plugboard {
    #[inline]
    fn transform(&self, c: u8) -> u8 {
        Plugboard::transform(self, c)
    }

    #[inline]
    fn rev_transform(&self, c: u8) -> u8 {
        Plugboard::transform(self, c)
    }
}

/// A reflecting rotor machine: an entry permutation, a stack of rotors
/// ordered from the entry (fast) side to the reflector (slow) side, and a
/// reflector.
///
/// Three consecutive rotors starting at `first_stepping` take part in the
/// stepping, with the Enigma's double-stepping anomaly. All other rotors are
/// stationary.
#[derive(Debug, Clone)]
pub struct CipherMachine<E> {
    rotors: Vec<Rotor>,
    reflector: Reflector,
    entry: E,
    first_stepping: usize,
}

impl<E: Entry> CipherMachine<E> {
    /// Create a new machine. Returns an error if there are not enough rotors
    /// after `first_stepping` for the stepping mechanism.
    pub fn new(
        rotors: Vec<Rotor>,
        reflector: Reflector,
        entry: E,
        first_stepping: usize,
    ) -> Result<Self, Error> {
        if rotors.len() < first_stepping + ENIGMA_STEPPING_ROTORS {
            Err(Error::Machine(format!(
                "need at least {} rotors, got {}",
                first_stepping + ENIGMA_STEPPING_ROTORS,
                rotors.len()
            )))?;
        }
        Ok(CipherMachine {
            rotors,
            reflector,
            entry,
            first_stepping,
        })
    }

    /// Step the rotor cage once.
    pub fn step(&mut self) {
        let f = self.first_stepping;
        let (fast, rest) = self.rotors[f..].split_at_mut(1);
        let (middle, rest) = rest.split_at_mut(1);
        let (fast, middle, slow) = (&mut fast[0], &mut middle[0], &mut rest[0]);

        let new = fast.step();
        // the middle rotor's pawl also engages its own notch, so it steps
        // whenever it is one position before a notch: the double step
        if fast.is_notch(new) || middle.is_notch(middle.pos() + 1) {
            let new = middle.step();
            if middle.is_notch(new) {
                slow.step();
            }
        }
    }

    /// Step the cage and encrypt a single letter index.
    #[inline]
    pub fn crypt_letter(&mut self, c: u8) -> u8 {
        self.step();
        let mut c = self.entry.transform(c);
        for rotor in self.rotors.iter() {
            c = rotor.transform(c);
        }
        c = self.reflector.transform(c);
        for rotor in self.rotors.iter().rev() {
            c = rotor.rev_transform(c);
        }
        self.entry.rev_transform(c)
    }

    /// Encrypt (or, equivalently, decrypt) a string. Letters of either case
    /// are encrypted to uppercase letters, everything else is passed through
    /// without stepping the rotors.
    pub fn crypt(&mut self, input: &str) -> String {
        input
            .chars()
            .map(|c| match a2i_permissive(c) {
                Some(i) => letter(self.crypt_letter(i)),
                None => c,
            })
            .collect()
    }

    /// The rotors, ordered from the entry side.
    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }

    /// The reflector.
    pub fn reflector(&self) -> &Reflector {
        &self.reflector
    }

    /// The entry permutation.
    pub fn entry(&self) -> &E {
        &self.entry
    }

    /// The letters in the rotor windows, read from the reflector side as an
    /// operator would.
    pub fn windows(&self) -> String {
        self.rotors.iter().rev().map(Rotor::window).collect()
    }
}
