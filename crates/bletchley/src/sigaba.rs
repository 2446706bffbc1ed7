//! The SIGABA (ECM Mark II): a cipher bank whose rotors step irregularly
//! under the control of two more rotor banks.
//!
//! Only the cipher bank takes part in the substitution. Four fixed inputs
//! are passed through the control bank, the outputs are grouped into index
//! inputs, passed through the index bank, and the index outputs are grouped
//! into the set of cipher rotors that step after each letter.

use crate::Error;
use crate::constants::BANK_SIZE;
use crate::letter::{a2i_permissive, letter};
use crate::rotor::Rotor;

const DIGITS: u8 = 10;

/// The inputs to the control bank, F G H I.
const CONTROL_INPUTS: [u8; 4] = [5, 6, 7, 8];

/// The index input selected by each control output letter.
const CONTROL_GROUPS: [u8; 26] = [
    9, // A
    1, // B
    2, // C
    3, 3, // D E
    4, 4, 4, // F G H
    5, 5, 5, // I J K
    6, 6, 6, 6, // L M N O
    7, 7, 7, 7, 7, // P Q R S T
    8, 8, 8, 8, 8, 8, // U V W X Y Z
];

/// The cipher rotor stepped by each index output digit.
const INDEX_GROUPS: [usize; 10] = [0, 4, 4, 3, 3, 2, 2, 1, 1, 0];

/// The position a control rotor must reach for the next one to step.
const REFERENCE: char = 'O';

// control bank rotors by how often they step
const CONTROL_FAST: usize = 2;
const CONTROL_MEDIUM: usize = 3;
const CONTROL_SLOW: usize = 1;

/// An index rotor: a permutation of the digits 0 to 9. Index rotors are set
/// once and never step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRotor {
    map: [u8; DIGITS as usize],
    pos: u8,
}

impl IndexRotor {
    /// Create an index rotor from a wiring of the 10 unique digits and a
    /// position digit.
    pub fn new(wiring: &str, position: char) -> Result<Self, Error> {
        let mut map = [0; DIGITS as usize];
        let mut seen = [false; DIGITS as usize];
        if wiring.chars().count() != DIGITS as usize {
            Err(Error::Rotor(
                "index rotor wiring must be the 10 digits, each exactly once".to_string(),
            ))?;
        }
        for (i, c) in wiring.chars().enumerate() {
            let Some(d) = c.to_digit(10) else {
                return Err(Error::Rotor(format!("{c:?} is not a digit")));
            };
            if seen[d as usize] {
                return Err(Error::Rotor(format!(
                    "index rotor wiring must have each digit exactly once, found {c} twice"
                )));
            }
            seen[d as usize] = true;
            map[i] = d as u8;
        }
        let Some(pos) = position.to_digit(10) else {
            return Err(Error::Rotor(
                "index rotor position must be exactly one digit".to_string(),
            ));
        };
        Ok(IndexRotor {
            map,
            pos: pos as u8,
        })
    }

    #[inline]
    fn transform(&self, d: u8) -> u8 {
        let out = self.map[((d + self.pos) % DIGITS) as usize];
        (out + DIGITS - self.pos) % DIGITS
    }
}

/// A SIGABA with its three banks of five rotors, each bank ordered left to
/// right.
#[derive(Debug, Clone)]
pub struct Sigaba {
    cipher: Vec<Rotor>,
    control: Vec<Rotor>,
    index: Vec<IndexRotor>,
}

impl Sigaba {
    /// Create a new SIGABA. Returns an error unless every bank has exactly
    /// five rotors.
    pub fn new(
        cipher: Vec<Rotor>,
        control: Vec<Rotor>,
        index: Vec<IndexRotor>,
    ) -> Result<Self, Error> {
        for (name, len) in [
            ("cipher", cipher.len()),
            ("control", control.len()),
            ("index", index.len()),
        ] {
            if len != BANK_SIZE {
                Err(Error::Machine(format!(
                    "the SIGABA {name} bank must have {BANK_SIZE} rotors, got {len}"
                )))?;
            }
        }
        Ok(Sigaba {
            cipher,
            control,
            index,
        })
    }

    /// The cipher rotors that step next, as a mask indexed by bank position.
    fn stepping(&self) -> [bool; BANK_SIZE] {
        let mut inputs = [false; DIGITS as usize];
        for &c in CONTROL_INPUTS.iter() {
            let out = self
                .control
                .iter()
                .rev()
                .fold(c, |c, rotor| rotor.rev_transform(c));
            inputs[CONTROL_GROUPS[out as usize] as usize] = true;
        }

        let mut stepping = [false; BANK_SIZE];
        for d in (0..DIGITS).filter(|&d| inputs[d as usize]) {
            let out = self.index.iter().fold(d, |d, rotor| rotor.transform(d));
            stepping[INDEX_GROUPS[out as usize]] = true;
        }
        stepping
    }

    /// Step the control bank like an odometer.
    fn step_control(&mut self) {
        self.control[CONTROL_FAST].step();
        if self.control[CONTROL_FAST].window() == REFERENCE {
            self.control[CONTROL_MEDIUM].step();
            if self.control[CONTROL_MEDIUM].window() == REFERENCE {
                self.control[CONTROL_SLOW].step();
            }
        }
    }

    /// Step the machine once after a letter.
    pub fn step(&mut self) {
        let stepping = self.stepping();
        self.step_control();
        for (rotor, step) in self.cipher.iter_mut().zip(stepping) {
            if step {
                rotor.step();
            }
        }
    }

    /// Encrypt `input`. Spaces are typed as Z and Z as X. Characters other
    /// than letters and spaces are passed through without stepping.
    pub fn encrypt(&mut self, input: &str) -> String {
        input
            .chars()
            .map(|c| {
                let c = match c {
                    ' ' => 'Z',
                    'Z' | 'z' => 'X',
                    c => c,
                };
                match a2i_permissive(c) {
                    Some(i) => {
                        let out = self.cipher.iter().fold(i, |i, rotor| rotor.transform(i));
                        self.step();
                        letter(out)
                    }
                    None => c,
                }
            })
            .collect()
    }

    /// Decrypt `input`. Z decrypts to a space. Characters other than letters
    /// are passed through without stepping.
    pub fn decrypt(&mut self, input: &str) -> String {
        input
            .chars()
            .map(|c| match a2i_permissive(c) {
                Some(i) => {
                    let out = self
                        .cipher
                        .iter()
                        .rev()
                        .fold(i, |i, rotor| rotor.rev_transform(i));
                    self.step();
                    match letter(out) {
                        'Z' => ' ',
                        c => c,
                    }
                }
                None => c,
            })
            .collect()
    }

    /// The letters in the cipher and control rotor windows.
    pub fn windows(&self) -> (String, String) {
        (
            self.cipher.iter().map(Rotor::window).collect(),
            self.control.iter().map(Rotor::window).collect(),
        )
    }
}
