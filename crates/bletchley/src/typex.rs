//! The Typex: an Enigma-style machine with five rotors, two of them
//! stationary, an input wiring in place of the plugboard and a keyboard that
//! can type figures.

use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::constants::{ALPHABET_SIZE, BANK_SIZE, TYPEX_STATORS};
use crate::letter::{a2i, group5, letters_only};
use crate::machine::{CipherMachine, Entry};
use crate::pairs::Reflector;
use crate::rotor::Rotor;

/// The figure typed by each letter key while the keyboard is in figures
/// mode.
const FIGURES: [(char, char); 22] = [
    ('Q', '1'),
    ('W', '2'),
    ('E', '3'),
    ('R', '4'),
    ('T', '5'),
    ('Y', '6'),
    ('U', '7'),
    ('I', '8'),
    ('O', '9'),
    ('P', '0'),
    ('A', '-'),
    ('S', '/'),
    ('D', 'Z'),
    ('F', '%'),
    ('G', 'X'),
    ('H', '£'),
    ('K', '('),
    ('L', ')'),
    ('C', 'V'),
    ('B', '\''),
    ('N', ','),
    ('M', '.'),
];

const ENTER_FIGURES: char = 'Z';
const ENTER_LETTERS: char = 'V';
const SPACE: char = 'X';

fn figure_of(key: char) -> Option<char> {
    FIGURES.iter().find(|(k, _)| *k == key).map(|(_, f)| *f)
}

fn key_of(figure: char) -> Option<char> {
    FIGURES.iter().find(|(_, f)| *f == figure).map(|(k, _)| *k)
}

/// The Typex input wiring, a permutation between the keyboard and the
/// stators. The empty wiring is the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputWiring {
    map: [u8; ALPHABET_SIZE],
    rev_map: [u8; ALPHABET_SIZE],
}

impl InputWiring {
    /// Create an input wiring from 26 unique uppercase letters, or the
    /// identity from the empty string.
    pub fn new(wiring: &str) -> Result<Self, Error> {
        if wiring.is_empty() {
            return Ok(InputWiring::default());
        }
        // the wiring rules are those of a rotor
        let rotor = Rotor::new(wiring, "", 'A', 'A')?;
        let mut map = [0; ALPHABET_SIZE];
        let mut rev_map = [0; ALPHABET_SIZE];
        for i in 0..ALPHABET_SIZE as u8 {
            let out = rotor.transform(i);
            map[i as usize] = out;
            rev_map[out as usize] = i;
        }
        Ok(InputWiring { map, rev_map })
    }
}

impl Default for InputWiring {
    fn default() -> Self {
        let mut map = [0; ALPHABET_SIZE];
        for (i, m) in map.iter_mut().enumerate() {
            *m = i as u8;
        }
        InputWiring { map, rev_map: map }
    }
}

// the keyboard is wired to the output side of the wiring
impl Entry for InputWiring {
    #[inline]
    fn transform(&self, c: u8) -> u8 {
        self.rev_map[c as usize]
    }

    #[inline]
    fn rev_transform(&self, c: u8) -> u8 {
        self.map[c as usize]
    }
}

/// How the keyboard treats figures and spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Keyboard {
    /// Letters only, everything else passes through.
    #[default]
    None,
    /// Escape spaces and figures in the plaintext before encrypting.
    Encrypt,
    /// Unescape spaces and figures after decrypting.
    Decrypt,
}

impl FromStr for Keyboard {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Keyboard::None),
            "encrypt" => Ok(Keyboard::Encrypt),
            "decrypt" => Ok(Keyboard::Decrypt),
            _ => Err(Error::Machine(format!(
                "unknown keyboard mode {s:?}, expected none, encrypt or decrypt"
            ))),
        }
    }
}

impl fmt::Display for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyboard::None => write!(f, "none"),
            Keyboard::Encrypt => write!(f, "encrypt"),
            Keyboard::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// Escape plaintext for typing: spaces become X and every run of figures is
/// typed between Z and V. A space inside a run stays in figures mode, and
/// characters without a key pass through unchanged.
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    let mut figures = false;
    for c in input.chars() {
        let c = c.to_ascii_uppercase();
        if c == ' ' {
            out.push(SPACE);
        } else if let Some(key) = key_of(c) {
            if !figures {
                out.push(ENTER_FIGURES);
                figures = true;
            }
            out.push(key);
        } else if a2i(c).is_ok() {
            if figures {
                out.push(ENTER_LETTERS);
                figures = false;
            }
            out.push(c);
        } else {
            out.push(c);
        }
    }
    if figures {
        out.push(ENTER_LETTERS);
    }
    out
}

/// Undo [`escape`] on decrypted text. X is a space in both modes, no key
/// types it as a figure.
fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut figures = false;
    for c in input.chars() {
        match c {
            SPACE => out.push(' '),
            ENTER_LETTERS if figures => figures = false,
            ENTER_FIGURES if !figures => figures = true,
            _ if figures => out.push(figure_of(c).unwrap_or(c)),
            _ => out.push(c),
        }
    }
    out
}

/// A Typex.
///
/// The five rotors are ordered from the entry side: rotors 0 and 1 are
/// stators, rotor 2 is the fast rotor and rotors 3 and 4 step like the
/// Enigma's middle and slow rotors.
#[derive(Debug, Clone)]
pub struct Typex {
    machine: CipherMachine<InputWiring>,
    keyboard: Keyboard,
}

impl Typex {
    /// Create a new Typex. Returns an error unless there are exactly five
    /// rotors.
    pub fn new(
        rotors: Vec<Rotor>,
        reflector: Reflector,
        input: InputWiring,
        keyboard: Keyboard,
    ) -> Result<Self, Error> {
        if rotors.len() != BANK_SIZE {
            Err(Error::Machine(format!(
                "a Typex must have {BANK_SIZE} rotors, got {}",
                rotors.len()
            )))?;
        }
        Ok(Typex {
            machine: CipherMachine::new(rotors, reflector, input, TYPEX_STATORS)?,
            keyboard,
        })
    }

    /// Encrypt or decrypt `input`, escaping or unescaping figures according
    /// to the keyboard mode.
    pub fn crypt(&mut self, input: &str) -> String {
        let output = match self.keyboard {
            Keyboard::Encrypt => self.machine.crypt(&escape(input)),
            _ => self.machine.crypt(input),
        };
        match self.keyboard {
            Keyboard::Decrypt => unescape(&output),
            _ => output,
        }
    }

    /// Like [`Typex::crypt`], but strips everything except letters from the
    /// machine's output and groups it in blocks of five.
    pub fn crypt_strict(&mut self, input: &str) -> String {
        group5(&letters_only(&self.crypt(input)))
    }

    /// The letters in the rotor windows, left to right.
    pub fn windows(&self) -> String {
        self.machine.windows()
    }

    /// The keyboard mode.
    pub fn keyboard(&self) -> Keyboard {
        self.keyboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{TYPEX_REFLECTOR, TYPEX_ROTORS};
    use crate::rotor::split_spec;

    fn typex(keyboard: Keyboard, input: &str) -> Typex {
        let mut rotors = Vec::new();
        for (i, (_, spec)) in TYPEX_ROTORS.iter().take(BANK_SIZE).enumerate() {
            let (wiring, steps) = split_spec(spec).unwrap();
            let r = if i % 2 == 1 {
                Rotor::reversed(wiring, steps, 'C', 'F').unwrap()
            } else {
                Rotor::new(wiring, steps, 'A', 'K').unwrap()
            };
            rotors.push(r);
        }
        Typex::new(
            rotors,
            Reflector::new(TYPEX_REFLECTOR).unwrap(),
            InputWiring::new(input).unwrap(),
            keyboard,
        )
        .unwrap()
    }

    #[test]
    fn five_rotors() {
        let r = || Rotor::from_spec(TYPEX_ROTORS[0].1, 'A', 'A').unwrap();
        let refl = Reflector::new(TYPEX_REFLECTOR).unwrap();
        let typex = |rotors, refl| Typex::new(rotors, refl, InputWiring::default(), Keyboard::None);
        assert!(typex(vec![r(), r(), r(), r()], refl.clone()).is_err());
        assert!(typex(vec![r(), r(), r(), r(), r()], refl).is_ok());
    }

    #[test]
    fn stators_never_step() {
        let mut t = typex(Keyboard::None, "");
        let before = t.windows();
        t.crypt(&"A".repeat(1000));
        let after = t.windows();
        // windows are read from the reflector side, the stators are last
        assert_eq!(before[3..], after[3..]);
        assert_ne!(before[..3], after[..3]);
    }

    #[test]
    fn reciprocal() {
        let plain = "HELLOWORLDTHISISATYPEX";
        for input in ["", "QWERTYUIOPASDFGHJKLZXCVBNM"] {
            let c = typex(Keyboard::None, input).crypt(plain);
            assert_ne!(c, plain);
            assert_eq!(typex(Keyboard::None, input).crypt(&c), plain);
        }
    }

    #[test]
    fn input_wiring() {
        assert!(InputWiring::new("ABC").is_err());
        let w = InputWiring::new("BCDEFGHIJKLMNOPQRSTUVWXYZA").unwrap();
        // keyboard B is wired to input A
        assert_eq!(w.transform(1), 0);
        assert_eq!(w.rev_transform(0), 1);
        let id = InputWiring::new("").unwrap();
        assert_eq!(id.transform(7), 7);
    }

    #[test]
    fn escaping() {
        assert_eq!(escape("HELLO WORLD"), "HELLOXWORLD");
        assert_eq!(escape("1945"), "ZQORTV");
        assert_eq!(escape("a 1, b"), "AXZQNXVB");
        // literal Z, X and V are typed as figures
        assert_eq!(escape("ZAX"), "ZDVAZGV");
        // a space keeps the keyboard in figures mode
        assert_eq!(escape("1 2"), "ZQXWV");
        // no key for these, passed through as typed
        assert_eq!(escape("HI!"), "HI!");
        assert_eq!(escape("1!2"), "ZQ!WV");
    }

    #[test]
    fn unescaping() {
        assert_eq!(unescape("HELLOXWORLD"), "HELLO WORLD");
        assert_eq!(unescape("ZQORTV"), "1945");
        assert_eq!(unescape("ZDVAZGV"), "ZAX");
        // J has no figure
        assert_eq!(unescape("ZJV"), "J");
        // X is a space in figures mode too
        assert_eq!(unescape("ZQXW"), "1 2");
        assert_eq!(unescape("ZQXWV"), "1 2");
        assert_eq!(unescape("HI!"), "HI!");
    }

    #[test]
    fn keyboard_passes_unknown_characters() {
        let plain = "READY? 1 2 3!";
        let c = typex(Keyboard::Encrypt, "").crypt(plain);
        assert!(c.starts_with(|c: char| c.is_ascii_uppercase()));
        assert!(c.contains('?') && c.contains('!'));
        assert_eq!(typex(Keyboard::Decrypt, "").crypt(&c), plain);
    }

    #[test]
    fn keyboard_roundtrip() {
        let plain = "ATTACK AT 0600, GRID 12/34 (ZULU).";
        let c = typex(Keyboard::Encrypt, "").crypt(plain);
        assert!(c.chars().all(|c| c.is_ascii_uppercase()));
        assert_eq!(typex(Keyboard::Decrypt, "").crypt(&c), plain);
    }

    #[test]
    fn strict_output() {
        let c = typex(Keyboard::Encrypt, "").crypt_strict("two words");
        assert_eq!(c.len(), 9 + 1);
        assert_eq!(c.as_bytes()[5], b' ');
    }

    #[test]
    fn keyboard_mode_from_str() {
        assert_eq!(Keyboard::from_str("Encrypt").unwrap(), Keyboard::Encrypt);
        assert_eq!(Keyboard::Decrypt.to_string(), "decrypt");
        assert!(Keyboard::from_str("both").is_err());
    }
}
