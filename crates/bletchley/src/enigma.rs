//! The Enigma machine and its key settings.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::constants::{ENIGMA_STEPPING_ROTORS, MAX_DECOMPRESSED_SIZE, VERSION};
use crate::letter::{group5, letters_only};
use crate::machine::CipherMachine;
use crate::pairs::{Plugboard, Reflector};
use crate::rotor::Rotor;

/// An Enigma machine with three or four rotors.
///
/// The rotors are ordered from the entry (fast, rightmost) rotor to the
/// rotor next to the reflector. Only the first three rotors step; a fourth
/// rotor (the M4's Beta or Gamma) never does and may not have notches.
#[derive(Debug, Clone)]
pub struct Enigma {
    machine: CipherMachine<Plugboard>,
}

impl Enigma {
    /// Create a new Enigma. Returns an error on the wrong number of rotors or
    /// a stepping fourth rotor.
    pub fn new(
        rotors: Vec<Rotor>,
        reflector: Reflector,
        plugboard: Plugboard,
    ) -> Result<Self, Error> {
        if rotors.len() != 3 && rotors.len() != 4 {
            Err(Error::Machine(format!(
                "an Enigma must have 3 or 4 rotors, got {}",
                rotors.len()
            )))?;
        }
        if rotors[ENIGMA_STEPPING_ROTORS..].iter().any(Rotor::has_notches) {
            Err(Error::Machine(
                "the fourth Enigma rotor cannot have stepping positions".to_string(),
            ))?;
        }
        Ok(Enigma {
            machine: CipherMachine::new(rotors, reflector, plugboard, 0)?,
        })
    }

    /// Create a new Enigma from key settings.
    pub fn from_settings(settings: &EnigmaSettings) -> Result<Self, Error> {
        let n = settings.rotors.len();
        let rings: Vec<char> = settings.rings.chars().collect();
        let positions: Vec<char> = settings.positions.chars().collect();
        if rings.len() != n || positions.len() != n {
            Err(Error::Settings(format!(
                "expected {n} ring settings and positions, got {} and {}",
                rings.len(),
                positions.len()
            )))?;
        }

        // settings are read left to right, the machine wants the fast rotor
        // first
        let mut rotors = Vec::with_capacity(n);
        for i in (0..n).rev() {
            rotors.push(Rotor::from_spec(&settings.rotors[i], rings[i], positions[i])?);
        }

        Enigma::new(
            rotors,
            Reflector::new(&settings.reflector)?,
            Plugboard::new(&settings.plugboard)?,
        )
    }

    /// Step the rotors once.
    pub fn step(&mut self) {
        self.machine.step();
    }

    /// Encrypt or decrypt `input`. Non-letters pass through unchanged.
    pub fn crypt(&mut self, input: &str) -> String {
        self.machine.crypt(input)
    }

    /// Encrypt or decrypt only the letters of `input`, returning the result
    /// in blocks of five letters.
    pub fn crypt_strict(&mut self, input: &str) -> String {
        group5(&self.machine.crypt(&letters_only(input)))
    }

    /// The letters in the rotor windows, left to right.
    pub fn windows(&self) -> String {
        self.machine.windows()
    }

    /// The underlying rotor machine.
    pub fn machine(&self) -> &CipherMachine<Plugboard> {
        &self.machine
    }
}

/// A complete Enigma key: wheel order, ring settings, start positions,
/// reflector and plugboard.
///
/// Everything is given left to right as on a key sheet, so with four rotors
/// the first one is the non-stepping fourth rotor. A key can be encoded into
/// a compact string (see [`EnigmaSettings::serialize`]) and parsed back with
/// [`FromStr`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnigmaSettings {
    /// Rotor specifications `"<wiring>[<steps]"`, left to right.
    pub rotors: Vec<String>,
    /// One ring setting letter per rotor, left to right.
    pub rings: String,
    /// One start position letter per rotor, left to right.
    pub positions: String,
    /// Reflector pairs.
    pub reflector: String,
    /// Plugboard pairs, possibly empty.
    pub plugboard: String,
}

impl EnigmaSettings {
    /// Validate the settings by building a machine from them.
    pub fn validate(&self) -> Result<(), Error> {
        Enigma::from_settings(self).map(|_| ())
    }

    /// Encode the settings as a versioned, compressed, base64 string.
    pub fn serialize(&self) -> Result<String, Error> {
        let encoded = bincode::serialize(self).map_err(|e| Error::Settings(e.to_string()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&encoded)
            .map_err(|e| Error::Settings(e.to_string()))?;
        let compressed = encoder.finish().map_err(|e| Error::Settings(e.to_string()))?;

        Ok(format!("{VERSION:02}{}", STANDARD.encode(compressed)))
    }
}

impl FromStr for EnigmaSettings {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (Some(version), Some(payload)) = (s.get(..2), s.get(2..)) else {
            return Err(Error::Settings("key too short".to_string()));
        };
        match version.parse::<u8>() {
            Ok(VERSION) => {}
            Ok(v) => return Err(Error::Settings(format!("unsupported version: {v}"))),
            Err(_) => return Err(Error::Settings(format!("bad version {version:?}"))),
        }

        let compressed = STANDARD
            .decode(payload)
            .map_err(|e| Error::Settings(format!("failed to decode base64: {e}")))?;

        // bound the decompressed size, one extra byte to detect overflow
        let mut decoded = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .take(MAX_DECOMPRESSED_SIZE as u64 + 1)
            .read_to_end(&mut decoded)
            .map_err(|e| Error::Settings(format!("failed to decompress: {e}")))?;
        if decoded.len() > MAX_DECOMPRESSED_SIZE {
            return Err(Error::Settings("decompressed key too large".to_string()));
        }

        let settings: EnigmaSettings =
            bincode::deserialize(&decoded).map_err(|e| Error::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

impl fmt::Display for EnigmaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rotors:    {}", self.rotors.join(" "))?;
        writeln!(f, "rings:     {}", self.rings)?;
        writeln!(f, "positions: {}", self.positions)?;
        writeln!(f, "reflector: {}", self.reflector)?;
        write!(f, "plugboard: {}", self.plugboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{enigma_reflector, enigma_rotor};

    fn settings(rotors: &[&str], rings: &str, positions: &str, plugboard: &str) -> EnigmaSettings {
        EnigmaSettings {
            rotors: rotors
                .iter()
                .map(|r| enigma_rotor(r).unwrap().to_string())
                .collect(),
            rings: rings.to_string(),
            positions: positions.to_string(),
            reflector: enigma_reflector(if rotors.len() == 4 { "B Thin" } else { "B" })
                .unwrap()
                .to_string(),
            plugboard: plugboard.to_string(),
        }
    }

    #[test]
    fn rotor_count() {
        let r = |n| Rotor::from_spec(enigma_rotor(n).unwrap(), 'A', 'A').unwrap();
        let refl = Reflector::new(enigma_reflector("B").unwrap()).unwrap();
        assert!(Enigma::new(vec![r("I"), r("II")], refl.clone(), Plugboard::default()).is_err());
        assert!(
            Enigma::new(
                vec![r("I"), r("II"), r("III"), r("IV"), r("V")],
                refl.clone(),
                Plugboard::default()
            )
            .is_err()
        );
        // a stepping fourth rotor
        assert!(
            Enigma::new(
                vec![r("I"), r("II"), r("III"), r("IV")],
                refl.clone(),
                Plugboard::default()
            )
            .is_err()
        );
        assert!(
            Enigma::new(vec![r("I"), r("II"), r("III"), r("Beta")], refl, Plugboard::default())
                .is_ok()
        );
    }

    #[test]
    fn hello_is_deterministic_and_reciprocal() {
        let s = EnigmaSettings {
            rotors: vec![
                "BDFHJLCPRTXVZNYEIWGAKMUSQO<W".to_string(),
                "AJDKSIRUXBLHWTMCQGZNPYFVOE<F".to_string(),
                "EKMFLGDQVZNTOWYHXUSPAIBRCJ<R".to_string(),
            ],
            rings: "AAA".to_string(),
            positions: "AAA".to_string(),
            reflector: "AY BR CU DH EQ FS GL IP JX KN MO TZ VW".to_string(),
            plugboard: String::new(),
        };
        let c1 = Enigma::from_settings(&s).unwrap().crypt("HELLO");
        let c2 = Enigma::from_settings(&s).unwrap().crypt("HELLO");
        assert_eq!(c1, c2);
        assert_ne!(c1, "HELLO");
        assert_eq!(Enigma::from_settings(&s).unwrap().crypt(&c1), "HELLO");
    }

    #[test]
    fn known_ciphertext_from_settings() {
        let s = settings(&["I", "II", "III"], "AAA", "AAA", "");
        let mut e = Enigma::from_settings(&s).unwrap();
        assert_eq!(e.crypt("AAAAA"), "BDZGO");
        assert_eq!(e.windows(), "AAF");
    }

    #[test]
    fn reciprocal_with_rings_plugboard_and_fourth_rotor() {
        let s = settings(
            &["Gamma", "VIII", "IV", "I"],
            "CZEQ",
            "MXKB",
            "AV BS CG DL FU HZ IN KM OW RX",
        );
        let plain = "The quick brown fox jumps over the lazy dog, 1234 times!";
        let c = Enigma::from_settings(&s).unwrap().crypt(plain);
        assert_eq!(c.len(), plain.len());
        let p = Enigma::from_settings(&s).unwrap().crypt(&c);
        assert_eq!(p, plain.to_ascii_uppercase());
    }

    #[test]
    fn never_maps_a_letter_to_itself() {
        let s = settings(&["V", "II", "VI"], "QWE", "RTY", "AB CD EF");
        let mut e = Enigma::from_settings(&s).unwrap();
        let plain = "A".repeat(26 * 26 + 7);
        assert!(!e.crypt(&plain).contains('A'));
    }

    #[test]
    fn strict_output() {
        let s = settings(&["I", "II", "III"], "AAA", "AAA", "");
        let mut e = Enigma::from_settings(&s).unwrap();
        assert_eq!(e.crypt_strict("aa-aaa aaaa, a"), "BDZGO WCXLT K");
    }

    #[test]
    fn settings_validation() {
        let mut s = settings(&["I", "II", "III"], "AAA", "AAA", "");
        s.rings = "AA".to_string();
        assert!(s.validate().is_err());
        let mut s = settings(&["I", "II", "III"], "AAA", "AAA", "");
        s.plugboard = "AB AC".to_string();
        assert!(matches!(s.validate(), Err(Error::Plugboard(_))));
    }

    #[test]
    fn key_string_roundtrip() {
        let s = settings(&["II", "IV", "V"], "BUL", "BLA", "AV BS CG DL FU HZ IN KM OW RX");
        let key = s.serialize().unwrap();
        assert!(key.starts_with("01"));
        assert_eq!(EnigmaSettings::from_str(&key).unwrap(), s);

        assert!(EnigmaSettings::from_str("").is_err());
        assert!(EnigmaSettings::from_str("02eNpjYEAHjOgCAAA0AAI=").is_err());
        assert!(EnigmaSettings::from_str("01!!!!").is_err());
    }
}
