use bletchley::{Enigma, EnigmaSettings};
use std::str::FromStr;

fn main() {
    afl::fuzz!(|data: &[u8]| {
        if data.len() < 3 {
            return;
        }

        let s = String::from_utf8_lossy(data);
        let Ok(settings) = EnigmaSettings::from_str(&s) else {
            return;
        };
        // a parsed key is always valid
        let mut enigma = Enigma::from_settings(&settings).unwrap();
        enigma.crypt("FUZZ");
    });
}
