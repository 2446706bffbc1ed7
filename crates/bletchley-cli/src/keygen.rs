use std::{fmt, fs, fs::metadata, path::PathBuf};

use anyhow::{Result, bail};
use bletchley::{
    EnigmaSettings,
    constants::{ALPHABET_SIZE, ENIGMA_STEPPING_ROTORS},
    presets::{ENIGMA_FOURTH_ROTORS, ENIGMA_REFLECTORS, ENIGMA_ROTORS},
};
use log::info;
use rand::{Rng, seq::SliceRandom};
use rand_core::RngCore;
use rand_seeder::Seeder;
use rand_xoshiro::Xoshiro256StarStar;

const DEFAULT_PLUGS: usize = 10;
const MAX_PLUGS: usize = ALPHABET_SIZE / 2;

/// One line of a key sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub rotors: Vec<&'static str>,
    pub reflector: &'static str,
    pub settings: EnigmaSettings,
    pub key: String,
}

impl fmt::Display for SheetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<18} {} {} {:<6} {:<38} {}",
            self.rotors.join(" "),
            self.settings.rings,
            self.settings.positions,
            self.reflector,
            self.settings.plugboard,
            self.key
        )
    }
}

fn random_letters<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| (b'A' + rng.random_range(0..ALPHABET_SIZE as u8)) as char)
        .collect()
}

/// Draw a random Enigma key: three different stepping rotors (and a fourth
/// rotor with a thin reflector for an M4), ring settings, start positions
/// and `plugs` plugboard pairs.
pub fn random_key<R: Rng + ?Sized>(rng: &mut R, fourth: bool, plugs: usize) -> Result<SheetEntry> {
    if plugs > MAX_PLUGS {
        bail!("at most {MAX_PLUGS} plugboard pairs, got {plugs}");
    }

    let mut order: Vec<usize> = (0..ENIGMA_ROTORS.len()).collect();
    order.shuffle(rng);
    let mut rotors: Vec<&'static str> = order[..ENIGMA_STEPPING_ROTORS]
        .iter()
        .map(|&i| ENIGMA_ROTORS[i].0)
        .collect();
    let mut specs: Vec<String> = order[..ENIGMA_STEPPING_ROTORS]
        .iter()
        .map(|&i| ENIGMA_ROTORS[i].1.to_string())
        .collect();

    // thin reflectors come after the regular ones
    let reflector = if fourth {
        let (name, spec) = ENIGMA_FOURTH_ROTORS[rng.random_range(0..ENIGMA_FOURTH_ROTORS.len())];
        rotors.insert(0, name);
        specs.insert(0, spec.to_string());
        ENIGMA_REFLECTORS[rng.random_range(2..ENIGMA_REFLECTORS.len())]
    } else {
        ENIGMA_REFLECTORS[rng.random_range(0..2)]
    };

    let mut letters: Vec<char> = ('A'..='Z').collect();
    letters.shuffle(rng);
    let plugboard = letters[..2 * plugs]
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    let n = specs.len();
    let settings = EnigmaSettings {
        rotors: specs,
        rings: random_letters(rng, n),
        positions: random_letters(rng, n),
        reflector: reflector.1.to_string(),
        plugboard,
    };
    settings.validate()?;
    let key = settings.serialize()?;

    Ok(SheetEntry {
        rotors,
        reflector: reflector.0,
        settings,
        key,
    })
}

pub fn keygen(
    n: Option<usize>,
    fourth: bool,
    plugs: Option<usize>,
    seed: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let n = match n.unwrap_or(1) {
        0 => bail!("n must be at least 1"),
        n => n,
    };
    if let Some(output) = &output {
        if metadata(output).is_ok() {
            bail!("output '{}' already exists", output.display());
        }
    }
    // note that we need to Box here, since a key sheet from Xoshiro256StarStar
    // is only as secret as its seed
    let mut rng: Box<dyn RngCore> = match seed {
        Some(seed) => {
            info!("deterministic, using seed {seed}");
            Box::new(Seeder::from(seed).into_rng::<Xoshiro256StarStar>())
        }
        None => {
            info!("using system RNG");
            Box::new(rand::rng())
        }
    };

    let plugs = plugs.unwrap_or(DEFAULT_PLUGS);
    let mut sheet = Vec::with_capacity(n);
    for day in 1..=n {
        let entry = random_key(rng.as_mut(), fourth, plugs)?;
        sheet.push(format!("{day:02} {entry}"));
    }

    match output {
        Some(path) => {
            fs::write(&path, sheet.join("\n") + "\n")?;
            info!("saved {n} keys to {}", path.display());
        }
        None => {
            for line in sheet {
                println!("{line}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bletchley::Enigma;

    fn seeded(seed: &str) -> Xoshiro256StarStar {
        Seeder::from(seed).into_rng()
    }

    #[test]
    fn test_random_key_is_deterministic_with_seed() {
        let a: Vec<SheetEntry> = (0..5)
            .scan(seeded("42"), |rng, _| Some(random_key(rng, false, 10).unwrap()))
            .collect();
        let b: Vec<SheetEntry> = (0..5)
            .scan(seeded("42"), |rng, _| Some(random_key(rng, false, 10).unwrap()))
            .collect();
        assert_eq!(a, b);
        let c = random_key(&mut seeded("43"), false, 10).unwrap();
        assert_ne!(a[0], c);
    }

    #[test]
    fn test_random_key_shape() {
        let mut rng = seeded("shape");
        for _ in 0..50 {
            let entry = random_key(&mut rng, false, 10).unwrap();
            assert_eq!(entry.rotors.len(), 3);
            assert_ne!(entry.rotors[0], entry.rotors[1]);
            assert_ne!(entry.rotors[0], entry.rotors[2]);
            assert_ne!(entry.rotors[1], entry.rotors[2]);
            assert!(entry.reflector == "B" || entry.reflector == "C");
            assert_eq!(entry.settings.plugboard.split(' ').count(), 10);
            assert_eq!(entry.settings.rings.len(), 3);
            assert_eq!(entry.key.parse::<EnigmaSettings>().unwrap(), entry.settings);
        }
    }

    #[test]
    fn test_random_key_m4() {
        let mut rng = seeded("m4");
        for _ in 0..20 {
            let entry = random_key(&mut rng, true, 13).unwrap();
            assert_eq!(entry.rotors.len(), 4);
            assert!(entry.rotors[0] == "Beta" || entry.rotors[0] == "Gamma");
            assert!(entry.reflector.ends_with("Thin"));
            assert_eq!(entry.settings.positions.len(), 4);
            Enigma::from_settings(&entry.settings).unwrap();
        }
    }

    #[test]
    fn test_random_key_plugs() {
        let mut rng = seeded("plugs");
        assert_eq!(random_key(&mut rng, false, 0).unwrap().settings.plugboard, "");
        assert!(random_key(&mut rng, false, 14).is_err());
    }
}
