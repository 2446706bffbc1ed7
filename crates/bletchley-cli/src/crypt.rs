use std::io::{read_to_string, stdin};

use anyhow::{Result, bail};
use bletchley::{
    Enigma, EnigmaSettings, IndexRotor, InputWiring, Keyboard, Reflector, Rotor, Sigaba, Typex,
    constants::BANK_SIZE,
    presets::{
        SIGABA_INDEX_ROTORS, SIGABA_ROTORS, TYPEX_REFLECTOR, resolve_reflector, resolve_rotor,
    },
    rotor::split_spec,
};
use clap::Args;
use log::{debug, info};

#[derive(Args, Debug)]
pub struct EnigmaArgs {
    /// Rotors left to right, as preset names (I to VIII, Beta, Gamma) or
    /// specifications "<wiring>[<steps]". Three rotors, or four for an M4.
    #[arg(short, long, num_args = 3..=4, required_unless_present = "key")]
    rotors: Vec<String>,
    /// Reflector preset name (B, C, "B Thin", "C Thin") or pairs.
    #[arg(short = 'f', long, default_value = "B")]
    reflector: String,
    /// Optional ring settings left to right, defaults to all A.
    #[arg(short = 'g', long)]
    rings: Option<String>,
    /// Optional start positions left to right, defaults to all A.
    #[arg(short, long)]
    positions: Option<String>,
    /// Plugboard pairs, e.g., "AB CD EF".
    #[arg(short = 'b', long, default_value = "")]
    plugboard: String,
    /// Key string from the keygen command, replaces all other settings.
    #[arg(
        short,
        long,
        conflicts_with_all = ["rotors", "reflector", "rings", "positions", "plugboard"]
    )]
    key: Option<String>,
    /// Flag, if set, only letters are processed and the output is grouped in
    /// blocks of five.
    #[arg(short, long, action)]
    strict: bool,
    /// Text to encrypt or decrypt, read from stdin if not given.
    text: Option<String>,
}

#[derive(Args, Debug)]
pub struct TypexArgs {
    /// Five rotors left to right, as preset names ("Example 1" to "Example
    /// 8") or specifications. The two rightmost rotors are the stators.
    #[arg(short, long, num_args = 5, required = true)]
    rotors: Vec<String>,
    /// Optional reflector pairs, defaults to the example reflector.
    #[arg(short = 'f', long)]
    reflector: Option<String>,
    /// Optional ring settings left to right, defaults to all A.
    #[arg(short = 'g', long)]
    rings: Option<String>,
    /// Optional start positions left to right, defaults to all A.
    #[arg(short, long)]
    positions: Option<String>,
    /// Positions (1 to 5, left to right) of rotors inserted back to front.
    #[arg(short = 'v', long, value_delimiter = ',')]
    reversed: Vec<usize>,
    /// Optional input wiring, 26 letters, defaults to the identity.
    #[arg(short, long, default_value = "")]
    input: String,
    /// Keyboard mode: none, encrypt (escape figures and spaces) or decrypt
    /// (unescape them).
    #[arg(short, long, default_value = "none")]
    keyboard: Keyboard,
    /// Flag, if set, only letters are output, grouped in blocks of five.
    #[arg(short, long, action)]
    strict: bool,
    /// Text to encrypt or decrypt, read from stdin if not given.
    text: Option<String>,
}

#[derive(Args, Debug)]
pub struct SigabaArgs {
    /// Five cipher rotors left to right, as wirings or indexes 0 to 9 of the
    /// example rotors. Defaults to example rotors 0 to 4.
    #[arg(short, long, num_args = 5)]
    cipher: Vec<String>,
    /// Five control rotors left to right, as wirings or indexes 0 to 9 of
    /// the example rotors. Defaults to example rotors 5 to 9.
    #[arg(short = 'n', long, num_args = 5)]
    control: Vec<String>,
    /// Five index rotor wirings left to right, each the ten digits. Defaults
    /// to the example index rotors.
    #[arg(short, long, num_args = 5)]
    index: Vec<String>,
    /// Positions (1 to 10, left to right over the cipher and then the
    /// control bank) of rotors inserted back to front.
    #[arg(short = 'v', long, value_delimiter = ',')]
    reversed: Vec<usize>,
    /// Optional cipher rotor positions left to right, defaults to all A.
    #[arg(long)]
    cipher_positions: Option<String>,
    /// Optional control rotor positions left to right, defaults to all A.
    #[arg(long)]
    control_positions: Option<String>,
    /// Optional index rotor positions left to right, defaults to all 0.
    #[arg(long)]
    index_positions: Option<String>,
    /// Flag, if set, decrypt rather than encrypt.
    #[arg(short, long, action)]
    decrypt: bool,
    /// Text to encrypt or decrypt, read from stdin if not given.
    text: Option<String>,
}

fn read_text(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => Ok(read_to_string(stdin())?.trim_end().to_string()),
    }
}

/// One letter per rotor, left to right, or `default` for every rotor.
fn per_rotor(arg: Option<&str>, n: usize, default: char, what: &str) -> Result<Vec<char>> {
    let Some(arg) = arg else {
        return Ok(vec![default; n]);
    };
    let chars: Vec<char> = arg.chars().collect();
    if chars.len() != n {
        bail!("expected {n} {what}, got {}", chars.len());
    }
    Ok(chars)
}

fn enigma_settings(args: &EnigmaArgs) -> Result<EnigmaSettings> {
    if let Some(key) = &args.key {
        return Ok(key.parse()?);
    }
    let n = args.rotors.len();
    let settings = EnigmaSettings {
        rotors: args
            .rotors
            .iter()
            .map(|r| resolve_rotor(r).to_string())
            .collect(),
        rings: per_rotor(args.rings.as_deref(), n, 'A', "ring settings")?
            .into_iter()
            .collect(),
        positions: per_rotor(args.positions.as_deref(), n, 'A', "positions")?
            .into_iter()
            .collect(),
        reflector: resolve_reflector(&args.reflector).to_string(),
        plugboard: args.plugboard.clone(),
    };
    settings.validate()?;
    Ok(settings)
}

pub fn enigma(args: EnigmaArgs) -> Result<()> {
    let settings = enigma_settings(&args)?;
    debug!("enigma settings:\n{settings}");
    let mut machine = Enigma::from_settings(&settings)?;

    let text = read_text(args.text)?;
    let output = if args.strict {
        machine.crypt_strict(&text)
    } else {
        machine.crypt(&text)
    };
    println!("{output}");
    info!("windows now {}", machine.windows());
    Ok(())
}

pub fn typex(args: TypexArgs) -> Result<()> {
    if let Some(&p) = args.reversed.iter().find(|&&p| p == 0 || p > BANK_SIZE) {
        bail!("reversed rotor position {p} is outside 1 to {BANK_SIZE}");
    }
    let rings = per_rotor(args.rings.as_deref(), BANK_SIZE, 'A', "ring settings")?;
    let positions = per_rotor(args.positions.as_deref(), BANK_SIZE, 'A', "positions")?;

    // given left to right, the machine wants the entry side first
    let mut rotors = Vec::with_capacity(BANK_SIZE);
    for i in (0..BANK_SIZE).rev() {
        let (wiring, steps) = split_spec(resolve_rotor(&args.rotors[i]))?;
        let rotor = if args.reversed.contains(&(i + 1)) {
            Rotor::reversed(wiring, steps, rings[i], positions[i])?
        } else {
            Rotor::new(wiring, steps, rings[i], positions[i])?
        };
        rotors.push(rotor);
    }
    let reflector = Reflector::new(args.reflector.as_deref().unwrap_or(TYPEX_REFLECTOR))?;
    let mut machine = Typex::new(
        rotors,
        reflector,
        InputWiring::new(&args.input)?,
        args.keyboard,
    )?;
    debug!("typex with keyboard {}", machine.keyboard());

    let text = read_text(args.text)?;
    let output = if args.strict {
        machine.crypt_strict(&text)
    } else {
        machine.crypt(&text)
    };
    println!("{output}");
    info!("windows now {}", machine.windows());
    Ok(())
}

/// A SIGABA cipher or control rotor: an index into the example rotors or a
/// wiring.
fn sigaba_wiring(arg: &str) -> &str {
    match arg.parse::<usize>() {
        Ok(i) if i < SIGABA_ROTORS.len() => SIGABA_ROTORS[i],
        _ => arg,
    }
}

fn sigaba_bank(
    args: &[String],
    defaults: &[&str],
    positions: &[char],
    reversed: impl Fn(usize) -> bool,
) -> Result<Vec<Rotor>> {
    let wirings: Vec<&str> = if args.is_empty() {
        defaults.to_vec()
    } else {
        args.iter().map(|a| sigaba_wiring(a)).collect()
    };
    let mut bank = Vec::with_capacity(BANK_SIZE);
    for (i, (wiring, &pos)) in wirings.into_iter().zip(positions).enumerate() {
        bank.push(if reversed(i) {
            Rotor::reversed(wiring, "", 'A', pos)?
        } else {
            Rotor::new(wiring, "", 'A', pos)?
        });
    }
    Ok(bank)
}

pub fn sigaba(args: SigabaArgs) -> Result<()> {
    if let Some(&p) = args.reversed.iter().find(|&&p| p == 0 || p > 2 * BANK_SIZE) {
        bail!("reversed rotor position {p} is outside 1 to {}", 2 * BANK_SIZE);
    }
    let cipher_positions =
        per_rotor(args.cipher_positions.as_deref(), BANK_SIZE, 'A', "cipher positions")?;
    let control_positions =
        per_rotor(args.control_positions.as_deref(), BANK_SIZE, 'A', "control positions")?;
    let index_positions =
        per_rotor(args.index_positions.as_deref(), BANK_SIZE, '0', "index positions")?;

    let cipher = sigaba_bank(
        &args.cipher,
        &SIGABA_ROTORS[..BANK_SIZE],
        &cipher_positions,
        |i| args.reversed.contains(&(i + 1)),
    )?;
    let control = sigaba_bank(
        &args.control,
        &SIGABA_ROTORS[BANK_SIZE..],
        &control_positions,
        |i| args.reversed.contains(&(i + 1 + BANK_SIZE)),
    )?;
    let index_wirings: Vec<&str> = if args.index.is_empty() {
        SIGABA_INDEX_ROTORS.to_vec()
    } else {
        args.index.iter().map(String::as_str).collect()
    };
    let index = index_wirings
        .into_iter()
        .zip(index_positions)
        .map(|(wiring, pos)| IndexRotor::new(wiring, pos))
        .collect::<Result<Vec<_>, _>>()?;
    let mut machine = Sigaba::new(cipher, control, index)?;

    let text = read_text(args.text)?;
    let output = if args.decrypt {
        machine.decrypt(&text)
    } else {
        machine.encrypt(&text)
    };
    println!("{output}");
    let (cipher, control) = machine.windows();
    info!("windows now {cipher} {control}");
    Ok(())
}
