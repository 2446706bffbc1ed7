use std::{fs::metadata, path::PathBuf};

use anyhow::{Result, bail};
use bletchley::{
    Bombe, BombeOptions, MultiResult,
    letter::i2a,
    multi::Configuration,
    presets::{resolve_reflector, resolve_rotor},
};
use clap::Args;
use indicatif::ProgressBar;
use log::info;

use crate::{get_progress_style, storage::save_results};

#[derive(Args, Debug)]
pub struct BombeArgs {
    /// Rotors left to right, as preset names or specifications. Three, or
    /// four for an M4. Stepping positions and ring settings do not matter.
    #[arg(short, long, num_args = 3..=4, required = true)]
    rotors: Vec<String>,
    /// Reflector preset name or pairs.
    #[arg(short = 'f', long, default_value = "B")]
    reflector: String,
    /// The ciphertext, anything but letters is ignored.
    #[arg(short, long)]
    ciphertext: String,
    /// The crib: plaintext guessed for the ciphertext at the offset.
    #[arg(short = 'p', long)]
    crib: String,
    /// The position of the crib in the ciphertext, in letters.
    #[arg(short = 'x', long, default_value_t = 0)]
    offset: usize,
    /// Flag, if set, run the checking machine on every stop.
    #[arg(short = 'k', long, action)]
    check: bool,
    /// Optional path to save the stops to as JSON lines.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn bombe(args: BombeArgs) -> Result<()> {
    if let Some(output) = &args.output {
        if metadata(output).is_ok() {
            bail!("output '{}' already exists", output.display());
        }
    }

    // the Bombe wants the fast rotor first
    let rotors: Vec<&str> = args.rotors.iter().rev().map(|r| resolve_rotor(r)).collect();
    let options = BombeOptions {
        check: args.check,
        offset: args.offset,
    };
    let mut bombe = Bombe::new(
        &rotors,
        resolve_reflector(&args.reflector),
        &args.ciphertext,
        &args.crib,
        options,
    )?;
    let menu = bombe.menu();
    info!(
        "menu of {} letters with {} loops, test register {}, testing {} positions...",
        menu.nodes(),
        menu.loops(),
        i2a(menu.test_register())?,
        bombe.positions()
    );

    let total = bombe.positions();
    let bar = ProgressBar::new(total as u64);
    bar.set_style(get_progress_style());
    let mut observer = |_: usize, stops: usize, fraction: f64| {
        bar.set_position((fraction * total as f64) as u64);
        bar.set_message(format!("{stops} stops"));
    };
    let stops = bombe.run_with(&mut observer)?;
    bar.finish_and_clear();

    for stop in stops.iter() {
        println!("{} {} {}", stop.position, stop.steckering, stop.decryption);
    }
    info!("done, {} stops", stops.len());

    if let Some(output) = args.output {
        let description = format!(
            "bombe run of {} with reflector {}, crib {} at offset {}",
            args.rotors.join(" "),
            args.reflector,
            args.crib,
            args.offset
        );
        let result = MultiResult {
            configuration: Configuration {
                rotors: args.rotors,
                reflector: args.reflector,
            },
            loops: bombe.loops(),
            stops,
        };
        save_results(&description, &[result], &output)?;
    }
    Ok(())
}
