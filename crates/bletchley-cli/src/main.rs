mod attack;
mod config;
mod crypt;
mod keygen;
mod storage;
use anyhow::Result;

use clap::{Parser, Subcommand};
use config::Config;
use env_logger::{Builder, Env, Target};
use indicatif::ProgressStyle;
use log::error;
use std::{path::PathBuf, process::exit};

#[derive(Parser)]
#[command(name = "bletchley")]
#[command(about = "A CLI tool for rotor cipher machines and the Turing-Welchman Bombe")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt or decrypt with an Enigma.
    Enigma(crypt::EnigmaArgs),
    /// Encrypt or decrypt with a Typex.
    Typex(crypt::TypexArgs),
    /// Encrypt or decrypt with a SIGABA.
    Sigaba(crypt::SigabaArgs),
    /// Run the Bombe for one rotor order and reflector.
    Bombe(attack::bombe::BombeArgs),
    /// Run the Bombe for every rotor order and reflector in a configuration,
    /// in parallel.
    Multi {
        /// Path to the configuration file.
        #[arg(short, long)]
        config: PathBuf,
        /// Path to the output file where stops will be saved.
        #[arg(short, long)]
        output: PathBuf,
        /// Optional number of worker threads, overrides config.
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Generate a sheet of random Enigma keys.
    Keygen {
        /// Optional number of keys to generate, defaults to 1.
        #[arg(short, long)]
        n: Option<usize>,
        /// Flag, if set, generate keys for a four rotor M4.
        #[arg(short, long, action)]
        fourth: bool,
        /// Optional number of plugboard pairs, defaults to 10.
        #[arg(short, long)]
        plugs: Option<usize>,
        /// Optional seed for deterministic keys. If no seed set, uses the
        /// system RNG.
        #[arg(short, long)]
        seed: Option<String>,
        /// Optional path to write the key sheet to instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(Target::Stdout);
    builder.init();

    if let Err(e) = do_main() {
        error!("error: {e}");
        exit(1);
    }
}

fn do_main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enigma(args) => crypt::enigma(args),
        Commands::Typex(args) => crypt::typex(args),
        Commands::Sigaba(args) => crypt::sigaba(args),
        Commands::Bombe(args) => attack::bombe::bombe(args),
        Commands::Multi {
            config,
            output,
            threads,
        } => attack::multi::multi(Config::from_file(&config)?, &output, threads),
        Commands::Keygen {
            n,
            fourth,
            plugs,
            seed,
            output,
        } => keygen::keygen(n, fourth, plugs, seed, output),
    }
}

fn get_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise:.green}] [{eta_precise:.cyan}] ({percent:.bold}%) [{bar:50.cyan/blue}] {pos}/{human_len} {msg:.magenta}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
}
