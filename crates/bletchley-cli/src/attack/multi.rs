use std::{
    fs::metadata,
    path::Path,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use anyhow::{Result, bail};
use bletchley::{BombeOptions, Error, MultiBombe, MultiResult, Observer};
use indicatif::ProgressBar;
use log::{info, warn};
use rayon::{
    ThreadPoolBuilder,
    iter::{IntoParallelRefIterator, ParallelIterator},
};
use serde::{Deserialize, Serialize};

use crate::{config::Config, get_progress_style, storage::save_results};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MultiConfig {
    /// rotors to choose the three stepping rotors from, as preset names or
    /// specifications
    pub rotors: Vec<String>,
    /// optional fourth rotors for an M4, each tried with every rotor order
    pub fourth: Option<Vec<String>>,
    /// reflectors, as preset names or pairs
    pub reflectors: Vec<String>,
    pub ciphertext: String,
    pub crib: String,
    /// position of the crib in the ciphertext in letters, default 0
    pub offset: Option<usize>,
    /// run the checking machine on every stop, default false
    pub check: Option<bool>,
    /// number of worker threads, default one per core
    pub threads: Option<usize>,
    /// stop after this many seconds, saving the configurations tested
    pub max_search_sec: Option<usize>,
}

/// Cancels a worker's Bombe run once the deadline has passed or another
/// worker has failed.
struct Deadline<'a> {
    cancel: &'a AtomicBool,
    deadline: Option<Instant>,
}

impl Observer for Deadline<'_> {
    fn progress(&mut self, _: usize, _: usize, _: f64) {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.cancel.store(true, Ordering::SeqCst);
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

pub fn multi(config: Config, output: &Path, threads: Option<usize>) -> Result<()> {
    let Some(cfg) = config.multi else {
        bail!("no multi configuration found in config file")
    };
    if metadata(output).is_ok() {
        bail!("output '{}' already exists", output.display());
    }
    let threads = match threads.or(cfg.threads).unwrap_or_else(num_cpus::get) {
        0 => bail!("threads must be at least 1"),
        n => n,
    };
    let max_search_time = cfg
        .max_search_sec
        .map(|secs| Duration::from_secs(secs as u64));
    if let Some(max) = max_search_time {
        if max.as_secs() == 0 {
            bail!("max search time must be at least 1 second");
        }
        info!("max search time {} seconds", max.as_secs());
    }

    let options = BombeOptions {
        check: cfg.check.unwrap_or(false),
        offset: cfg.offset.unwrap_or(0),
    };
    let fourth = cfg.fourth.clone().unwrap_or_default();
    let multi = MultiBombe::new(
        &cfg.rotors,
        &fourth,
        &cfg.reflectors,
        &cfg.ciphertext,
        &cfg.crib,
        options,
    )?;
    let total = multi.configurations().len();
    info!("running {total} configurations on {threads} threads...");

    let results = run_parallel(&multi, threads, max_search_time)?;

    // the first real error, if any, cancelled every other worker
    if let Some(e) = results.iter().find_map(|r| match r {
        Err(e) if !matches!(e, Error::Cancelled) => Some(e),
        _ => None,
    }) {
        bail!("error running bombe: {e}");
    }
    let done = results.iter().filter(|r| r.is_ok()).count();
    if done < total {
        warn!("max search time reached, tested {done}/{total} configurations");
    }

    let results: Vec<MultiResult> = results
        .into_iter()
        .filter_map(Result::ok)
        .filter(|r| !r.stops.is_empty())
        .collect();
    for r in results.iter() {
        info!(
            "{} with reflector {}: {} loops, {} stops",
            r.configuration.rotors.join(" "),
            r.configuration.reflector,
            r.loops,
            r.stops.len()
        );
    }
    info!(
        "done, {} of {done} configurations tested have stops, saving...",
        results.len()
    );

    let description = format!(
        "multi run of {done}/{total} configurations, crib {} at offset {}",
        cfg.crib, options.offset
    );
    save_results(&description, &results, output)
}

/// Run every configuration on a pool of `threads` workers, each reusing one
/// Bombe. Results are in configuration order.
fn run_parallel(
    multi: &MultiBombe,
    threads: usize,
    max_search_time: Option<Duration>,
) -> Result<Vec<Result<MultiResult, Error>>> {
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
    let cancel = AtomicBool::new(false);
    let stops = AtomicUsize::new(0);
    let bar = ProgressBar::new(multi.configurations().len() as u64);
    bar.set_style(get_progress_style());
    let deadline = max_search_time.map(|d| Instant::now() + d);

    let results = pool.install(|| {
        multi
            .configurations()
            .par_iter()
            .map_init(
                || None,
                |bombe, configuration| {
                    if cancel.load(Ordering::SeqCst) {
                        return Err(Error::Cancelled);
                    }
                    let mut observer = Deadline {
                        cancel: &cancel,
                        deadline,
                    };
                    let result = multi.run_one(bombe, configuration, &mut observer);
                    match &result {
                        Ok(r) => {
                            let found =
                                stops.fetch_add(r.stops.len(), Ordering::SeqCst) + r.stops.len();
                            bar.inc(1);
                            bar.set_message(format!("found {found} stops"));
                        }
                        Err(Error::Cancelled) => {}
                        Err(_) => cancel.store(true, Ordering::SeqCst),
                    }
                    result
                },
            )
            .collect()
    });

    bar.finish_and_clear();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rotors: &[&str]) -> MultiConfig {
        MultiConfig {
            rotors: rotors.iter().map(|s| s.to_string()).collect(),
            fourth: None,
            reflectors: vec!["B".to_string()],
            // AAAAA... at AAA with rotors I II III and reflector B
            ciphertext: "BDZGOWCXLTKSBTMCDLPBMUQOFXYHCXTG".to_string(),
            crib: "AAAAAAAAAA".to_string(),
            offset: None,
            check: None,
            threads: None,
            max_search_sec: None,
        }
    }

    #[test]
    fn test_run_parallel_keeps_configuration_order() {
        let cfg = config(&["I", "II", "III"]);
        let multi = MultiBombe::new(
            &cfg.rotors,
            &[],
            &cfg.reflectors,
            &cfg.ciphertext,
            &cfg.crib,
            BombeOptions::default(),
        )
        .unwrap();
        let parallel = run_parallel(&multi, 3, None).unwrap();
        assert_eq!(parallel.len(), 6);

        let parallel: Vec<MultiResult> = parallel
            .into_iter()
            .map(Result::unwrap)
            .filter(|r| !r.stops.is_empty())
            .collect();
        assert_eq!(parallel, multi.run().unwrap());
        assert!(parallel.iter().any(|r| {
            r.configuration.rotors == ["I", "II", "III"]
                && r.stops.iter().any(|s| s.position == "AAA")
        }));
    }

    #[test]
    fn test_multi_requires_section() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jsonl");
        let err = multi(Config { multi: None }, &output, None).unwrap_err();
        assert!(err.to_string().contains("no multi configuration"));

        let err = multi(
            Config {
                multi: Some(config(&["I", "II", "III"])),
            },
            &output,
            Some(0),
        )
        .unwrap_err();
        assert!(err.to_string().contains("threads"));
    }
}
