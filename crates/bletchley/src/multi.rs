//! Running the Bombe over many rotor orders and reflectors.

use std::time::{Duration, Instant};

use log::{debug, info};
use num_integer::binomial;
use serde::Serialize;

use crate::Error;
use crate::bombe::{Bombe, BombeOptions, Observer, Stop};
use crate::constants::ENIGMA_STEPPING_ROTORS;
use crate::letter::a2i_permissive;
use crate::menu::Menu;
use crate::presets::{resolve_reflector, resolve_rotor};

/// The orderings of three rotors.
const ORDERINGS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// The number of configurations for `rotors` stepping rotors to choose
/// from, `fourth` optional fourth rotors and `reflectors` reflectors.
pub fn count_configurations(rotors: usize, fourth: usize, reflectors: usize) -> usize {
    binomial(rotors, ENIGMA_STEPPING_ROTORS) * ORDERINGS.len() * fourth.max(1) * reflectors
}

/// One rotor order and reflector to test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    /// The rotors left to right as on a key sheet: the fourth rotor (if any)
    /// first and the fast rotor last. Each is a preset name or a rotor
    /// specification.
    pub rotors: Vec<String>,
    /// A preset name or reflector pairs.
    pub reflector: String,
}

impl Configuration {
    /// The rotor specifications, fast to slow, as the Bombe takes them.
    fn bombe_rotors(&self) -> Vec<&str> {
        self.rotors.iter().rev().map(|r| resolve_rotor(r)).collect()
    }
}

/// Every configuration in test order: by reflector, then by the
/// lexicographic combination of three rotors, then by ordering, then by
/// fourth rotor.
pub fn configurations(
    rotors: &[String],
    fourth: &[String],
    reflectors: &[String],
) -> Vec<Configuration> {
    let mut out = Vec::with_capacity(count_configurations(
        rotors.len(),
        fourth.len(),
        reflectors.len(),
    ));
    let n = rotors.len();
    for reflector in reflectors {
        for i in 0..n {
            for j in i + 1..n {
                for k in j + 1..n {
                    let choice = [i, j, k];
                    for ordering in ORDERINGS.iter() {
                        let three = ordering.iter().map(|&o| rotors[choice[o]].clone());
                        if fourth.is_empty() {
                            out.push(Configuration {
                                rotors: three.collect(),
                                reflector: reflector.clone(),
                            });
                            continue;
                        }
                        for f in fourth {
                            out.push(Configuration {
                                rotors: std::iter::once(f.clone()).chain(three.clone()).collect(),
                                reflector: reflector.clone(),
                            });
                        }
                    }
                }
            }
        }
    }
    out
}

/// The stops of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiResult {
    pub configuration: Configuration,
    pub loops: usize,
    pub stops: Vec<Stop>,
}

/// Progress of a multi-configuration run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiProgress {
    /// Configurations completed.
    pub done: usize,
    /// Configurations in total.
    pub total: usize,
    /// Stops found so far, over all configurations.
    pub stops: usize,
    /// Fraction of the whole run completed.
    pub fraction: f64,
    pub elapsed: Duration,
    /// Estimated time left, extrapolated from the elapsed time.
    pub remaining: Duration,
}

/// Receives progress reports from a [`MultiBombe`] run.
pub trait MultiObserver {
    fn progress(&mut self, progress: &MultiProgress);

    /// Polled whenever the Bombe polls its observer.
    fn cancelled(&self) -> bool {
        false
    }
}

impl<F> MultiObserver for F
where
    F: FnMut(&MultiProgress),
{
    fn progress(&mut self, progress: &MultiProgress) {
        self(progress)
    }
}

/// Translates the Bombe's per-configuration progress into progress of the
/// whole run.
struct Tracker<'a> {
    outer: &'a mut dyn MultiObserver,
    done: usize,
    total: usize,
    stops: usize,
    start: Instant,
}

impl Tracker<'_> {
    fn report(&mut self, fraction_of_current: f64, stops_in_current: usize) {
        let fraction = (self.done as f64 + fraction_of_current) / self.total as f64;
        let elapsed = self.start.elapsed();
        let remaining = if fraction > 0.0 {
            elapsed.mul_f64((1.0 - fraction) / fraction)
        } else {
            Duration::ZERO
        };
        self.outer.progress(&MultiProgress {
            done: self.done,
            total: self.total,
            stops: self.stops + stops_in_current,
            fraction,
            elapsed,
            remaining,
        });
    }
}

impl Observer for Tracker<'_> {
    fn progress(&mut self, _: usize, stops: usize, fraction: f64) {
        self.report(fraction, stops);
    }

    fn cancelled(&self) -> bool {
        self.outer.cancelled()
    }
}

/// A Bombe run over every configuration of a set of rotors, optional fourth
/// rotors and reflectors.
#[derive(Debug, Clone)]
pub struct MultiBombe {
    configurations: Vec<Configuration>,
    ciphertext: String,
    crib: String,
    options: BombeOptions,
}

impl MultiBombe {
    /// Create a new multi-configuration run.
    ///
    /// Rotors and reflectors are preset names or specifications. There must
    /// be at least three rotors and one reflector, and the crib must make a
    /// valid menu against the ciphertext.
    pub fn new(
        rotors: &[String],
        fourth: &[String],
        reflectors: &[String],
        ciphertext: &str,
        crib: &str,
        options: BombeOptions,
    ) -> Result<Self, Error> {
        if rotors.len() < ENIGMA_STEPPING_ROTORS {
            Err(Error::Machine(format!(
                "need at least {ENIGMA_STEPPING_ROTORS} rotors to choose from, got {}",
                rotors.len()
            )))?;
        }
        if reflectors.is_empty() {
            Err(Error::Machine("need at least one reflector".to_string()))?;
        }
        // fail on a bad crib before any configuration is tried
        let letters = |s: &str| s.chars().filter_map(a2i_permissive).collect::<Vec<u8>>();
        let ct: Vec<u8> = letters(ciphertext).into_iter().skip(options.offset).collect();
        Menu::new(&ct, &letters(crib))?;

        let configurations = configurations(rotors, fourth, reflectors);
        info!(
            "{} configurations of {} rotors, {} fourth rotors and {} reflectors",
            configurations.len(),
            rotors.len(),
            fourth.len(),
            reflectors.len()
        );
        Ok(MultiBombe {
            configurations,
            ciphertext: ciphertext.to_string(),
            crib: crib.to_string(),
            options,
        })
    }

    /// The configurations in test order.
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Run one configuration, creating the Bombe in `bombe` on first use and
    /// changing its rotors after that.
    pub fn run_one(
        &self,
        bombe: &mut Option<Bombe>,
        configuration: &Configuration,
        observer: &mut dyn Observer,
    ) -> Result<MultiResult, Error> {
        let rotors = configuration.bombe_rotors();
        let reflector = resolve_reflector(&configuration.reflector);
        let bombe = match bombe {
            Some(b) => {
                b.change_rotors(&rotors, reflector)?;
                b
            }
            None => bombe.insert(Bombe::new(
                &rotors,
                reflector,
                &self.ciphertext,
                &self.crib,
                self.options,
            )?),
        };
        debug!(
            "running {} with reflector {}",
            configuration.rotors.join(" "),
            configuration.reflector
        );
        let stops = bombe.run_with(observer)?;
        Ok(MultiResult {
            configuration: configuration.clone(),
            loops: bombe.loops(),
            stops,
        })
    }

    /// Run every configuration in order, returning the results of those with
    /// stops.
    pub fn run(&self) -> Result<Vec<MultiResult>, Error> {
        self.run_with(&mut |_: &MultiProgress| {})
    }

    /// Like [`MultiBombe::run`], reporting progress to `observer`.
    pub fn run_with(&self, observer: &mut dyn MultiObserver) -> Result<Vec<MultiResult>, Error> {
        let mut tracker = Tracker {
            outer: observer,
            done: 0,
            total: self.configurations.len(),
            stops: 0,
            start: Instant::now(),
        };
        let mut bombe = None;
        let mut results = Vec::new();
        for configuration in self.configurations.iter() {
            let result = self.run_one(&mut bombe, configuration, &mut tracker)?;
            tracker.done += 1;
            tracker.stops += result.stops.len();
            tracker.report(0.0, 0);
            if !result.stops.is_empty() {
                results.push(result);
            }
        }
        Ok(results)
    }
}
