//! The Turing-Welchman Bombe.
//!
//! A [`Bombe`] tests every start position of a set of Enigma rotors against
//! a crib. For each position the scramblers of the menu are wired between
//! the letters of their edges, one wire (the hypothesis) of the test
//! register is energised and the current is followed through scramblers and
//! the diagonal board. If every wire of the test register ends up live the
//! hypothesis contradicts itself along with every other stecker partner, and
//! the position is eliminated. Anything else is a stop.
//!
//! The Bombe assumes that only the fast rotor moves within the crib. Longer
//! cribs and cribs across a middle rotor turnover will miss the true
//! position.

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, trace, warn};
use serde::{Serialize, Serializer};

use crate::Error;
use crate::constants::{ALPHABET_SIZE, MIN_GOOD_LOOPS, PROGRESS_CARRY, TRIAL_DECRYPT_LEN};
use crate::letter::{a2i_permissive, letter};
use crate::menu::Menu;
use crate::pairs::{Plugboard, Reflector};
use crate::rotor::{Rotor, split_spec};
use crate::scrambler::{Scrambler, SharedScrambler};

const N: usize = ALPHABET_SIZE;

/// Receives progress reports from a running [`Bombe`].
pub trait Observer {
    /// Called every 26^2 positions with the menu's loop count, the number of
    /// stops found so far and the fraction of positions tested. Reports come
    /// on every carry into the third rotor and beyond, so a three rotor run
    /// reports 26 times and can be cancelled part way.
    fn progress(&mut self, loops: usize, stops: usize, fraction: f64);

    /// Polled after each progress report. Returning true ends the run with
    /// [`Error::Cancelled`].
    fn cancelled(&self) -> bool {
        false
    }
}

impl<F> Observer for F
where
    F: FnMut(usize, usize, f64),
{
    fn progress(&mut self, loops: usize, stops: usize, fraction: f64) {
        self(loops, stops, fraction)
    }
}

/// An observer that ignores all progress.
struct Silent;

impl Observer for Silent {
    fn progress(&mut self, _: usize, _: usize, _: f64) {}
}

/// Options for a Bombe run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BombeOptions {
    /// Run the checking machine on every stop with a deduced stecker pair,
    /// dropping stops it rejects and reporting every deduced pair.
    pub check: bool,
    /// The position of the crib in the ciphertext, in letters.
    pub offset: usize,
}

/// What a stop tells about the steckering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Steckering {
    /// Deduced stecker pairs, each ordered and the list sorted. A pair of a
    /// letter with itself means the letter is not steckered.
    Pairs(Vec<(u8, u8)>),
    /// Neither one nor all but one of the test register's wires were live,
    /// so no stecker partner could be deduced.
    Unknown { energised: usize },
}

impl fmt::Display for Steckering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Steckering::Pairs(pairs) => {
                for (i, &(a, b)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}{}", letter(a), letter(b))?;
                }
                Ok(())
            }
            Steckering::Unknown { energised } => write!(f, "?? ({energised} live)"),
        }
    }
}

impl Serialize for Steckering {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A rotor position the Bombe could not eliminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    /// The rotor start positions, slow to fast, as shown in the windows
    /// with all ring settings at A.
    pub position: String,
    /// The deduced steckering.
    pub steckering: Steckering,
    /// The start of the ciphertext decrypted at this position using only the
    /// deduced stecker pairs.
    pub decryption: String,
}

fn ordered(a: u8, b: u8) -> (u8, u8) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Parse rotor specifications as Bombe rotors: stepping positions are
/// ignored and every rotor starts at A.
fn bombe_rotors(rotors: &[&str]) -> Result<Vec<Rotor>, Error> {
    if rotors.len() != 3 && rotors.len() != 4 {
        Err(Error::Machine(format!(
            "a Bombe needs 3 or 4 rotors, got {}",
            rotors.len()
        )))?;
    }
    rotors
        .iter()
        .map(|spec| {
            let (wiring, _) = split_spec(spec)?;
            Rotor::new(wiring, "", 'A', 'A')
        })
        .collect()
}

/// A Bombe set up for one crib and one rotor order.
pub struct Bombe {
    ciphertext: Vec<u8>,
    menu: Menu,
    shared: SharedScrambler,
    scramblers: Vec<Scrambler>,
    // scramblers attached to each letter
    attached: [Vec<usize>; N],
    // the scrambler at crib offset zero, for trial decryptions
    indicator: Scrambler,
    wires: [[bool; N]; N],
    energised: usize,
    stack: Vec<(u8, u8)>,
    options: BombeOptions,
    observer: Option<Box<dyn Observer + Send>>,
}

impl Bombe {
    /// Create a new Bombe.
    ///
    /// The `rotors` are rotor specifications ordered fast to slow, three for
    /// an Enigma or four for an M4; stepping positions are ignored. The
    /// ciphertext and crib may contain anything, only their letters are
    /// used. The crib is placed `options.offset` letters into the
    /// ciphertext.
    pub fn new(
        rotors: &[&str],
        reflector: &str,
        ciphertext: &str,
        crib: &str,
        options: BombeOptions,
    ) -> Result<Self, Error> {
        let mut rotors = bombe_rotors(rotors)?;
        let reflector = Reflector::new(reflector)?;

        let ciphertext: Vec<u8> = ciphertext
            .chars()
            .filter_map(a2i_permissive)
            .skip(options.offset)
            .collect();
        let crib: Vec<u8> = crib.chars().filter_map(a2i_permissive).collect();
        let menu = Menu::new(&ciphertext, &crib)?;
        if menu.loops() < MIN_GOOD_LOOPS {
            warn!(
                "menu has only {} loop(s), expect many false stops",
                menu.loops()
            );
        }

        let fast = rotors.remove(0);
        let scramblers: Vec<Scrambler> = menu
            .edges()
            .iter()
            .map(|e| Scrambler::new(fast.clone(), e.offset, Some(e.ends)))
            .collect();
        let mut attached: [Vec<usize>; N] = std::array::from_fn(|_| Vec::new());
        for (i, e) in menu.edges().iter().enumerate() {
            attached[e.ends.0 as usize].push(i);
            attached[e.ends.1 as usize].push(i);
        }

        Ok(Bombe {
            ciphertext,
            menu,
            shared: SharedScrambler::new(rotors, reflector),
            scramblers,
            attached,
            indicator: Scrambler::new(fast, 0, None),
            wires: [[false; N]; N],
            energised: 0,
            stack: Vec::with_capacity(N * N),
            options,
            observer: None,
        })
    }

    /// Set the observer used by [`Bombe::run`].
    pub fn with_observer(mut self, observer: impl Observer + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Replace the rotors and reflector, keeping the menu. The Bombe is
    /// moved back to its start position.
    pub fn change_rotors(&mut self, rotors: &[&str], reflector: &str) -> Result<(), Error> {
        let mut rotors = bombe_rotors(rotors)?;
        let reflector = Reflector::new(reflector)?;
        let fast = rotors.remove(0);
        for s in self.scramblers.iter_mut() {
            s.change_rotor(fast.clone());
        }
        self.indicator.change_rotor(fast);
        self.shared.change_rotors(rotors, reflector);
        self.shared.reset();
        Ok(())
    }

    /// The menu.
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// The number of loops in the menu.
    pub fn loops(&self) -> usize {
        self.menu.loops()
    }

    /// The number of rotor positions a run tests.
    pub fn positions(&self) -> usize {
        N.pow(self.shared.len() as u32 + 1)
    }

    /// Test every rotor position, reporting progress to the observer set with
    /// [`Bombe::with_observer`], if any.
    pub fn run(&mut self) -> Result<Vec<Stop>, Error> {
        match self.observer.take() {
            Some(mut observer) => {
                let result = self.run_with(observer.as_mut());
                self.observer = Some(observer);
                result
            }
            None => self.run_with(&mut Silent),
        }
    }

    /// Test every rotor position, reporting progress to `observer`.
    ///
    /// Positions are tested in odometer order from all rotors at A, and the
    /// Bombe is back at the start when the run is done or cancelled.
    pub fn run_with(&mut self, observer: &mut dyn Observer) -> Result<Vec<Stop>, Error> {
        let n_rotors = self.shared.len() + 1;
        let n_checks = self.positions();
        let tr = self.menu.test_register();
        let hypothesis = self.menu.hypothesis();
        let mut stops = Vec::new();
        debug!(
            "testing {n_checks} positions, test register {} hypothesis {}",
            letter(tr),
            letter(hypothesis)
        );

        for i in 1..=n_checks {
            self.wires = [[false; N]; N];
            self.energised = 0;
            self.energise(tr, hypothesis);
            if self.energised < N {
                if let Some(stop) = self.stop()? {
                    trace!(
                        "stop at {}: {} {}",
                        stop.position, stop.steckering, stop.decryption
                    );
                    stops.push(stop);
                }
            }

            // the number of rotors moving, like an odometer
            let mut n = 1;
            for j in 1..n_rotors {
                if i % N.pow(j as u32) == 0 {
                    n += 1;
                } else {
                    break;
                }
            }
            if n > 1 {
                self.shared.step(n);
            }
            for s in self.scramblers.iter_mut() {
                s.step();
            }
            self.indicator.step();

            if n >= PROGRESS_CARRY {
                observer.progress(self.menu.loops(), stops.len(), i as f64 / n_checks as f64);
                if observer.cancelled() {
                    self.reset();
                    return Err(Error::Cancelled);
                }
            }
        }

        debug!("done, {} stops", stops.len());
        Ok(stops)
    }

    fn reset(&mut self) {
        for s in self.scramblers.iter_mut() {
            s.reset();
        }
        self.indicator.reset();
        self.shared.reset();
    }

    /// Energise wire `j` of letter `i` and everything connected to it.
    fn energise(&mut self, i: u8, j: u8) {
        let tr = self.menu.test_register();
        self.stack.clear();
        self.stack.push((i, j));

        while let Some((i, j)) = self.stack.pop() {
            if self.wires[i as usize][j as usize] {
                continue;
            }
            self.wires[i as usize][j as usize] = true;
            // diagonal board
            self.wires[j as usize][i as usize] = true;
            if i == tr || j == tr {
                self.energised += 1;
                if self.energised == N {
                    // contradiction, no point in going on
                    return;
                }
            }

            for &s in self.attached[i as usize].iter() {
                let s = &self.scramblers[s];
                let out = s.transform(&mut self.shared, j);
                self.stack.push((s.other_end(i), out));
            }
            if i == j {
                continue;
            }
            for &s in self.attached[j as usize].iter() {
                let s = &self.scramblers[s];
                let out = s.transform(&mut self.shared, i);
                self.stack.push((s.other_end(j), out));
            }
        }
    }

    /// Classify the current position as a stop, or `None` if the checking
    /// machine rejects it.
    fn stop(&mut self) -> Result<Option<Stop>, Error> {
        let tr = self.menu.test_register();
        let partner = match self.energised {
            1 => Some(self.menu.hypothesis()),
            25 => self.wires[tr as usize]
                .iter()
                .position(|&live| !live)
                .map(|j| j as u8),
            _ => None,
        };

        let steckering = match partner {
            Some(p) if self.options.check => match self.check(p) {
                Some(pairs) => Steckering::Pairs(pairs),
                None => return Ok(None),
            },
            Some(p) => Steckering::Pairs(vec![ordered(tr, p)]),
            None => Steckering::Unknown {
                energised: self.energised,
            },
        };
        let decryption = self.trial_decrypt(&steckering)?;
        Ok(Some(Stop {
            position: self.position(),
            steckering,
            decryption,
        }))
    }

    /// The checking machine: energise the deduced pair and read off every
    /// deduced stecker pair, or `None` if some letter is steckered to more
    /// than one other.
    fn check(&mut self, partner: u8) -> Option<Vec<(u8, u8)>> {
        let tr = self.menu.test_register();
        if partner != self.menu.hypothesis() {
            self.wires = [[false; N]; N];
            self.energised = 0;
            self.energise(tr, partner);
        }

        let mut pairs = BTreeSet::new();
        pairs.insert(ordered(tr, partner));
        for (i, row) in self.wires.iter().enumerate() {
            let mut live = row.iter().enumerate().filter(|(_, live)| **live);
            match (live.next(), live.next()) {
                (Some((j, _)), None) => {
                    pairs.insert(ordered(i as u8, j as u8));
                }
                (Some(_), Some(_)) => return None,
                _ => {}
            }
        }
        Some(pairs.into_iter().collect())
    }

    /// Decrypt the start of the ciphertext at the current position.
    fn trial_decrypt(&mut self, steckering: &Steckering) -> Result<String, Error> {
        let plugboard = match steckering {
            Steckering::Pairs(pairs) => Plugboard::from_pairs(pairs)?,
            Steckering::Unknown { .. } => Plugboard::default(),
        };
        let mut indicator = self.indicator.clone();
        let mut out = String::with_capacity(TRIAL_DECRYPT_LEN);
        for &c in self.ciphertext.iter().take(TRIAL_DECRYPT_LEN) {
            let t = indicator.transform(&mut self.shared, plugboard.transform(c));
            out.push(letter(plugboard.transform(t)));
            indicator.step();
        }
        Ok(out)
    }

    /// The rotor start positions, slow to fast, for the current state.
    fn position(&self) -> String {
        // the machine steps before encrypting the first letter
        let fast = (self.indicator.pos() + N as u8 - 1) % N as u8;
        std::iter::once(fast)
            .chain(self.shared.positions())
            .rev()
            .map(letter)
            .collect()
    }
}
