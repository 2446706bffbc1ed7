//! Bletchley simulates the electromechanical rotor cipher machines Enigma,
//! Typex and SIGABA, and implements the Turing-Welchman Bombe for recovering
//! Enigma rotor positions from a crib.
//!
//! The machines are built from a few permutation primitives: a [`Rotor`]
//! with a ring setting and stepping positions, a [`Reflector`] and a
//! [`Plugboard`]. Rotors are given as specification strings of the form
//! `"<wiring>[<steps]"`, e.g., `"EKMFLGDQVZNTOWYHXUSPAIBRCJ<R"` for Enigma
//! rotor I, and named wirings are available in [`presets`].
//!
//! For encryption start with [`Enigma`] (or [`EnigmaSettings`] for complete
//! keys), [`Typex`] or [`Sigaba`]. For cryptanalysis start with [`Bombe`],
//! or [`MultiBombe`] to try many rotor orders and reflectors.
//!
//! ## Example usage
//! ```
//! use bletchley::presets::{enigma_reflector, enigma_rotor};
//! use bletchley::{Bombe, BombeOptions, Enigma, Plugboard, Reflector, Rotor};
//!
//! // Rotors are ordered from the fast (rightmost) rotor to the slow one.
//! // This is I-II-III from left to right, all rings and windows at A.
//! let rotor = |name| Rotor::from_spec(enigma_rotor(name).unwrap(), 'A', 'A');
//! let mut enigma = Enigma::new(
//!     vec![rotor("III")?, rotor("II")?, rotor("I")?],
//!     Reflector::new(enigma_reflector("B").unwrap())?,
//!     Plugboard::new("")?,
//! )?;
//! assert_eq!(enigma.crypt("AAAAA"), "BDZGO");
//!
//! // A Bombe is given the same rotors and reflector (but not the ring
//! // settings, plugboard or positions) along with a ciphertext and a crib,
//! // and finds the positions that cannot be ruled out.
//! let mut bombe = Bombe::new(
//!     &[enigma_rotor("III").unwrap(), enigma_rotor("II").unwrap(), enigma_rotor("I").unwrap()],
//!     enigma_reflector("B").unwrap(),
//!     "BDZGOWCXLTKSBTMCDLPBMUQOFXYHCXTG",
//!     "AAAAAAAAAA",
//!     BombeOptions::default(),
//! )?;
//! let stops = bombe.run()?;
//! // the first letter was encrypted at AAB, so the machine was set to AAA
//! assert!(stops.iter().any(|s| s.position == "AAA"));
//! # Ok::<(), bletchley::Error>(())
//! ```
pub mod bombe;
pub mod constants;
pub mod enigma;
mod error;
pub mod letter;
pub mod machine;
pub mod menu;
pub mod multi;
pub mod pairs;
pub mod presets;
pub mod rotor;
pub mod scrambler;
pub mod sigaba;
pub mod typex;

pub use crate::bombe::{Bombe, BombeOptions, Observer, Steckering, Stop};
pub use crate::enigma::{Enigma, EnigmaSettings};
pub use crate::error::Error;
pub use crate::machine::CipherMachine;
pub use crate::multi::{MultiBombe, MultiObserver, MultiProgress, MultiResult};
pub use crate::pairs::{Plugboard, Reflector};
pub use crate::rotor::Rotor;
pub use crate::sigaba::{IndexRotor, Sigaba};
pub use crate::typex::{InputWiring, Keyboard, Typex};
