//! Global constants for the machines and the Bombe.

/// The number of letters in the alphabet every machine works over.
pub const ALPHABET_SIZE: usize = 26;

/// The highest version of an encoded
/// [`EnigmaSettings`](crate::enigma::EnigmaSettings) key string supported.
pub const VERSION: u8 = 1;

/// The maximum size of a decompressed encoded key string in bytes. Set to
/// 64KB, far above any real key.
pub const MAX_DECOMPRESSED_SIZE: usize = 1 << 16;

/// The shortest crib the Bombe accepts.
pub const MIN_CRIB_LEN: usize = 2;

/// The longest crib the Bombe accepts. Longer cribs are guaranteed to span a
/// turnover of the middle rotor, which the Bombe does not model.
pub const MAX_CRIB_LEN: usize = 25;

/// The maximum length of the trial decryption reported with each stop.
pub const TRIAL_DECRYPT_LEN: usize = 26;

/// The Bombe notifies its observer (and polls for cancellation) whenever the
/// odometer carries into at least this many rotors, i.e., every 26^2
/// settings.
pub const PROGRESS_CARRY: usize = 3;

/// Menus with fewer loops than this are likely to produce many false stops.
pub const MIN_GOOD_LOOPS: usize = 2;

/// The number of Enigma rotors that take part in stepping.
pub const ENIGMA_STEPPING_ROTORS: usize = 3;

/// The number of rotors in each Typex cage and each SIGABA bank.
pub const BANK_SIZE: usize = 5;

/// The number of stationary rotors (stators) in a Typex, placed before the
/// stepping rotors.
pub const TYPEX_STATORS: usize = 2;
