use std::fmt;

/// Specific error types for Bletchley.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid letter or alphabet index.
    Letter(String),

    /// Invalid rotor. The string describes why in detail.
    Rotor(String),

    /// Invalid reflector. The string describes why in detail.
    Reflector(String),

    /// Invalid plugboard. The string describes why in detail.
    Plugboard(String),

    /// Invalid machine, e.g., the wrong number of rotors for the model.
    Machine(String),

    /// Invalid crib or ciphertext for a Bombe run.
    Crib(String),

    /// Invalid or undecodable key settings.
    Settings(String),

    /// A Bombe run was cancelled by its observer.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Letter(ref msg) => write!(f, "invalid letter: {msg}"),
            Error::Rotor(ref msg) => write!(f, "invalid rotor: {msg}"),
            Error::Reflector(ref msg) => write!(f, "invalid reflector: {msg}"),
            Error::Plugboard(ref msg) => write!(f, "invalid plugboard: {msg}"),
            Error::Machine(ref msg) => write!(f, "invalid machine: {msg}"),
            Error::Crib(ref msg) => write!(f, "invalid crib: {msg}"),
            Error::Settings(ref msg) => write!(f, "invalid settings: {msg}"),
            Error::Cancelled => write!(f, "run cancelled"),
        }
    }
}

impl std::error::Error for Error {}
