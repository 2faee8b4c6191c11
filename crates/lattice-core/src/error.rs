use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LatticeError {
    /// A stimulus (or a value derived from it) is not usable.
    InvalidStimulus(String),
    /// A crisis override or pipeline setting is malformed.
    Configuration(String),
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeError::InvalidStimulus(msg) => write!(f, "invalid stimulus: {msg}"),
            LatticeError::Configuration(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for LatticeError {}

impl From<toml::de::Error> for LatticeError {
    fn from(e: toml::de::Error) -> Self {
        LatticeError::Configuration(e.to_string())
    }
}

impl From<toml::ser::Error> for LatticeError {
    fn from(e: toml::ser::Error) -> Self {
        LatticeError::Configuration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LatticeError>;
