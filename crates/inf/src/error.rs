use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid zoom level: {0}")]
    InvalidZoom(String),
    #[error("Tile zoom levels do not match ({first} <-> {second})")]
    MismatchedZoom { first: u8, second: u8 },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Geometry error: {0}")]
    Geometry(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::InvalidNumber(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::InvalidNumber(err.to_string())
    }
}
