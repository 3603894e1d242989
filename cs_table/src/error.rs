use thiserror::Error;

pub type Result<T> = std::result::Result<T,CsTableError>;

#[derive(Error,Debug)]
pub enum CsTableError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("malformed cs table: {0}")]
    Parse(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
