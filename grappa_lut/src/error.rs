use std::io;
use std::path::PathBuf;
use thiserror::Error;
use cs_table::error::CsTableError;

#[derive(Error,Debug)]
pub enum BuildError {
    #[error(transparent)]
    Table(#[from] CsTableError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot read config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("cannot write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
    #[error("no lut found in {0:?}")]
    LutNotFound(PathBuf),
}
