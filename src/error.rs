use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {

    #[error("couldn't read from file `{}`: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("couldn't write to file `{}`: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Group(#[from] group::GroupError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("couldn't parse config file `{}`: {source}", .path.display())]
    ConfigFile { path: PathBuf, source: toml::de::Error },

    #[error("{what} should contain {expected} floats, found {found}")]
    Shape { what: &'static str, expected: usize, found: usize },

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
