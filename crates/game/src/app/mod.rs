use std::path::PathBuf;

use hop_engine::ConfigError;
use thiserror::Error;

use self::console::CommandParseError;

pub(crate) mod bootstrap;
pub(crate) mod console;
pub(crate) mod loop_runner;
pub(crate) mod script;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin}:{line}: {source}")]
    ScriptLine {
        origin: String,
        line: usize,
        #[source]
        source: CommandParseError,
    },
}
