//! Error types.
//!
//! Only wiring mistakes are errors. Events that do not apply to the current
//! state are dropped by the machine and never surface here.

use std::path::PathBuf;

/// Protocol violations raised by the state machine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FsmError {
    #[error("unknown fighter state `{0}`")]
    UnknownState(String),
}

/// Failures while loading bout configuration or scenario files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("move `{0}` is not in the move table")]
    UnknownMove(String),

    #[error("fighter index {0} out of range, a bout has two fighters")]
    UnknownFighter(usize),

    #[error(transparent)]
    Fsm(#[from] FsmError),
}
