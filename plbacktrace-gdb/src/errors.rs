//! セッションエラー

use thiserror::Error;

/// gdbセッションのエラー
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to spawn gdb '{gdb}': {source}")]
    Spawn {
        gdb: String,
        #[source]
        source: std::io::Error,
    },
    #[error("gdb {stream} pipe was not available")]
    MissingStdio { stream: &'static str },
    #[error("failed to write to gdb stdin: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to wait for gdb to exit: {0}")]
    Wait(#[source] std::io::Error),
}
