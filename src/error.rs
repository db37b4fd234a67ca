//! Error types
//!
//! None of these reach the player: storage errors are logged and dropped,
//! session errors refuse an action and leave state untouched.

use thiserror::Error;

use crate::sim::GamePhase;

/// Failure reading or writing durable storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
}

/// A session action that was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No drawing surface was acquired, so nothing may run
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: GamePhase,
        action: &'static str,
    },
}

/// Failure acquiring browser resources at mount time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("no browser window")]
    NoWindow,
    #[error("canvas has no 2d context")]
    NoContext,
}
