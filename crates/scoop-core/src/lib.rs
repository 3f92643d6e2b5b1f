//! Remote flavor list loading, record conversion and selection state.
//!
//! A [`SelectionController`] owns the current list of [`Flavor`]s and the
//! active selection. Loads go through a [`RemoteLoader`], raw records are
//! converted by [`factory::convert`], and every state change is republished
//! to a [`Listener`] (the presentation surface).

use thiserror::Error;

pub mod controller;
pub mod factory;
pub mod flavor;
pub mod loader;
pub mod payload;
pub mod render;

// Re-export for convenience
pub use controller::{
    FetchCompletion, LoadOutcome, LoadState, LoadTicket, Listener, PendingLoad,
    SelectionController,
};
pub use flavor::{Flavor, InvalidRecord, RawRecord, Rgb};
pub use loader::{FileLoader, HttpLoader, LoaderConfig, RemoteLoader};
pub use payload::{PayloadFormat, decode_records};
pub use render::{ScoopView, render};

/// Default location of the flavor list.
pub const DEFAULT_SOURCE_URL: &str = "https://www.raywenderlich.com/downloads/Flavors.plist";

/// Why a load produced no records.
///
/// Load errors never escape the controller: they are handed to
/// [`Listener::on_load_failed`] and the previous items are kept.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::Transport(e.to_string())
    }
}

/// Misuse of [`SelectionController::select`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("selection index {index} out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
}
