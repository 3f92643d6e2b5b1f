//! Remote loader trait and implementations for fetching the flavor list.

pub mod file;
pub mod http;
pub mod mock;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use file::FileLoader;
pub use http::HttpLoader;

use crate::LoadError;
use crate::flavor::RawRecord;
use crate::payload::PayloadFormat;

/// Boxed future returned by [`RemoteLoader::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, LoadError>> + Send + 'a>>;

/// A source of raw flavor records.
pub trait RemoteLoader: Send + Sync {
    /// Short name for logs (e.g., "http", "file").
    fn name(&self) -> &str;

    /// Fetch and decode the record list at `source`.
    fn fetch<'a>(&'a self, source: &'a str) -> FetchFuture<'a>;
}

/// Settings shared by the loaders.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Forced payload format; `Auto` lets the loader pick from headers or
    /// file extension, then sniff the body.
    pub format: PayloadFormat,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("scoop/", env!("CARGO_PKG_VERSION")).to_string(),
            format: PayloadFormat::Auto,
        }
    }
}

/// Whether `source` should be fetched over HTTP rather than from disk.
pub fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
