use std::path::Path;

use super::{FetchFuture, LoaderConfig, RemoteLoader};
use crate::LoadError;
use crate::payload::{PayloadFormat, decode_records};

/// Reads the flavor list from a local file. Accepts plain paths and
/// `file://` URLs.
pub struct FileLoader {
    format: PayloadFormat,
}

impl FileLoader {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            format: config.format,
        }
    }
}

impl RemoteLoader for FileLoader {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch<'a>(&'a self, source: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let path = Path::new(source.strip_prefix("file://").unwrap_or(source));
            let body = tokio::fs::read(path)
                .await
                .map_err(|e| LoadError::Transport(format!("{}: {e}", path.display())))?;

            let format = match self.format {
                PayloadFormat::Auto => path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(PayloadFormat::from_extension)
                    .unwrap_or_default(),
                forced => forced,
            };
            decode_records(&body, format)
        })
    }
}
