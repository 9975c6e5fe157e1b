use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Delivery failures reported by a sink
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open serial port {port}")]
    Open {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },
    #[error("failed to write {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serial write failed")]
    Io(#[from] std::io::Error),
    #[error("write did not complete within {0:?}")]
    Timeout(std::time::Duration),
}

/// Destination for a finished packet.
///
/// `send` delivers the whole buffer or fails; there is no partial-write contract.
#[allow(async_fn_in_trait)]
pub trait TransportSink {
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Human readable destination, used in console output
    fn describe(&self) -> String;
}

/// Writes the packet to a file instead of a device
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TransportSink for FileSink {
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        fs::write(&self.path, bytes)
            .await
            .map_err(|source| TransportError::File {
                path: self.path.clone(),
                source,
            })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
