use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::DeskResult;
use crate::error::{DeskError, ErrorKind};

use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/// Platform Abstraction Layer trait providing file reads and HTTP serving.
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &Path) -> DeskResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &Path) -> DeskResult<Box<dyn Read + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &Path) -> DeskResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).map_err(|e| {
            Box::new(DeskError::new(ErrorKind::FileError {
                path: path.to_path_buf(),
                source: e,
            }))
        })?;
        String::from_utf8(contents)
            .map_err(|_e| crate::err!("File is not valid UTF-8: {}", path.display()))
    }

    /// Start an HTTP server with the given service.
    ///
    /// The server listens immediately. Dropping the returned handle stops it.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DeskResult<HttpServerHandle>;
}

/// Handle to a PAL implementation, enabling shared ownership.
///
/// Internally wraps `Arc<dyn Pal>` for cheap cloning and thread-safe sharing.
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
