use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use parking_lot::Mutex;

use crate::DeskResult;
use crate::error::{DeskError, ErrorKind};

use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::Pal;

/// In-memory PAL implementation for testing.
///
/// Files live in a HashMap and "servers" are services registered by port;
/// `simulate_request` calls the registered service directly.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use hellodesk_base::{MockPal, Pal};
///
/// let mock = MockPal::new();
/// mock.add_file("hellodesk.toml", "title = \"demo\"");
/// let content = mock.read_file_to_string(Path::new("hellodesk.toml")).unwrap();
/// assert_eq!(content, "title = \"demo\"");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    http_servers: Arc<Mutex<HashMap<u16, Arc<dyn HttpService>>>>,
    next_port: Arc<AtomicU16>,
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPal {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
        }
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), content.into());
    }

    /// Simulate an HTTP request to a registered server.
    ///
    /// Fails if no server is registered on `port`.
    pub fn simulate_request(&self, port: u16, request: HttpRequest) -> DeskResult<HttpResponse> {
        let service = self
            .http_servers
            .lock()
            .get(&port)
            .cloned()
            .ok_or_else(|| crate::err!("No HTTP server registered on port {}", port))?;

        service.handle_request(request)
    }

    pub fn http_server_count(&self) -> usize {
        self.http_servers.lock().len()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &Path) -> DeskResult<bool> {
        Ok(self.files.lock().contains_key(path))
    }

    fn read_file(&self, path: &Path) -> DeskResult<Box<dyn Read + 'static>> {
        let files = self.files.lock();
        let content = files.get(path).cloned().ok_or_else(|| {
            Box::new(DeskError::new(ErrorKind::FileError {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            }))
        })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DeskResult<HttpServerHandle> {
        let port = match config.port {
            Some(p) => p,
            None => self.next_port.fetch_add(1, Ordering::SeqCst),
        };
        self.http_servers.lock().insert(port, Arc::from(service));
        Ok(HttpServerHandle::new(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::PalHandle;
    use crate::pal::http::{HttpMethod, HttpStatusCode};

    #[derive(Debug)]
    struct EchoService;

    impl HttpService for EchoService {
        fn handle_request(&self, request: HttpRequest) -> DeskResult<HttpResponse> {
            match request.path() {
                "/echo" => Ok(HttpResponse::text(
                    request.body().as_string().unwrap_or_default(),
                )),
                _ => Ok(HttpResponse::not_found()),
            }
        }
    }

    #[test]
    fn test_read_missing_file() {
        let pal = MockPal::new();
        assert!(!pal.file_exists(Path::new("missing.toml")).unwrap());
        let err = pal.read_file_to_string(Path::new("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_read_invalid_utf8() {
        let pal = MockPal::new();
        pal.add_file("bad.toml", vec![0xff, 0xfe]);
        let err = pal.read_file_to_string(Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_simulate_request() {
        let pal = MockPal::new();
        let config = HttpServerConfig::new("127.0.0.1").with_port(8080);
        let handle = pal.start_http_server(Box::new(EchoService), config).unwrap();
        assert_eq!(handle.port(), 8080);
        assert_eq!(pal.http_server_count(), 1);

        let request = HttpRequest::new(HttpMethod::Post, "/echo").with_body("hello");
        let response = pal.simulate_request(8080, request).unwrap();
        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert_eq!(response.body().as_string(), Some("hello".to_string()));

        let request = HttpRequest::new(HttpMethod::Get, "/nowhere");
        let response = pal.simulate_request(8080, request).unwrap();
        assert_eq!(response.status(), HttpStatusCode::NotFound);
    }

    #[test]
    fn test_auto_assigned_ports_are_distinct() {
        let pal = PalHandle::new(MockPal::new());
        let first = pal
            .start_http_server(Box::new(EchoService), HttpServerConfig::default())
            .unwrap();
        let second = pal
            .start_http_server(Box::new(EchoService), HttpServerConfig::default())
            .unwrap();
        assert_ne!(first.port(), second.port());
    }

    #[test]
    fn test_simulate_request_unknown_port() {
        let pal = MockPal::new();
        let request = HttpRequest::new(HttpMethod::Get, "/");
        assert!(pal.simulate_request(9999, request).is_err());
    }
}
