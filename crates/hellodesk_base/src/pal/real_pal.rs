use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::{DeskError, DeskResult, error::ErrorKind};

use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatusCode,
};
use super::traits::Pal;

/* 📖 # Why tiny_http and plain threads instead of an async stack?

Every handler finishes in microseconds against in-memory state, so there is nothing to
await. tiny_http gives a blocking accept loop; each request gets its own thread and the
service is shared through an Arc. Shutdown is a flag the accept loop checks between
`recv_timeout` polls.

Two limits from HttpServerConfig bound the work per connection: bodies larger than
`max_body_bytes` get 413 without being buffered, and once `max_concurrent_requests`
threads are busy new requests get 503 from the accept thread.
*/

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Concrete PAL implementation using the real filesystem and real sockets.
///
/// File paths are resolved relative to a configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn file_exists(&self, path: &Path) -> DeskResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.is_file();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn read_file(&self, path: &Path) -> DeskResult<Box<dyn Read + 'static>> {
        let resolved = self.resolve_path(path);
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(DeskError::new(ErrorKind::FileError {
                path: resolved,
                source: e,
            }))
        })?;
        Ok(Box::new(file))
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DeskResult<HttpServerHandle> {
        let address = config.address();
        let server = tiny_http::Server::http(&address)
            .map_err(|e| crate::err!("Failed to bind HTTP server to {}: {}", address, e))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| crate::err!("HTTP server on {} has no IP address", address))?;

        let handle = HttpServerHandle::new(port);
        let shutdown = handle.shutdown_flag();
        let context = Arc::new(ServeContext {
            service: Arc::from(service),
            server_name: config.server_name,
            max_body_bytes: config.max_body_bytes,
            max_in_flight: config.max_concurrent_requests,
            in_flight: AtomicUsize::new(0),
        });

        thread::Builder::new()
            .name(format!("http-accept-{}", port))
            .spawn(move || accept_loop(server, context, shutdown))
            .map_err(|e| crate::err!("Failed to spawn HTTP accept thread: {}", e))?;

        info!(host = %config.host, port, "HTTP server listening");
        Ok(handle)
    }
}

/// State shared by the accept loop and every request thread.
struct ServeContext {
    service: Arc<dyn HttpService>,
    server_name: String,
    max_body_bytes: usize,
    max_in_flight: usize,
    in_flight: AtomicUsize,
}

/// Counts one request as in flight until dropped.
struct InFlight(Arc<ServeContext>);

impl InFlight {
    fn acquire(context: &Arc<ServeContext>) -> Option<Self> {
        let previous = context.in_flight.fetch_add(1, Ordering::SeqCst);
        if previous >= context.max_in_flight {
            context.in_flight.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(Self(context.clone()))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn accept_loop(server: tiny_http::Server, context: Arc<ServeContext>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(ACCEPT_POLL_INTERVAL) {
            Ok(Some(request)) => match InFlight::acquire(&context) {
                Some(slot) => {
                    thread::spawn(move || serve_request(&slot.0, request));
                }
                None => {
                    warn!(limit = context.max_in_flight, "too many requests in flight");
                    respond(
                        request,
                        detail_response(HttpStatusCode::ServiceUnavailable),
                        &context.server_name,
                    );
                }
            },
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "HTTP accept failed, stopping server");
                break;
            }
        }
    }
    info!("HTTP server stopped");
}

fn serve_request(context: &ServeContext, mut request: tiny_http::Request) {
    let method = request.method().as_str().to_string();
    let target = request.url().to_string();

    let response = match to_http_request(&mut request, context.max_body_bytes) {
        Ok(http_request) => match context.service.handle_request(http_request) {
            Ok(response) => response,
            Err(e) => {
                error!(method = %method, target = %target, error = ?e, "request handler failed");
                detail_response(HttpStatusCode::InternalServerError)
            }
        },
        Err(status) => detail_response(status),
    };

    debug!(
        method = %method,
        target = %target,
        status = response.status().as_u16(),
        "request served"
    );
    respond(request, response, &context.server_name);
}

fn respond(request: tiny_http::Request, response: HttpResponse, server_name: &str) {
    let (status, headers, body) = response.into_parts();
    let mut tiny_headers = Vec::new();
    for (key, value) in headers.iter() {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => tiny_headers.push(header),
            Err(()) => warn!(header = key, "dropping invalid response header"),
        }
    }
    if let Ok(header) = tiny_http::Header::from_bytes(&b"Server"[..], server_name.as_bytes()) {
        tiny_headers.push(header);
    }

    let bytes = body.into_bytes();
    let length = bytes.len();
    let tiny_response = tiny_http::Response::new(
        tiny_http::StatusCode(status.as_u16()),
        tiny_headers,
        std::io::Cursor::new(bytes),
        Some(length),
        None,
    );
    if let Err(e) = request.respond(tiny_response) {
        warn!(error = %e, "failed to write HTTP response");
    }
}

/// Converts a tiny_http request; the error is the status to answer with.
fn to_http_request(
    request: &mut tiny_http::Request,
    max_body_bytes: usize,
) -> Result<HttpRequest, HttpStatusCode> {
    let method =
        HttpMethod::parse(request.method().as_str()).ok_or(HttpStatusCode::MethodNotAllowed)?;

    let mut http_request = HttpRequest::new(method, request.url());
    for header in request.headers() {
        http_request = http_request.with_header(header.field.as_str().as_str(), header.value.as_str());
    }

    if request.body_length().is_some_and(|len| len > max_body_bytes) {
        return Err(HttpStatusCode::PayloadTooLarge);
    }
    let mut body = Vec::new();
    request
        .as_reader()
        .take(max_body_bytes as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| {
            warn!(error = %e, "failed to read request body");
            HttpStatusCode::BadRequest
        })?;
    if body.len() > max_body_bytes {
        return Err(HttpStatusCode::PayloadTooLarge);
    }

    Ok(http_request.with_body(body))
}

fn detail_response(status: HttpStatusCode) -> HttpResponse {
    HttpResponse::json(
        status,
        format!(r#"{{"detail":"{}"}}"#, status.reason_phrase()),
    )
}
