//! HTTP endpoint for the profile resolver
//!
//! Serves `GET /api/retrieve-profile-pic?username=<u>&platform=<p>` over
//! `tiny_http`. A fixed pool of worker threads pulls requests off the shared
//! listener; each request is routed through [`route`], which is pure apart
//! from the resolver's one outbound lookup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;

use serde_json::json;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::{Error, ProfileResolver, Result, ServerConfig};

/// Path of the resolver endpoint
pub const RETRIEVE_PATH: &str = "/api/retrieve-profile-pic";

/// Status and JSON body produced by [`route`]
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn from_error(err: &Error) -> Self {
        Self::error(err.status_code(), err.to_string())
    }
}

/// Route one request. `url` is the raw request target (path and query).
pub fn route(resolver: &ProfileResolver, method: &Method, url: &str) -> ApiResponse {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    if path != RETRIEVE_PATH {
        return ApiResponse::error(404, format!("no route for {}", path));
    }
    if *method != Method::Get {
        return ApiResponse::error(405, format!("method {} not allowed", method));
    }

    let mut username = None;
    let mut platform = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "username" => username = Some(value.into_owned()),
            "platform" => platform = Some(value.into_owned()),
            _ => {}
        }
    }

    let (Some(username), Some(platform)) = (username, platform) else {
        return ApiResponse::error(400, "both username and platform are required");
    };

    match resolver.resolve_raw(&platform, &username) {
        Ok(pic) => match serde_json::to_value(&pic) {
            Ok(body) => ApiResponse { status: 200, body },
            Err(e) => ApiResponse::error(500, e.to_string()),
        },
        Err(err) => {
            if err.is_malformed_request() {
                log::debug!("rejected request {}: {}", url, err);
            } else {
                log::warn!("lookup failed for {} on {}: {}", username, platform, err);
            }
            ApiResponse::from_error(&err)
        }
    }
}

fn respond(resolver: &ProfileResolver, request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let api = route(resolver, &method, &url);
    log::info!("{} {} -> {}", method, url, api.status);

    let mut response =
        Response::from_string(api.body.to_string()).with_status_code(api.status);
    if let Ok(header) = "Content-Type: application/json".parse::<Header>() {
        response = response.with_header(header);
    }
    if api.status == 405 {
        if let Ok(header) = "Allow: GET".parse::<Header>() {
            response = response.with_header(header);
        }
    }
    if let Err(e) = request.respond(response) {
        log::warn!("failed to write response for {}: {}", url, e);
    }
}

/// A bound, not yet running, resolver endpoint
pub struct ApiServer {
    server: Arc<Server>,
    resolver: Arc<ProfileResolver>,
    workers: usize,
}

impl ApiServer {
    pub fn bind(config: &ServerConfig, resolver: ProfileResolver) -> Result<Self> {
        if config.workers == 0 {
            return Err(Error::ConfigError("workers must be at least 1".into()));
        }
        let server = Server::http(config.bind.as_str())
            .map_err(|e| Error::ConfigError(format!("cannot bind {}: {}", config.bind, e)))?;
        Ok(Self {
            server: Arc::new(server),
            resolver: Arc::new(resolver),
            workers: config.workers,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Spawn the worker threads and return a handle to stop them.
    pub fn start(self) -> ServerHandle {
        log::info!(
            "serving {} on {} with {} workers",
            RETRIEVE_PATH,
            self.server.server_addr(),
            self.workers
        );
        let workers = (0..self.workers)
            .map(|_| {
                let server = Arc::clone(&self.server);
                let resolver = Arc::clone(&self.resolver);
                std::thread::spawn(move || {
                    for request in server.incoming_requests() {
                        respond(&resolver, request);
                    }
                })
            })
            .collect();

        ServerHandle {
            server: self.server,
            workers,
        }
    }
}

/// Handle to a running endpoint
pub struct ServerHandle {
    server: Arc<Server>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Base URL (`http://host:port`) clients should call.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.server.server_addr())
    }

    /// Unblock every worker and wait for them to finish.
    pub fn shutdown(self) {
        for _ in &self.workers {
            self.server.unblock();
        }
        for worker in self.workers {
            if worker.join().is_err() {
                log::warn!("server worker panicked");
            }
        }
        log::info!("server stopped");
    }
}
