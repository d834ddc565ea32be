//! Profile Frame
//!
//! Frame a profile picture with a themed circular border and export the result
//! as a PNG. The crate has two halves:
//!
//! - **Resolver**: maps a platform + username to a public avatar URL, served
//!   as `GET /api/retrieve-profile-pic` (see [`server`]).
//! - **Composer**: the client-side state machine (Empty / Loading /
//!   Populated) that owns the avatar reference, composes frame + avatar and
//!   exports `profile-pic-<suffix>.png` (see [`composer`]).
//!
//! # Example
//!
//! ```no_run
//! use profile_frame::{Platform, ProfileResolver, ResolverConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ProfileResolver::new(ResolverConfig::default())?;
//! let pic = resolver.resolve(Platform::Github, "octocat")?;
//! println!("avatar: {}", pic.profile_pic_url);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;

pub mod error;
pub use error::{Error, Result};

// Social platforms and their avatar lookups
pub mod platform;
pub use platform::{AvatarLookup, LookupRegistry, Platform};

pub mod resolver;
pub use resolver::{ProfilePic, ProfileResolver};

pub mod server;
pub use server::{ApiServer, ServerHandle};

// Injected browser capability checks (in-app browser detection)
pub mod environment;
pub use environment::{Banner, Capabilities, CapabilityCheck, InAppBrowser, UserAgent};

// Frame + avatar composition and PNG capture
pub mod rendering;

pub mod composer;
pub use composer::{
    Action, AvatarSource, Composer, ComposerState, Failure, FileSuffix, Host, HttpProfileClient,
    Outcome, ProfileClient, ScriptedHost, UploadedFile,
};

/// User agent sent with every outbound request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("profile-frame/", env!("CARGO_PKG_VERSION"));

/// Configuration for the profile resolver
///
/// The platform base URLs default to the public production endpoints; tests
/// point them at a local server.
///
/// # Examples
///
/// ```
/// let cfg = profile_frame::ResolverConfig::default();
/// assert!(cfg.timeout_ms.is_none());
/// assert_eq!(cfg.github_api, "https://api.github.com");
/// ```
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// User agent string to send with requests
    pub user_agent: String,
    /// Client-side timeout for lookups. `None` leaves it to the transport.
    pub timeout_ms: Option<u64>,
    /// Extra HTTP headers sent with every lookup
    pub headers: HashMap<String, String>,
    /// Base of the GitHub REST API
    pub github_api: String,
    /// Base of the GitLab instance
    pub gitlab_api: String,
    /// Base of the Bluesky public AppView
    pub bluesky_api: String,
    /// Base of the X / Twitter web profile pages
    pub twitter_web: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: None,
            headers: HashMap::new(),
            github_api: "https://api.github.com".to_string(),
            gitlab_api: "https://gitlab.com".to_string(),
            bluesky_api: "https://public.api.bsky.app".to_string(),
            twitter_web: "https://x.com".to_string(),
        }
    }
}

/// Configuration for the HTTP endpoint
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:8080`. Port 0 picks a free port.
    pub bind: String,
    /// Number of threads pulling requests off the listener
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            workers: num_cpus::get().max(1),
        }
    }
}

/// Square composition geometry
///
/// The frame fills the whole square; the avatar is centered and scaled down
/// so the frame shows as a ring around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    /// Edge length of the composition in pixels
    pub size: u32,
    /// Avatar edge length relative to `size`
    pub avatar_scale: f32,
}

impl FrameGeometry {
    pub fn avatar_size(&self) -> u32 {
        ((self.size as f32) * self.avatar_scale).round() as u32
    }

    /// Offset of the avatar from the top-left corner (same on both axes).
    pub fn avatar_inset(&self) -> u32 {
        self.size.saturating_sub(self.avatar_size()) / 2
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            size: 300,
            avatar_scale: 0.85,
        }
    }
}

/// Configuration for the composer
///
/// # Examples
///
/// ```
/// let cfg = profile_frame::ComposerConfig::default();
/// assert_eq!(cfg.geometry.size, 300);
/// assert_eq!(cfg.default_suffix, "kurdistan");
/// ```
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub geometry: FrameGeometry,
    /// Export suffix used when no avatar was ever set
    pub default_suffix: String,
    /// Frame image to use instead of the built-in themed frame
    pub frame_path: Option<PathBuf>,
    /// Append a cache-busting query parameter when fetching remote avatars
    pub cache_bust: bool,
    /// Upper bound on settle passes before a capture is given up
    pub max_settle_passes: usize,
    /// Origin serving `/api/retrieve-profile-pic`
    pub resolver_base_url: String,
    /// User agent for resolver and avatar requests
    pub user_agent: String,
    /// Client-side timeout for outbound requests. `None` leaves it to the
    /// transport.
    pub timeout_ms: Option<u64>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            geometry: FrameGeometry::default(),
            default_suffix: "kurdistan".to_string(),
            frame_path: None,
            cache_bust: true,
            max_settle_passes: 4,
            resolver_base_url: "http://127.0.0.1:8080".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: None,
        }
    }
}

/// Build the blocking client shared by lookups, the resolver client and the
/// asset loader.
pub(crate) fn http_client(
    user_agent: &str,
    timeout_ms: Option<u64>,
    headers: &HashMap<String, String>,
) -> Result<Client> {
    let mut default_headers = reqwest::header::HeaderMap::new();
    for (name, value) in headers {
        let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::ConfigError(format!("bad header name {:?}: {}", name, e)))?;
        let value = reqwest::header::HeaderValue::from_str(value)
            .map_err(|e| Error::ConfigError(format!("bad header value for {}: {}", name, e)))?;
        default_headers.insert(name, value);
    }

    Client::builder()
        .user_agent(user_agent)
        .default_headers(default_headers)
        .timeout(timeout_ms.map(Duration::from_millis))
        .build()
        .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let g = FrameGeometry::default();
        assert_eq!(g.size, 300);
        assert_eq!(g.avatar_size(), 255);
        assert_eq!(g.avatar_inset(), 22);
    }

    #[test]
    fn test_small_geometry_stays_centered() {
        let g = FrameGeometry {
            size: 40,
            avatar_scale: 0.5,
        };
        assert_eq!(g.avatar_size(), 20);
        assert_eq!(g.avatar_inset(), 10);
    }

    #[test]
    fn test_default_resolver_config_has_no_timeout() {
        let cfg = ResolverConfig::default();
        assert!(cfg.timeout_ms.is_none());
        assert!(cfg.user_agent.starts_with("profile-frame/"));
    }

    #[test]
    fn test_http_client_rejects_bad_header() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let err = http_client("ua", None, &headers).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
