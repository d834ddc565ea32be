//! Social platforms and their avatar lookups
//!
//! Each platform exposes the same capability ("username → avatar URL")
//! through [`AvatarLookup`]. The resolver picks the implementation from a
//! [`LookupRegistry`] keyed by [`Platform`], so no handler branches on the
//! platform itself.

pub mod bluesky;
pub mod github;
pub mod gitlab;
pub mod twitter;

pub use bluesky::BlueskyLookup;
pub use github::GithubLookup;
pub use gitlab::GitlabLookup;
pub use twitter::TwitterLookup;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, ResolverConfig, Result};

/// The closed set of platforms an avatar can be fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Github,
    Gitlab,
    Bluesky,
}

impl Platform {
    /// All platforms in the order the composer offers them.
    pub const ALL: [Platform; 4] = [
        Platform::Twitter,
        Platform::Github,
        Platform::Gitlab,
        Platform::Bluesky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Github => "github",
            Platform::Gitlab => "gitlab",
            Platform::Bluesky => "bluesky",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "github" => Ok(Platform::Github),
            "gitlab" => Ok(Platform::Gitlab),
            "bluesky" => Ok(Platform::Bluesky),
            "" => Err(Error::InvalidRequest("platform is required".into())),
            other => Err(Error::InvalidRequest(format!("unknown platform: {}", other))),
        }
    }
}

/// Resolve a username to a public avatar URL on one platform.
///
/// Implementations receive an already-normalized username and the shared
/// HTTP client. They return [`Error::NotFound`] when the account (or its
/// avatar) does not exist and [`Error::UpstreamError`] when the platform
/// answers with something unusable.
pub trait AvatarLookup: Send + Sync {
    fn platform(&self) -> Platform;

    fn lookup(&self, client: &Client, username: &str) -> Result<String>;
}

/// Lookups indexed by platform
pub struct LookupRegistry {
    lookups: HashMap<Platform, Box<dyn AvatarLookup>>,
}

impl LookupRegistry {
    /// An empty registry; every platform is unsupported until registered.
    pub fn empty() -> Self {
        Self {
            lookups: HashMap::new(),
        }
    }

    /// The production lookups, pointed at the base URLs in `config`.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(GithubLookup::new(&config.github_api)));
        registry.register(Box::new(GitlabLookup::new(&config.gitlab_api)));
        registry.register(Box::new(BlueskyLookup::new(&config.bluesky_api)));
        registry.register(Box::new(TwitterLookup::new(&config.twitter_web)));
        registry
    }

    /// Register a lookup, replacing any previous one for the same platform.
    pub fn register(&mut self, lookup: Box<dyn AvatarLookup>) {
        self.lookups.insert(lookup.platform(), lookup);
    }

    pub fn get(&self, platform: Platform) -> Option<&dyn AvatarLookup> {
        self.lookups.get(&platform).map(|l| l.as_ref())
    }
}

/// Join a base URL with extra path segments, percent-encoding each segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<url::Url> {
    let mut url = url::Url::parse(base)
        .map_err(|e| Error::ConfigError(format!("bad base URL {:?}: {}", base, e)))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::ConfigError(format!("base URL cannot carry a path: {}", base)))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// GET a URL and return the status and body text.
pub(crate) fn fetch_text(client: &Client, url: url::Url) -> Result<(u16, String)> {
    log::debug!("lookup GET {}", url);
    let res = client.get(url).send()?;
    let status = res.status().as_u16();
    let body = res
        .text()
        .map_err(|e| Error::UpstreamError(format!("Failed to read response body: {}", e)))?;
    Ok((status, body))
}
