//! Profile resolver: platform + username → avatar URL
//!
//! The resolver validates and normalizes the request, dispatches to the
//! platform's [`AvatarLookup`](crate::AvatarLookup) and wraps the answer in a
//! [`ProfilePic`] payload. It keeps no state between calls apart from the
//! HTTP client.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, LookupRegistry, Platform, ResolverConfig, Result};

/// Normalized success payload of the resolver endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePic {
    pub profile_pic_url: String,
    pub platform: Platform,
    pub username: String,
}

pub struct ProfileResolver {
    client: Client,
    registry: LookupRegistry,
}

impl ProfileResolver {
    /// Resolver with the production lookups for every platform.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let registry = LookupRegistry::from_config(&config);
        Self::with_registry(config, registry)
    }

    /// Resolver over a caller-supplied set of lookups.
    pub fn with_registry(config: ResolverConfig, registry: LookupRegistry) -> Result<Self> {
        let client = crate::http_client(&config.user_agent, config.timeout_ms, &config.headers)?;
        Ok(Self { client, registry })
    }

    /// Resolve from raw request parameters, as they arrive over HTTP.
    pub fn resolve_raw(&self, platform: &str, username: &str) -> Result<ProfilePic> {
        let platform: Platform = platform.parse()?;
        self.resolve(platform, username)
    }

    pub fn resolve(&self, platform: Platform, username: &str) -> Result<ProfilePic> {
        let username = normalize_username(username)?;
        let lookup = self.registry.get(platform).ok_or_else(|| {
            Error::InvalidRequest(format!("platform {} is not supported", platform))
        })?;

        let profile_pic_url = lookup.lookup(&self.client, &username)?;
        log::info!("resolved {} avatar for {}", platform, username);

        Ok(ProfilePic {
            profile_pic_url,
            platform,
            username,
        })
    }
}

/// Trim whitespace and one leading `@`; reject anything that cannot be a
/// single path segment.
pub fn normalize_username(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix('@').unwrap_or(trimmed);
    if name.is_empty() {
        return Err(Error::InvalidRequest("username is required".into()));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
    {
        return Err(Error::InvalidRequest(format!("malformed username: {:?}", name)));
    }
    Ok(name.to_string())
}
