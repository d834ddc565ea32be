//! Bluesky: public AppView `app.bsky.actor.getProfile`

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{endpoint, fetch_text, AvatarLookup, Platform};
use crate::{Error, Result};

const DEFAULT_HANDLE_DOMAIN: &str = "bsky.social";

#[derive(Deserialize)]
struct Profile {
    avatar: Option<String>,
}

pub struct BlueskyLookup {
    api_base: String,
}

impl BlueskyLookup {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
        }
    }
}

/// Bare names like `alice` are shorthand for `alice.bsky.social`. DIDs and
/// custom-domain handles pass through.
pub fn qualify_handle(username: &str) -> String {
    if username.contains('.') || username.starts_with("did:") {
        username.to_string()
    } else {
        format!("{}.{}", username, DEFAULT_HANDLE_DOMAIN)
    }
}

impl AvatarLookup for BlueskyLookup {
    fn platform(&self) -> Platform {
        Platform::Bluesky
    }

    fn lookup(&self, client: &Client, username: &str) -> Result<String> {
        let handle = qualify_handle(username);
        let mut url = endpoint(&self.api_base, &["xrpc", "app.bsky.actor.getProfile"])?;
        url.query_pairs_mut().append_pair("actor", &handle);
        let (status, body) = fetch_text(client, url)?;
        match status {
            200 => {}
            // The AppView answers 400 InvalidRequest for unknown actors
            400 | 404 => return Err(Error::NotFound(format!("no Bluesky profile {}", handle))),
            s => return Err(Error::UpstreamError(format!("Bluesky answered HTTP {}", s))),
        }

        let profile: Profile = serde_json::from_str(&body)
            .map_err(|e| Error::UpstreamError(format!("unexpected Bluesky payload: {}", e)))?;
        profile
            .avatar
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::NotFound(format!("Bluesky profile {} has no avatar", handle)))
    }
}
