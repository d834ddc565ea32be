//! GitHub: public REST API user endpoint

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{endpoint, fetch_text, AvatarLookup, Platform};
use crate::{Error, Result};

#[derive(Deserialize)]
struct User {
    avatar_url: Option<String>,
}

pub struct GithubLookup {
    api_base: String,
}

impl GithubLookup {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
        }
    }
}

impl AvatarLookup for GithubLookup {
    fn platform(&self) -> Platform {
        Platform::Github
    }

    fn lookup(&self, client: &Client, username: &str) -> Result<String> {
        let url = endpoint(&self.api_base, &["users", username])?;
        let (status, body) = fetch_text(client, url)?;
        match status {
            200 => {}
            404 => return Err(Error::NotFound(format!("no GitHub user {}", username))),
            s => return Err(Error::UpstreamError(format!("GitHub answered HTTP {}", s))),
        }

        let user: User = serde_json::from_str(&body)
            .map_err(|e| Error::UpstreamError(format!("unexpected GitHub payload: {}", e)))?;
        user.avatar_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::NotFound(format!("GitHub user {} has no avatar", username)))
    }
}
