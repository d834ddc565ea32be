//! Composer side of the resolver endpoint

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::platform::endpoint;
use crate::{Error, Platform, ProfilePic, Result};

/// Asks the resolver for an avatar URL.
///
/// Implementations return [`Error::NotFound`] for any non-success answer;
/// other errors mean the call itself failed.
pub trait ProfileClient {
    fn retrieve(&self, platform: Platform, username: &str) -> Result<ProfilePic>;
}

/// Only the avatar field is required from the endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    profile_pic_url: String,
}

pub struct HttpProfileClient {
    client: Client,
    base_url: String,
}

impl HttpProfileClient {
    pub fn new(base_url: &str, user_agent: &str, timeout_ms: Option<u64>) -> Result<Self> {
        let client = crate::http_client(user_agent, timeout_ms, &HashMap::new())?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn request_url(&self, platform: Platform, username: &str) -> Result<url::Url> {
        let mut url = endpoint(&self.base_url, &["api", "retrieve-profile-pic"])?;
        url.query_pairs_mut()
            .append_pair("username", username)
            .append_pair("platform", platform.as_str());
        Ok(url)
    }
}

impl ProfileClient for HttpProfileClient {
    fn retrieve(&self, platform: Platform, username: &str) -> Result<ProfilePic> {
        let url = self.request_url(platform, username)?;
        log::debug!("resolver GET {}", url);
        let res = self.client.get(url).send()?;
        if !res.status().is_success() {
            return Err(Error::NotFound(format!(
                "resolver answered HTTP {}",
                res.status().as_u16()
            )));
        }
        let body = res.text()?;
        let payload: Payload = serde_json::from_str(&body)
            .map_err(|e| Error::UpstreamError(format!("unexpected resolver payload: {}", e)))?;
        Ok(ProfilePic {
            profile_pic_url: payload.profile_pic_url,
            platform,
            username: username.to_string(),
        })
    }
}
