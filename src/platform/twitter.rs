//! X / Twitter: scrape the public profile page
//!
//! There is no unauthenticated API for profile images, so the avatar is read
//! from the page's `og:image` meta tag, falling back to the first
//! `profile_images` `<img>`.

use reqwest::blocking::Client;
use scraper::{Html, Selector};

use super::{endpoint, fetch_text, AvatarLookup, Platform};
use crate::{Error, Result};

pub struct TwitterLookup {
    web_base: String,
}

impl TwitterLookup {
    pub fn new(web_base: &str) -> Self {
        Self {
            web_base: web_base.to_string(),
        }
    }
}

/// Pull the avatar URL out of a profile page, if there is one.
pub fn extract_avatar(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let og_sel = Selector::parse(r#"meta[property="og:image"]"#).ok()?;
    let img_sel = Selector::parse(r#"img[src*="profile_images"]"#).ok()?;

    let og = document
        .select(&og_sel)
        .filter_map(|n| n.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty());
    let found = og.or_else(|| {
        document
            .select(&img_sel)
            .filter_map(|n| n.value().attr("src"))
            .map(str::trim)
            .find(|c| !c.is_empty())
    })?;

    Some(upscale(found))
}

/// The page links the 48px `_normal` variant; ask for the 400px one.
fn upscale(url: &str) -> String {
    url.replacen("_normal.", "_400x400.", 1)
}

impl AvatarLookup for TwitterLookup {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    fn lookup(&self, client: &Client, username: &str) -> Result<String> {
        let url = endpoint(&self.web_base, &[username])?;
        let (status, body) = fetch_text(client, url)?;
        match status {
            200 => {}
            404 => return Err(Error::NotFound(format!("no X account {}", username))),
            s => return Err(Error::UpstreamError(format!("X answered HTTP {}", s))),
        }

        extract_avatar(&body)
            .ok_or_else(|| Error::NotFound(format!("no avatar on the profile page of {}", username)))
    }
}
