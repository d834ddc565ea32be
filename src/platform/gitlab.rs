//! GitLab: public users search by exact username

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{endpoint, fetch_text, AvatarLookup, Platform};
use crate::{Error, Result};

#[derive(Deserialize)]
struct User {
    avatar_url: Option<String>,
}

pub struct GitlabLookup {
    base: String,
}

impl GitlabLookup {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
        }
    }
}

impl AvatarLookup for GitlabLookup {
    fn platform(&self) -> Platform {
        Platform::Gitlab
    }

    fn lookup(&self, client: &Client, username: &str) -> Result<String> {
        let mut url = endpoint(&self.base, &["api", "v4", "users"])?;
        url.query_pairs_mut().append_pair("username", username);
        let (status, body) = fetch_text(client, url)?;
        if status != 200 {
            return Err(Error::UpstreamError(format!("GitLab answered HTTP {}", status)));
        }

        let users: Vec<User> = serde_json::from_str(&body)
            .map_err(|e| Error::UpstreamError(format!("unexpected GitLab payload: {}", e)))?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("no GitLab user {}", username)))?
            .avatar_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::NotFound(format!("GitLab user {} has no avatar", username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_once(body: &'static str) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                assert_eq!(request.url(), "/api/v4/users?username=jdoe");
                let _ = request.respond(tiny_http::Response::from_string(body));
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn gitlab_takes_first_match() {
        let base = serve_once(
            r#"[{"username":"jdoe","avatar_url":"https://gitlab.com/uploads/-/system/user/avatar/1/avatar.png"}]"#,
        );
        let url = GitlabLookup::new(&base).lookup(&Client::new(), "jdoe").unwrap();
        assert!(url.ends_with("/avatar.png"));
    }

    #[test]
    fn gitlab_empty_list_is_not_found() {
        let base = serve_once("[]");
        let err = GitlabLookup::new(&base)
            .lookup(&Client::new(), "jdoe")
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
