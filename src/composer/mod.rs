//! Composer UI state machine
//!
//! ```text
//!            upload                  start over
//!   Empty ───────────────▶ Populated ──────────▶ Empty
//!     │                        ▲
//!     │ use profile pic        │ resolver success
//!     ▼                        │
//!   Loading ───────────────────┘
//!     │ resolver failure (alert)
//!     ▼
//!   Empty
//! ```
//!
//! All browser facilities (prompt, alert, file save) go through [`Host`];
//! the resolver call goes through [`ProfileClient`]. Failures are handled
//! here, at the UI boundary: the user is alerted and the operation returns
//! an [`Outcome`] instead of an error.

pub mod client;
pub mod host;
pub mod state;

pub use crate::rendering::AvatarSource;
pub use client::{HttpProfileClient, ProfileClient};
pub use host::{Host, ScriptedHost, UploadedFile};
pub use state::{Action, ComposerState, FileSuffix};

use crate::environment::{Banner, CapabilityCheck, InAppBrowser};
use crate::rendering::{AssetLoader, Compositor, HttpAssetLoader, ImageRef, Scene};
use crate::{ComposerConfig, Error, Platform, Result};

pub const NOT_FOUND_ALERT: &str =
    "Error fetching your profile picture. Please make sure that you entered a correct username.";
pub const FETCH_FAILED_ALERT: &str = "Error fetching your profile picture.";
pub const EXPORT_FAILED_ALERT: &str = "Could not generate image. Try again in Chrome/Safari.";

type StateHandler = Box<dyn Fn(&ComposerState)>;

/// Why an operation did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Resolver answered with a non-success status
    NotFound,
    /// Resolver call failed in transport or returned garbage
    Resolution,
    /// Capture or save produced nothing
    Export,
}

/// What an operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State transitioned
    Applied,
    /// Invalid input; nothing happened and nobody was told
    Aborted,
    /// The user was alerted
    Failed(Failure),
    Exported { file_name: String },
}

pub struct Composer<H: Host> {
    config: ComposerConfig,
    host: H,
    client: Box<dyn ProfileClient>,
    compositor: Compositor,
    scene: Scene,
    state: ComposerState,
    suffix: Option<FileSuffix>,
    in_app_browser: Option<InAppBrowser>,
    on_state_change: Option<StateHandler>,
}

impl<H: Host> Composer<H> {
    /// Build a composer. The capability check runs once, here.
    pub fn new(
        config: ComposerConfig,
        capabilities: &dyn CapabilityCheck,
        client: Box<dyn ProfileClient>,
        loader: Box<dyn AssetLoader>,
        host: H,
    ) -> Self {
        let in_app_browser = capabilities.in_app_browser();
        if let Some(browser) = in_app_browser {
            log::warn!("running inside the {:?} in-app browser; export may fail", browser);
        }
        let frame = match &config.frame_path {
            Some(path) => ImageRef::File(path.clone()),
            None => ImageRef::ThemedFrame,
        };
        let compositor = Compositor::new(&config, loader);
        Self {
            config,
            host,
            client,
            compositor,
            scene: Scene::new(frame),
            state: ComposerState::Empty,
            suffix: None,
            in_app_browser,
            on_state_change: None,
        }
    }

    /// Composer talking to the resolver at `config.resolver_base_url` and
    /// fetching remote avatars over HTTP.
    pub fn with_http(
        config: ComposerConfig,
        capabilities: &dyn CapabilityCheck,
        host: H,
    ) -> Result<Self> {
        let client = HttpProfileClient::new(
            &config.resolver_base_url,
            &config.user_agent,
            config.timeout_ms,
        )?;
        let loader = HttpAssetLoader::new(&config.user_agent, config.timeout_ms)?;
        Ok(Self::new(config, capabilities, Box::new(client), Box::new(loader), host))
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn suffix(&self) -> Option<FileSuffix> {
        self.suffix
    }

    pub fn available_actions(&self) -> Vec<Action> {
        self.state.available_actions()
    }

    /// Warning to show when running in a known-incompatible browser.
    pub fn banner(&self) -> Option<Banner> {
        self.in_app_browser.map(|_| Banner::unsupported_browser())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Register a callback invoked after every state transition.
    pub fn on_state_change<F>(&mut self, cb: F)
    where
        F: Fn(&ComposerState) + 'static,
    {
        self.on_state_change = Some(Box::new(cb));
    }

    pub fn clear_on_state_change(&mut self) {
        self.on_state_change = None;
    }

    fn set_state(&mut self, state: ComposerState) {
        match &state {
            ComposerState::Empty => self.scene.set_avatar(None),
            ComposerState::Loading { .. } => self.scene.show_spinner(),
            ComposerState::Populated { avatar } => self.scene.set_avatar(Some(avatar)),
        }
        log::debug!("composer {} -> {}", self.state.name(), state.name());
        self.state = state;
        if let Some(cb) = &self.on_state_change {
            cb(&self.state);
        }
    }

    /// Use a local file as the avatar. Never passes through Loading.
    pub fn upload(&mut self, file: &UploadedFile) -> Outcome {
        if !file.is_image() {
            log::debug!("ignoring upload {} with type {:?}", file.name, file.mime);
            return Outcome::Aborted;
        }
        let avatar = AvatarSource::from_bytes(&file.mime, &file.bytes);
        self.suffix = Some(FileSuffix::UserUpload);
        self.set_state(ComposerState::Populated { avatar });
        Outcome::Applied
    }

    /// Prompt for a username and fetch that account's avatar.
    pub fn request_profile_pic(&mut self, platform: Platform) -> Outcome {
        let answer = self
            .host
            .prompt(&format!("Enter your {} username:", platform));
        // Only an empty or cancelled prompt aborts; anything else goes to the
        // resolver, which rejects blank names itself.
        let Some(username) = answer.filter(|a| !a.is_empty()) else {
            return Outcome::Aborted;
        };
        let username = username.trim().to_string();

        self.set_state(ComposerState::Loading { platform });
        match self.client.retrieve(platform, &username) {
            Ok(pic) => {
                self.suffix = Some(FileSuffix::Platform(platform));
                let avatar = AvatarSource::parse(&pic.profile_pic_url);
                self.set_state(ComposerState::Populated { avatar });
                Outcome::Applied
            }
            Err(err) => {
                let (message, failure) = match err {
                    Error::NotFound(_) => (NOT_FOUND_ALERT, Failure::NotFound),
                    _ => (FETCH_FAILED_ALERT, Failure::Resolution),
                };
                log::warn!("fetching {} avatar for {} failed: {}", platform, username, err);
                self.suffix = None;
                self.set_state(ComposerState::Empty);
                self.host.alert(message);
                Outcome::Failed(failure)
            }
        }
    }

    /// Name the export will be saved under.
    pub fn file_name(&self) -> String {
        state::export_file_name(self.suffix, &self.config.default_suffix)
    }

    /// Capture the composition and hand it to the host's file save.
    pub fn download(&mut self) -> Outcome {
        let file_name = self.file_name();
        let saved = self
            .compositor
            .render(&mut self.scene)
            .and_then(|capture| self.host.save_file(&file_name, &capture.png_data));
        match saved {
            Ok(()) => {
                log::info!("exported {}", file_name);
                Outcome::Exported { file_name }
            }
            Err(err) => {
                log::warn!("export of {} failed: {}", file_name, err);
                self.host.alert(EXPORT_FAILED_ALERT);
                Outcome::Failed(Failure::Export)
            }
        }
    }

    /// Back to Empty from any state.
    pub fn start_over(&mut self) -> Outcome {
        self.suffix = None;
        self.set_state(ComposerState::Empty);
        Outcome::Applied
    }
}
