//! Composer scenarios driven through fake host, resolver client and loader

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use profile_frame::composer::{EXPORT_FAILED_ALERT, FETCH_FAILED_ALERT, NOT_FOUND_ALERT};
use profile_frame::rendering::raster::encode_png;
use profile_frame::rendering::AssetLoader;
use profile_frame::{
    Action, AvatarSource, Capabilities, Composer, ComposerConfig, ComposerState, Error, Failure,
    FileSuffix, Host, InAppBrowser, Outcome, Platform, ProfileClient, ProfilePic, Result,
    UploadedFile, UserAgent,
};

const OCTOCAT_URL: &str = "https://avatars.githubusercontent.com/u/583231?v=4";

#[derive(Default)]
struct RecordingHost {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    alerts: Vec<String>,
    saved: Vec<(String, Vec<u8>)>,
    refuse_saves: bool,
}

impl RecordingHost {
    fn answering(answer: &str) -> Self {
        let mut host = Self::default();
        host.answers.push_back(answer.to_string());
        host
    }
}

impl Host for RecordingHost {
    fn prompt(&mut self, message: &str) -> Option<String> {
        self.prompts.push(message.to_string());
        self.answers.pop_front()
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn save_file(&mut self, file_name: &str, data: &[u8]) -> Result<()> {
        if self.refuse_saves {
            return Err(Error::ExportError("save dialog dismissed".into()));
        }
        self.saved.push((file_name.to_string(), data.to_vec()));
        Ok(())
    }
}

/// Resolver stand-in: knows `octocat` on every platform, `offline` fails in
/// transport, everyone else is unknown.
#[derive(Clone, Default)]
struct FakeResolver {
    calls: Rc<RefCell<Vec<(Platform, String)>>>,
}

impl ProfileClient for FakeResolver {
    fn retrieve(&self, platform: Platform, username: &str) -> Result<ProfilePic> {
        self.calls.borrow_mut().push((platform, username.to_string()));
        match username {
            "octocat" => Ok(ProfilePic {
                profile_pic_url: OCTOCAT_URL.to_string(),
                platform,
                username: username.to_string(),
            }),
            "offline" => Err(Error::NetworkError("connection refused".into())),
            _ => Err(Error::NotFound("resolver answered HTTP 404".into())),
        }
    }
}

/// Serves the same solid square for every URL.
#[derive(Clone)]
struct SolidLoader {
    color: Rgba<u8>,
    urls: Rc<RefCell<Vec<String>>>,
}

impl AssetLoader for SolidLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.urls.borrow_mut().push(url.to_string());
        encode_png(&RgbaImage::from_pixel(64, 64, self.color))
    }
}

const AVATAR_BLUE: Rgba<u8> = Rgba([30, 90, 200, 255]);

struct Fixture {
    composer: Composer<RecordingHost>,
    resolver: FakeResolver,
    loader: SolidLoader,
}

fn fixture_with(host: RecordingHost, capabilities: &dyn profile_frame::CapabilityCheck) -> Fixture {
    let resolver = FakeResolver::default();
    let loader = SolidLoader {
        color: AVATAR_BLUE,
        urls: Rc::new(RefCell::new(Vec::new())),
    };
    let composer = Composer::new(
        ComposerConfig::default(),
        capabilities,
        Box::new(resolver.clone()),
        Box::new(loader.clone()),
        host,
    );
    Fixture {
        composer,
        resolver,
        loader,
    }
}

fn fixture(host: RecordingHost) -> Fixture {
    fixture_with(host, &Capabilities::default())
}

fn png_upload(color: Rgba<u8>) -> UploadedFile {
    UploadedFile {
        name: "me.png".to_string(),
        mime: "image/png".to_string(),
        bytes: encode_png(&RgbaImage::from_pixel(40, 40, color)).unwrap(),
    }
}

fn track_states(composer: &mut Composer<RecordingHost>) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    composer.on_state_change(move |state| sink.borrow_mut().push(state.name().to_string()));
    seen
}

#[test]
fn test_github_lookup_populates_and_exports() {
    let mut fx = fixture(RecordingHost::answering("octocat"));
    let states = track_states(&mut fx.composer);

    assert_eq!(fx.composer.request_profile_pic(Platform::Github), Outcome::Applied);
    assert_eq!(
        fx.composer.host().prompts,
        ["Enter your github username:".to_string()]
    );
    assert_eq!(
        *fx.composer.state(),
        ComposerState::Populated {
            avatar: AvatarSource::Remote(OCTOCAT_URL.to_string())
        }
    );
    assert_eq!(*states.borrow(), ["loading", "populated"]);
    assert_eq!(
        fx.composer.suffix(),
        Some(FileSuffix::Platform(Platform::Github))
    );

    let outcome = fx.composer.download();
    assert_eq!(
        outcome,
        Outcome::Exported {
            file_name: "profile-pic-github.png".to_string()
        }
    );
    let host = fx.composer.host();
    assert_eq!(host.saved.len(), 1);
    assert_eq!(host.saved[0].0, "profile-pic-github.png");
    assert!(host.saved[0].1.starts_with(b"\x89PNG"));
    assert!(host.alerts.is_empty());

    // The avatar was fetched once, cache-busted
    let urls = fx.loader.urls.borrow();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with(OCTOCAT_URL));
    assert!(urls[0].contains("cacheBust="));
}

#[test]
fn test_unknown_user_alerts_and_returns_to_empty() {
    let mut fx = fixture(RecordingHost::answering("nobody-here"));
    let states = track_states(&mut fx.composer);

    assert_eq!(
        fx.composer.request_profile_pic(Platform::Gitlab),
        Outcome::Failed(Failure::NotFound)
    );
    assert_eq!(*fx.composer.state(), ComposerState::Empty);
    assert_eq!(*states.borrow(), ["loading", "empty"]);
    assert_eq!(fx.composer.host().alerts, [NOT_FOUND_ALERT.to_string()]);
    assert_eq!(fx.composer.suffix(), None);
    assert_eq!(fx.composer.file_name(), "profile-pic-kurdistan.png");
}

#[test]
fn test_transport_failure_uses_generic_alert() {
    let mut fx = fixture(RecordingHost::answering("offline"));

    assert_eq!(
        fx.composer.request_profile_pic(Platform::Bluesky),
        Outcome::Failed(Failure::Resolution)
    );
    assert_eq!(*fx.composer.state(), ComposerState::Empty);
    assert_eq!(fx.composer.host().alerts, [FETCH_FAILED_ALERT.to_string()]);
}

#[test]
fn test_failed_lookup_drops_previous_avatar() {
    let mut host = RecordingHost::answering("octocat");
    host.answers.push_back("nobody-here".to_string());
    let mut fx = fixture(host);

    fx.composer.request_profile_pic(Platform::Github);
    assert!(fx.composer.state().avatar().is_some());

    fx.composer.request_profile_pic(Platform::Twitter);
    assert_eq!(*fx.composer.state(), ComposerState::Empty);
    assert_eq!(fx.composer.suffix(), None);
}

#[test]
fn test_upload_skips_loading() {
    let mut fx = fixture(RecordingHost::default());
    let states = track_states(&mut fx.composer);

    assert_eq!(fx.composer.upload(&png_upload(AVATAR_BLUE)), Outcome::Applied);
    assert_eq!(*states.borrow(), ["populated"]);
    match fx.composer.state().avatar() {
        Some(AvatarSource::DataUri(uri)) => assert!(uri.starts_with("data:image/png;base64,")),
        other => panic!("expected a data URI, got {:?}", other),
    }
    assert_eq!(fx.composer.suffix(), Some(FileSuffix::UserUpload));
    assert_eq!(fx.composer.file_name(), "profile-pic-user-upload.png");
    assert!(fx.resolver.calls.borrow().is_empty());
    assert!(fx.loader.urls.borrow().is_empty());
}

#[test]
fn test_non_image_upload_is_ignored() {
    let mut fx = fixture(RecordingHost::default());
    let file = UploadedFile {
        name: "notes.txt".to_string(),
        mime: "text/plain".to_string(),
        bytes: b"hello".to_vec(),
    };

    assert_eq!(fx.composer.upload(&file), Outcome::Aborted);
    assert_eq!(*fx.composer.state(), ComposerState::Empty);
    assert!(fx.composer.host().alerts.is_empty());
}

#[test]
fn test_start_over_clears_everything() {
    let mut fx = fixture(RecordingHost::default());
    fx.composer.upload(&png_upload(AVATAR_BLUE));

    assert_eq!(fx.composer.start_over(), Outcome::Applied);
    assert_eq!(*fx.composer.state(), ComposerState::Empty);
    assert_eq!(fx.composer.suffix(), None);
    assert_eq!(fx.composer.file_name(), "profile-pic-kurdistan.png");
}

#[test]
fn test_download_without_avatar_uses_default_suffix() {
    let mut fx = fixture(RecordingHost::default());

    assert_eq!(
        fx.composer.download(),
        Outcome::Exported {
            file_name: "profile-pic-kurdistan.png".to_string()
        }
    );
    assert_eq!(fx.composer.host().saved.len(), 1);
}

#[test]
fn test_cancelled_or_empty_prompt_makes_no_request() {
    let mut fx = fixture(RecordingHost::answering(""));
    let states = track_states(&mut fx.composer);

    assert_eq!(fx.composer.request_profile_pic(Platform::Github), Outcome::Aborted);
    // queue exhausted: the prompt was cancelled
    assert_eq!(fx.composer.request_profile_pic(Platform::Github), Outcome::Aborted);

    assert!(fx.resolver.calls.borrow().is_empty());
    assert!(states.borrow().is_empty());
    assert!(fx.composer.host().alerts.is_empty());
    assert_eq!(*fx.composer.state(), ComposerState::Empty);
}

#[test]
fn test_whitespace_username_reaches_resolver_and_alerts() {
    let mut fx = fixture(RecordingHost::answering("   "));

    assert_eq!(
        fx.composer.request_profile_pic(Platform::Github),
        Outcome::Failed(Failure::NotFound)
    );
    assert_eq!(fx.resolver.calls.borrow().len(), 1);
    assert_eq!(fx.composer.host().alerts, [NOT_FOUND_ALERT.to_string()]);
    assert_eq!(*fx.composer.state(), ComposerState::Empty);
}

#[test]
fn test_username_is_trimmed_before_lookup() {
    let mut fx = fixture(RecordingHost::answering("  octocat \n"));

    assert_eq!(fx.composer.request_profile_pic(Platform::Twitter), Outcome::Applied);
    assert_eq!(
        *fx.resolver.calls.borrow(),
        [(Platform::Twitter, "octocat".to_string())]
    );
}

#[test]
fn test_export_failure_alerts() {
    let host = RecordingHost {
        refuse_saves: true,
        ..Default::default()
    };
    let mut fx = fixture(host);

    assert_eq!(fx.composer.download(), Outcome::Failed(Failure::Export));
    assert_eq!(fx.composer.host().alerts, [EXPORT_FAILED_ALERT.to_string()]);
}

#[test]
fn test_undecodable_upload_fails_export() {
    let mut fx = fixture(RecordingHost::default());
    let file = UploadedFile {
        name: "broken.png".to_string(),
        mime: "image/png".to_string(),
        bytes: b"definitely not a png".to_vec(),
    };

    assert_eq!(fx.composer.upload(&file), Outcome::Applied);
    assert_eq!(fx.composer.download(), Outcome::Failed(Failure::Export));
    assert_eq!(fx.composer.host().alerts, [EXPORT_FAILED_ALERT.to_string()]);
    assert!(fx.composer.host().saved.is_empty());
}

#[test]
fn test_in_app_browser_shows_banner() {
    let ua = UserAgent::new(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148 [FBAN/FBIOS;FBAV/440.0.0.0]",
    );
    let fx = fixture_with(RecordingHost::default(), &ua);
    let banner = fx.composer.banner().expect("banner");
    assert_eq!(banner.title, "Unsupported Browser Detected");

    let caps = Capabilities {
        in_app_browser: Some(InAppBrowser::Instagram),
    };
    assert!(fixture_with(RecordingHost::default(), &caps)
        .composer
        .banner()
        .is_some());

    assert!(fixture(RecordingHost::default()).composer.banner().is_none());
}

#[test]
fn test_available_actions_follow_state() {
    let mut fx = fixture(RecordingHost::default());

    let empty = fx.composer.available_actions();
    assert!(empty.contains(&Action::Upload));
    assert!(empty.contains(&Action::UseProfilePic(Platform::Github)));
    assert!(!empty.contains(&Action::StartOver));

    fx.composer.upload(&png_upload(AVATAR_BLUE));
    let populated = fx.composer.available_actions();
    assert!(populated.contains(&Action::Download));
    assert!(populated.contains(&Action::StartOver));
}

#[test]
fn test_last_write_wins() {
    let mut fx = fixture(RecordingHost::answering("octocat"));
    fx.composer.request_profile_pic(Platform::Github);
    fx.composer.upload(&png_upload(AVATAR_BLUE));

    assert!(matches!(
        fx.composer.state().avatar(),
        Some(AvatarSource::DataUri(_))
    ));
    assert_eq!(fx.composer.suffix(), Some(FileSuffix::UserUpload));
}

/// Fails the first `failures` fetches, then serves a solid square.
struct FlakyLoader {
    failures: Cell<usize>,
    fetches: Rc<Cell<usize>>,
}

impl AssetLoader for FlakyLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetches.set(self.fetches.get() + 1);
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(Error::NetworkError(format!("timed out fetching {}", url)));
        }
        encode_png(&RgbaImage::from_pixel(64, 64, AVATAR_BLUE))
    }
}

#[test]
fn test_download_again_refetches_failed_avatar() {
    let fetches = Rc::new(Cell::new(0));
    let loader = FlakyLoader {
        failures: Cell::new(1),
        fetches: Rc::clone(&fetches),
    };
    let mut composer = Composer::new(
        ComposerConfig::default(),
        &Capabilities::default(),
        Box::new(FakeResolver::default()),
        Box::new(loader),
        RecordingHost::answering("octocat"),
    );

    assert_eq!(composer.request_profile_pic(Platform::Github), Outcome::Applied);
    assert_eq!(composer.download(), Outcome::Failed(Failure::Export));
    assert_eq!(
        composer.download(),
        Outcome::Exported {
            file_name: "profile-pic-github.png".to_string()
        }
    );
    assert_eq!(fetches.get(), 2);
    assert_eq!(composer.host().alerts, [EXPORT_FAILED_ALERT.to_string()]);
    assert_eq!(composer.host().saved.len(), 1);
}

#[test]
fn test_single_settle_pass_is_enough_to_export() {
    let config = ComposerConfig {
        max_settle_passes: 1,
        ..Default::default()
    };
    let loader = SolidLoader {
        color: AVATAR_BLUE,
        urls: Rc::new(RefCell::new(Vec::new())),
    };
    let mut composer = Composer::new(
        config,
        &Capabilities::default(),
        Box::new(FakeResolver::default()),
        Box::new(loader),
        RecordingHost::default(),
    );

    assert_eq!(composer.upload(&png_upload(AVATAR_BLUE)), Outcome::Applied);
    assert_eq!(
        composer.download(),
        Outcome::Exported {
            file_name: "profile-pic-user-upload.png".to_string()
        }
    );
    assert!(composer.host().alerts.is_empty());
}
