//! Observable composer state, export suffix and per-state actions

use std::fmt;

use crate::rendering::AvatarSource;
use crate::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerState {
    /// No avatar; the placeholder is shown
    Empty,
    /// A resolver request is in flight
    Loading { platform: Platform },
    Populated { avatar: AvatarSource },
}

impl ComposerState {
    pub fn avatar(&self) -> Option<&AvatarSource> {
        match self {
            ComposerState::Populated { avatar } => Some(avatar),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ComposerState::Loading { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComposerState::Empty => "empty",
            ComposerState::Loading { .. } => "loading",
            ComposerState::Populated { .. } => "populated",
        }
    }

    /// Actions the page offers in this state.
    pub fn available_actions(&self) -> Vec<Action> {
        match self {
            ComposerState::Empty => std::iter::once(Action::Upload)
                .chain(Platform::ALL.into_iter().map(Action::UseProfilePic))
                .collect(),
            ComposerState::Loading { .. } => Vec::new(),
            ComposerState::Populated { .. } => vec![Action::Download, Action::StartOver],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    UseProfilePic(Platform),
    Download,
    StartOver,
}

/// Where the current avatar came from; names the exported file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSuffix {
    UserUpload,
    Platform(Platform),
}

impl FileSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileSuffix::UserUpload => "user-upload",
            FileSuffix::Platform(p) => p.as_str(),
        }
    }
}

impl fmt::Display for FileSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `profile-pic-<suffix>.png`
pub fn export_file_name(suffix: Option<FileSuffix>, default_suffix: &str) -> String {
    let suffix = suffix.map(|s| s.as_str()).unwrap_or(default_suffix);
    format!("profile-pic-{}.png", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_offers_upload_and_every_platform() {
        let actions = ComposerState::Empty.available_actions();
        assert_eq!(actions.len(), 1 + Platform::ALL.len());
        assert_eq!(actions[0], Action::Upload);
        assert!(actions.contains(&Action::UseProfilePic(Platform::Bluesky)));
    }

    #[test]
    fn loading_offers_nothing() {
        let state = ComposerState::Loading { platform: Platform::Github };
        assert!(state.available_actions().is_empty());
        assert!(state.avatar().is_none());
    }

    #[test]
    fn file_names() {
        assert_eq!(
            export_file_name(Some(FileSuffix::UserUpload), "kurdistan"),
            "profile-pic-user-upload.png"
        );
        assert_eq!(
            export_file_name(Some(FileSuffix::Platform(Platform::Github)), "kurdistan"),
            "profile-pic-github.png"
        );
        assert_eq!(export_file_name(None, "kurdistan"), "profile-pic-kurdistan.png");
    }
}
