//! Browser capability checks supplied to the composer at construction
//!
//! Embedded in-app browsers break the capture/download path. The composer
//! does not sniff anything itself; it is handed a [`CapabilityCheck`] and
//! shows a [`Banner`] when one reports an in-app browser.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InAppBrowser {
    Instagram,
    Facebook,
}

pub trait CapabilityCheck {
    fn in_app_browser(&self) -> Option<InAppBrowser>;
}

/// Detection from a user-agent string
#[derive(Debug, Clone)]
pub struct UserAgent(pub String);

impl UserAgent {
    pub fn new(ua: impl Into<String>) -> Self {
        UserAgent(ua.into())
    }
}

impl CapabilityCheck for UserAgent {
    fn in_app_browser(&self) -> Option<InAppBrowser> {
        let ua = self.0.to_ascii_lowercase();
        if ua.contains("instagram") {
            Some(InAppBrowser::Instagram)
        } else if ua.contains("fban") || ua.contains("fbav") {
            Some(InAppBrowser::Facebook)
        } else {
            None
        }
    }
}

/// Fixed capabilities, for hosts that already know what they are
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub in_app_browser: Option<InAppBrowser>,
}

impl CapabilityCheck for Capabilities {
    fn in_app_browser(&self) -> Option<InAppBrowser> {
        self.in_app_browser
    }
}

/// Non-blocking warning shown above the composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: &'static str,
    pub message: &'static str,
}

impl Banner {
    pub fn unsupported_browser() -> Self {
        Banner {
            title: "Unsupported Browser Detected",
            message: "Please open on regular browsers like Chrome or Safari.",
        }
    }
}
