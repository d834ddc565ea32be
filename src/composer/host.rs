//! Browser facilities the composer calls out to

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::Result;

/// A single file picked for upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.mime.to_ascii_lowercase().starts_with("image/")
    }
}

/// Guess an image MIME type from a file name, the way a file picker labels
/// local files.
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

pub trait Host {
    /// Ask the user for a line of text. `None` when cancelled.
    fn prompt(&mut self, message: &str) -> Option<String>;

    /// Blocking notice.
    fn alert(&mut self, message: &str);

    /// Hand the exported image to the platform's file-save mechanism.
    fn save_file(&mut self, file_name: &str, data: &[u8]) -> Result<()>;
}

/// Non-interactive host: prompts are answered from a queue, alerts are
/// logged and kept, files are written into a directory.
#[derive(Debug)]
pub struct ScriptedHost {
    answers: VecDeque<String>,
    out_dir: PathBuf,
    alerts: Vec<String>,
    saved: Vec<PathBuf>,
}

impl ScriptedHost {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            answers: VecDeque::new(),
            out_dir: out_dir.into(),
            alerts: Vec::new(),
            saved: Vec::new(),
        }
    }

    pub fn answer(mut self, text: impl Into<String>) -> Self {
        self.answers.push_back(text.into());
        self
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl Host for ScriptedHost {
    fn prompt(&mut self, message: &str) -> Option<String> {
        let answer = self.answers.pop_front();
        log::debug!("prompt {:?} -> {:?}", message, answer);
        answer
    }

    fn alert(&mut self, message: &str) {
        log::warn!("{}", message);
        self.alerts.push(message.to_string());
    }

    fn save_file(&mut self, file_name: &str, data: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(file_name);
        std::fs::write(&path, data)?;
        log::info!("saved {} ({} bytes)", path.display(), data.len());
        self.saved.push(path);
        Ok(())
    }
}
