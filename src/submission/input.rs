//! Input selection at the data-entry boundary.
//!
//! The window keeps two independently editable fields, a URL text box and a
//! selected `.mp3` file. Neither clears the other. [`InputForm::selection`]
//! folds them into the tagged union the controller branches on:
//!
//! | file selected | URL non-empty | selection                |
//! |---------------|---------------|--------------------------|
//! | yes           | any           | `InputSelection::File`   |
//! | no            | yes           | `InputSelection::Url`    |
//! | no            | no            | `InputSelection::None`   |

use std::path::Path;

use thiserror::Error;

use crate::api::AudioFile;

// ---------------------------------------------------------------------------
// InputSelection
// ---------------------------------------------------------------------------

/// What a submission sends to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSelection {
    /// A web-video URL for `/api/transcribe`.
    Url(String),
    /// An audio file for `/api/upload`.
    File(AudioFile),
    /// Nothing usable was entered.
    None,
}

impl InputSelection {
    /// Apply the precedence rule: a file wins over a URL, and a URL only
    /// counts when it is non-empty.
    pub fn from_fields(url: &str, file: Option<&AudioFile>) -> Self {
        match file {
            Some(file) => InputSelection::File(file.clone()),
            None if !url.is_empty() => InputSelection::Url(url.to_string()),
            None => InputSelection::None,
        }
    }
}

// ---------------------------------------------------------------------------
// InputError
// ---------------------------------------------------------------------------

/// Problems selecting a file. Shown inline next to the file picker.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Only .mp3 files are supported: {0}")]
    NotMp3(String),

    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// `true` when `path` has an `.mp3` extension (case-insensitive).
pub fn is_mp3_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

// ---------------------------------------------------------------------------
// InputForm
// ---------------------------------------------------------------------------

/// The two form fields as the user left them.
#[derive(Debug, Clone, Default)]
pub struct InputForm {
    /// Contents of the URL text box.
    pub url: String,
    /// Currently selected audio file.
    pub file: Option<AudioFile>,
}

impl InputForm {
    pub fn selection(&self) -> InputSelection {
        InputSelection::from_fields(&self.url, self.file.as_ref())
    }

    /// Read and select the `.mp3` at `path`.
    ///
    /// On error the previous selection is kept.
    pub fn select_path(&mut self, path: &Path) -> Result<(), InputError> {
        if !is_mp3_path(path) {
            return Err(InputError::NotMp3(path.display().to_string()));
        }
        let file = AudioFile::from_path(path).map_err(|source| InputError::Read {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("input: selected {:?} ({} bytes)", file.name, file.bytes.len());
        self.file = Some(file);
        Ok(())
    }

    /// Select an already loaded file (drag-and-drop without a path).
    pub fn select_bytes(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), InputError> {
        if !is_mp3_path(Path::new(name)) {
            return Err(InputError::NotMp3(name.to_string()));
        }
        self.file = Some(AudioFile::new(name, bytes));
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
