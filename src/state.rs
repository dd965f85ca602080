//! Per-screen application state
//!
//! These types hold everything the two screens display and know nothing about
//! the terminal or the network. The shell in `app.rs` owns one of each and
//! feeds request outcomes back through the `finish_*` methods.

use std::fmt::Display;
use std::path::PathBuf;

/// Which screen the shell is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Upload,
    Chat,
}

impl View {
    pub fn all() -> [View; 2] {
        [View::Upload, View::Chat]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Upload => "Upload Transcript",
            View::Chat => "Chat with Transcripts",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            View::Upload => View::Chat,
            View::Chat => View::Upload,
        }
    }
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Bot => "Bot",
        }
    }
}

/// A single entry in the conversation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { sender: Sender::Bot, text: text.into() }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Default)]
pub struct UploadState {
    /// Path being typed in the file picker box
    pub path_input: String,
    pub selected_file: Option<PathBuf>,
    pub status: String,
    pub loading: bool,
}

impl UploadState {
    /// Record the chosen file. Last selection wins.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.selected_file = Some(path.into());
    }

    /// Select whatever is in the path box, ignoring an empty box
    pub fn select_typed_path(&mut self) -> bool {
        let typed = self.path_input.trim();
        if typed.is_empty() {
            return false;
        }
        let path = PathBuf::from(typed);
        self.select_file(path);
        true
    }

    /// Start an upload. Returns the file to send, or `None` when there is
    /// nothing to do (no file selected, or an upload already in flight).
    pub fn begin_submit(&mut self) -> Option<PathBuf> {
        if self.loading {
            return None;
        }
        let file = self.selected_file.clone()?;
        self.loading = true;
        Some(file)
    }

    pub fn finish_submit<E: Display>(&mut self, outcome: Result<String, E>) {
        self.status = match outcome {
            Ok(message) => message,
            Err(e) => format!("Upload failed: {}", e),
        };
        self.loading = false;
    }
}

#[derive(Debug, Default)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub draft: String,
    /// Cursor position in `draft`, counted in characters
    pub cursor: usize,
    pub sending: bool,
}

impl ChatState {
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.cursor = self.draft.chars().count();
    }

    /// Start a send: append the user's message and hand back the question.
    ///
    /// Returns `None` for an empty draft or while a previous send is still
    /// waiting on its answer.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.draft.is_empty() || self.sending {
            return None;
        }
        let question = self.draft.clone();
        self.messages.push(ChatMessage::user(question.clone()));
        self.sending = true;
        Some(question)
    }

    /// Apply the answer (or error) for the pending send and clear the draft
    pub fn finish_send<E: Display>(&mut self, outcome: Result<String, E>) {
        let reply = match outcome {
            Ok(answer) => ChatMessage::bot(answer),
            Err(e) => ChatMessage::bot(format!("Error: {}", e)),
        };
        self.messages.push(reply);
        self.draft.clear();
        self.cursor = 0;
        self.sending = false;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }
}
