//! # Transcript
//!
//! The ordered list of chat entries shown to the user. Everything the UI
//! draws comes from here.
//!
//! ```text
//! Transcript
//! ├── [0] Model  "Hello! I'm your friendly..."   (greeting)
//! ├── [1] User   "hello"
//! └── [2] Model  "Hi th"                          ← patched while streaming
//! ```
//!
//! Entries are only ever appended. The two exceptions both touch the last
//! entry: `patch_last` rewrites its content while a response streams in, and
//! `replace_last` swaps a failed placeholder for an error entry.

/// Who produced a transcript entry. Fixed when the entry is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    /// UI-only failure notice. Never sent to the model.
    Error,
}

impl Role {
    /// Short label used in titles and logs.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Model => "assistant",
            Role::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Error, content)
    }
}

/// Append-mostly sequence of messages.
///
/// `revision` bumps on every mutation so the TUI can tell when a redraw or
/// auto-scroll is due without diffing entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }

    /// Overwrites the content of the last entry. No-op on an empty transcript.
    pub fn patch_last(&mut self, new_content: &str) {
        if let Some(last) = self.messages.last_mut() {
            new_content.clone_into(&mut last.content);
            self.revision += 1;
        }
    }

    /// Swaps the last entry for `message`. No-op on an empty transcript.
    pub fn replace_last(&mut self, message: Message) {
        if let Some(last) = self.messages.last_mut() {
            *last = message;
            self.revision += 1;
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
