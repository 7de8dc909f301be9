use crate::config::STATUS_DISMISS_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

impl StatusKind {
    pub fn css_class(self) -> &'static str {
        match self {
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        }
    }
}

/// A transient, non-blocking notice for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub dismiss_after_ms: u32,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
            dismiss_after_ms: STATUS_DISMISS_MS,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
            dismiss_after_ms: STATUS_DISMISS_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub id: u64,
    pub message: StatusMessage,
}

/// Messages currently on screen. Each one is dismissed independently by id, so a new
/// message never waits on an older one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBoard {
    next_id: u64,
    entries: Vec<StatusEntry>,
}

impl StatusBoard {
    pub fn push(&mut self, message: StatusMessage) -> u64 {
        self.next_id = self.next_id.wrapping_add(1);
        let id = self.next_id;
        self.entries.push(StatusEntry { id, message });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_kind_and_default_lifetime() {
        let msg = StatusMessage::error("Error loading sightings");
        assert_eq!(msg.kind.css_class(), "error");
        assert_eq!(msg.dismiss_after_ms, 5_000);
        assert_eq!(StatusMessage::success("ok").kind, StatusKind::Success);
    }

    #[test]
    fn board_dismisses_by_id_only() {
        let mut board = StatusBoard::default();
        let first = board.push(StatusMessage::error("a"));
        let second = board.push(StatusMessage::success("b"));
        assert_ne!(first, second);

        assert!(board.dismiss(first));
        assert!(!board.dismiss(first));
        assert_eq!(board.entries().len(), 1);
        assert_eq!(board.entries()[0].id, second);
    }
}
