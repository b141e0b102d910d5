use crate::session::{SessionHandle, Speaker, Turn};

pub const WELCOME_MESSAGE: &str =
    "Hello! 👋 I'm your customer service assistant. How can I help you today?";

fn timestamp() -> String {
    chrono::Local::now().format("%I:%M %p").to_string()
}

/// Ordered, append-only chat log plus the transient typing indicator.
///
/// The indicator is a flag rather than an entry, so it always renders after
/// the last turn.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    typing: bool,
    scroll_to_bottom: bool,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        let mut transcript = Self {
            turns: Vec::new(),
            typing: false,
            scroll_to_bottom: false,
        };
        transcript.append_turn(Speaker::Agent, WELCOME_MESSAGE);
        transcript
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn append_turn(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(Turn {
            speaker,
            text: text.into(),
            timestamp: timestamp(),
        });
        self.scroll_to_bottom = true;
    }

    pub fn show_typing_indicator(&mut self) {
        if !self.typing {
            self.typing = true;
            self.scroll_to_bottom = true;
        }
    }

    pub fn hide_typing_indicator(&mut self) {
        if self.typing {
            self.typing = false;
            self.scroll_to_bottom = true;
        }
    }

    /// Drops every entry and starts over with the welcome turn. The returned
    /// handle is absent and replaces the caller's current one.
    #[must_use = "the cleared transcript starts a new conversation; adopt the returned handle"]
    pub fn clear(&mut self) -> SessionHandle {
        self.turns.clear();
        self.typing = false;
        self.append_turn(Speaker::Agent, WELCOME_MESSAGE);
        tracing::info!("transcript cleared");
        SessionHandle::default()
    }

    /// Returns whether the view should jump to the bottom, resetting the
    /// request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Transcript, WELCOME_MESSAGE};
    use crate::session::{SessionHandle, Speaker};

    #[test]
    fn new_transcript_starts_with_welcome() {
        let transcript = Transcript::new();
        assert_eq!(transcript.turns().len(), 1);
        assert_eq!(transcript.turns()[0].speaker, Speaker::Agent);
        assert_eq!(transcript.turns()[0].text, WELCOME_MESSAGE);
        assert!(!transcript.is_typing());
    }

    #[test]
    fn append_keeps_insertion_order_and_requests_scroll() {
        let mut transcript = Transcript::new();
        let _ = transcript.take_scroll_request();

        transcript.append_turn(Speaker::User, "first");
        transcript.append_turn(Speaker::Agent, "second");

        let texts: Vec<&str> = transcript
            .turns()
            .iter()
            .map(|turn| turn.text.as_str())
            .collect();
        assert_eq!(texts, vec![WELCOME_MESSAGE, "first", "second"]);
        assert!(!transcript.turns()[1].timestamp.is_empty());
        assert!(transcript.take_scroll_request());
        assert!(!transcript.take_scroll_request());
    }

    #[test]
    fn typing_indicator_is_idempotent() {
        let mut transcript = Transcript::new();
        let _ = transcript.take_scroll_request();

        transcript.hide_typing_indicator();
        assert!(!transcript.take_scroll_request());

        transcript.show_typing_indicator();
        transcript.show_typing_indicator();
        assert!(transcript.is_typing());
        assert!(transcript.take_scroll_request());

        transcript.hide_typing_indicator();
        assert!(transcript.take_scroll_request());
        transcript.hide_typing_indicator();
        assert!(!transcript.is_typing());
        assert!(!transcript.take_scroll_request());
    }

    #[test]
    fn clear_leaves_only_welcome_and_returns_absent_handle() {
        let mut transcript = Transcript::new();
        transcript.append_turn(Speaker::User, "hello");
        transcript.append_turn(Speaker::Agent, "hi");
        transcript.show_typing_indicator();

        let session = transcript.clear();

        assert_eq!(session, SessionHandle::default());
        assert!(session.is_absent());
        assert_eq!(transcript.turns().len(), 1);
        assert_eq!(transcript.turns()[0].text, WELCOME_MESSAGE);
        assert!(!transcript.is_typing());
    }
}
