pub mod transcript;

pub use transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: String,
}

/// Server-issued conversation identifier.
///
/// A fresh handle is absent. Only a successful turn fills it in
/// ([`crate::turn::TurnController::settle`]) and only
/// [`Transcript::clear`] hands out a reset one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHandle {
    conversation_id: Option<String>,
}

impl SessionHandle {
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    #[cfg(test)]
    pub fn is_absent(&self) -> bool {
        self.conversation_id.is_none()
    }

    pub(crate) fn adopt(conversation_id: String) -> Self {
        Self {
            conversation_id: Some(conversation_id),
        }
    }
}
