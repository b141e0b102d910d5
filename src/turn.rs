use crate::backend::wire::{ChatError, TurnOutcome, TurnRequest};
use crate::backend::ChatBackend;
use crate::session::{SessionHandle, Speaker, Transcript};
use crate::ui::composer::Composer;

pub const PROCESSING_MESSAGE: &str =
    "I'm processing your request. Could you share a few more details?";
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
}

/// How the last turn ended, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Answered { replies: usize },
    Rejected,
    Failed(String),
}

/// Drives a single conversational turn and owns the UI lock.
#[derive(Debug)]
pub struct TurnController {
    state: TurnState,
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnController {
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == TurnState::Sending
    }

    /// Starts a turn from the composer's draft.
    ///
    /// Returns `None` without touching anything when the draft is blank or a
    /// turn is already in flight. Otherwise the user turn is appended, the
    /// composer cleared, the lock taken and the typing indicator shown; the
    /// caller sends the returned request.
    pub fn begin(
        &mut self,
        transcript: &mut Transcript,
        composer: &mut Composer,
        session: &SessionHandle,
    ) -> Option<TurnRequest> {
        if self.is_locked() {
            return None;
        }
        let message = composer.draft().trim().to_string();
        if message.is_empty() {
            return None;
        }

        transcript.append_turn(Speaker::User, message.clone());
        composer.clear();
        self.state = TurnState::Sending;
        transcript.show_typing_indicator();

        Some(TurnRequest {
            message,
            session_id: session.conversation_id().map(str::to_string),
        })
    }

    /// Applies the response of the in-flight turn and releases the lock.
    ///
    /// The returned handle replaces `session`: it carries the new
    /// conversation id on success and is `session` unchanged otherwise.
    pub fn settle(
        &mut self,
        transcript: &mut Transcript,
        session: SessionHandle,
        result: Result<TurnOutcome, ChatError>,
    ) -> (SessionHandle, Settlement) {
        transcript.hide_typing_indicator();

        let (session, settlement) = match result {
            Ok(TurnOutcome::Success {
                session_id,
                messages,
            }) => {
                if messages.is_empty() {
                    transcript.append_turn(Speaker::Agent, PROCESSING_MESSAGE);
                }
                let replies = messages.len();
                for message in messages {
                    transcript.append_turn(Speaker::Agent, message);
                }
                tracing::info!(session_id = %session_id, replies, "turn answered");
                (
                    SessionHandle::adopt(session_id),
                    Settlement::Answered { replies },
                )
            }
            Ok(TurnOutcome::Failure { error }) => {
                tracing::info!(error = ?error, "turn rejected by backend");
                let text = error.unwrap_or_else(|| CONNECTION_ERROR_MESSAGE.to_string());
                transcript.append_turn(Speaker::Agent, text);
                (session, Settlement::Rejected)
            }
            Err(err) => {
                tracing::warn!(error = %err, "turn failed");
                transcript.append_turn(Speaker::Agent, CONNECTION_ERROR_MESSAGE);
                (session, Settlement::Failed(err.to_string()))
            }
        };

        self.state = TurnState::Idle;
        (session, settlement)
    }

    /// Runs a whole turn against `backend`, returning the handle to use for
    /// the next one.
    pub async fn submit<B: ChatBackend + ?Sized>(
        &mut self,
        backend: &B,
        transcript: &mut Transcript,
        composer: &mut Composer,
        session: SessionHandle,
    ) -> SessionHandle {
        let Some(request) = self.begin(transcript, composer, &session) else {
            return session;
        };
        let result = backend.send_turn(&request).await;
        let (session, _) = self.settle(transcript, session, result);
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::ScriptedBackend;

    fn success(session_id: &str, messages: &[&str]) -> Result<TurnOutcome, ChatError> {
        Ok(TurnOutcome::Success {
            session_id: session_id.to_string(),
            messages: messages.iter().map(|m| m.to_string()).collect(),
        })
    }

    fn draft(text: &str) -> Composer {
        Composer {
            text: text.to_string(),
        }
    }

    fn agent_texts_after(transcript: &Transcript, skip: usize) -> Vec<String> {
        transcript
            .turns()
            .iter()
            .skip(skip)
            .filter(|turn| turn.speaker == Speaker::Agent)
            .map(|turn| turn.text.clone())
            .collect()
    }

    #[test]
    fn begin_appends_user_turn_before_any_request() {
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();
        let mut composer = draft("  where is my order?  \n");

        let request = controller
            .begin(&mut transcript, &mut composer, &SessionHandle::default())
            .expect("non-empty draft should start a turn");

        assert_eq!(request.message, "where is my order?");
        assert_eq!(request.session_id, None);
        assert_eq!(transcript.turns().len(), 2);
        let user_turn = &transcript.turns()[1];
        assert_eq!(user_turn.speaker, Speaker::User);
        assert_eq!(user_turn.text, "where is my order?");
        assert_eq!(composer.draft(), "");
        assert!(controller.is_locked());
        assert!(transcript.is_typing());
    }

    #[test]
    fn blank_input_is_a_no_op() {
        for input in ["", "   ", "\n\t "] {
            let mut controller = TurnController::new();
            let mut transcript = Transcript::new();
            let mut composer = draft(input);

            let request =
                controller.begin(&mut transcript, &mut composer, &SessionHandle::default());

            assert!(request.is_none());
            assert_eq!(transcript.turns().len(), 1);
            assert!(!transcript.is_typing());
            assert_eq!(controller.state(), TurnState::Idle);
        }
    }

    #[test]
    fn begin_while_locked_is_ignored() {
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();
        let session = SessionHandle::default();
        controller
            .begin(&mut transcript, &mut draft("first"), &session)
            .expect("first turn should start");

        let mut second = draft("second");
        assert!(controller
            .begin(&mut transcript, &mut second, &session)
            .is_none());
        assert_eq!(transcript.turns().len(), 2);
        assert_eq!(second.draft(), "second");
    }

    #[test]
    fn success_appends_each_message_in_order() {
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();
        controller
            .begin(&mut transcript, &mut draft("hi"), &SessionHandle::default())
            .expect("turn should start");

        let (session, settlement) =
            controller.settle(&mut transcript, SessionHandle::default(), success("s-1", &["A", "B"]));

        assert_eq!(session.conversation_id(), Some("s-1"));
        assert_eq!(settlement, Settlement::Answered { replies: 2 });
        assert_eq!(agent_texts_after(&transcript, 2), vec!["A", "B"]);
        assert!(!transcript.is_typing());
        assert!(!controller.is_locked());
    }

    #[test]
    fn empty_success_appends_single_fallback() {
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();
        controller
            .begin(&mut transcript, &mut draft("hi"), &SessionHandle::default())
            .expect("turn should start");

        let (session, _) =
            controller.settle(&mut transcript, SessionHandle::default(), success("s-2", &[]));

        assert_eq!(session.conversation_id(), Some("s-2"));
        assert_eq!(agent_texts_after(&transcript, 2), vec![PROCESSING_MESSAGE]);
    }

    #[test]
    fn backend_error_text_is_shown_and_session_kept() {
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();
        let before = SessionHandle::adopt("s-7".to_string());
        controller
            .begin(&mut transcript, &mut draft("hi"), &before)
            .expect("turn should start");

        let (after, settlement) = controller.settle(
            &mut transcript,
            before.clone(),
            Ok(TurnOutcome::Failure {
                error: Some("rate limited".to_string()),
            }),
        );

        assert_eq!(after, before);
        assert_eq!(settlement, Settlement::Rejected);
        assert_eq!(agent_texts_after(&transcript, 2), vec!["rate limited"]);
        assert!(!controller.is_locked());
    }

    #[test]
    fn failure_without_text_and_transport_errors_use_generic_message() {
        let failures = vec![
            Ok(TurnOutcome::Failure { error: None }),
            Err(ChatError::Network("connection refused".to_string())),
            Err(ChatError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
            Err(ChatError::Malformed("expected value".to_string())),
        ];

        for failure in failures {
            let mut controller = TurnController::new();
            let mut transcript = Transcript::new();
            controller
                .begin(&mut transcript, &mut draft("hi"), &SessionHandle::default())
                .expect("turn should start");

            let (session, _) = controller.settle(&mut transcript, SessionHandle::default(), failure);

            assert!(session.is_absent());
            assert_eq!(
                agent_texts_after(&transcript, 2),
                vec![CONNECTION_ERROR_MESSAGE]
            );
            assert!(!transcript.is_typing());
            assert!(!controller.is_locked());
        }
    }

    #[tokio::test]
    async fn session_id_flows_into_next_request() {
        let backend = ScriptedBackend::with_replies(vec![
            success("s-1", &["first reply"]),
            Ok(TurnOutcome::Failure {
                error: Some("try later".to_string()),
            }),
            success("s-2", &["third reply"]),
            success("s-2", &["fourth reply"]),
        ]);
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();
        let mut session = SessionHandle::default();

        for text in ["one", "two", "three", "four"] {
            let mut composer = draft(text);
            session = controller
                .submit(&backend, &mut transcript, &mut composer, session)
                .await;
            assert!(!controller.is_locked());
        }

        let sent: Vec<Option<String>> = backend
            .requests()
            .into_iter()
            .map(|request| request.session_id)
            .collect();
        assert_eq!(
            sent,
            vec![
                None,
                Some("s-1".to_string()),
                Some("s-1".to_string()),
                Some("s-2".to_string()),
            ]
        );
        assert_eq!(session.conversation_id(), Some("s-2"));
    }

    #[tokio::test]
    async fn submit_with_blank_input_sends_nothing() {
        let backend = ScriptedBackend::with_replies(Vec::new());
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();

        let session = controller
            .submit(
                &backend,
                &mut transcript,
                &mut draft("   "),
                SessionHandle::default(),
            )
            .await;

        assert!(session.is_absent());
        assert!(backend.requests().is_empty());
        assert_eq!(transcript.turns().len(), 1);
    }

    #[tokio::test]
    async fn clear_resets_session_for_following_turn() {
        let backend = ScriptedBackend::with_replies(vec![
            success("s-1", &["hello"]),
            success("s-9", &["fresh start"]),
        ]);
        let mut controller = TurnController::new();
        let mut transcript = Transcript::new();

        let session = controller
            .submit(
                &backend,
                &mut transcript,
                &mut draft("one"),
                SessionHandle::default(),
            )
            .await;
        assert_eq!(session.conversation_id(), Some("s-1"));

        let session = transcript.clear();
        assert_eq!(transcript.turns().len(), 1);

        let _ = controller
            .submit(&backend, &mut transcript, &mut draft("two"), session)
            .await;
        let sent: Vec<Option<String>> = backend
            .requests()
            .into_iter()
            .map(|request| request.session_id)
            .collect();
        assert_eq!(sent, vec![None, None]);
    }
}
