use crate::backend::wire::{ChatError, TurnOutcome};
use crate::backend::BackendStatus;

#[derive(Debug, Clone)]
pub enum AppEvent {
    TurnSettled(Result<TurnOutcome, ChatError>),
    BackendStatusChanged(BackendStatus),
}
