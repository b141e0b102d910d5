use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRequest {
    pub message: String,
    pub session_id: Option<String>,
}

/// A chat response that passed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Success {
        session_id: String,
        messages: Vec<String>,
    },
    Failure {
        error: Option<String>,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("http client setup failed: {0}")]
    ClientSetup(String),

    #[error("request task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Deserialize)]
struct RawTurnResponse {
    success: bool,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    messages: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawTurnResponse> for TurnOutcome {
    type Error = ChatError;

    fn try_from(raw: RawTurnResponse) -> Result<Self, Self::Error> {
        if !raw.success {
            let error = raw.error.filter(|error| !error.trim().is_empty());
            return Ok(Self::Failure { error });
        }

        let session_id = raw
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ChatError::Malformed("success without session_id".to_string()))?;
        let messages = raw
            .messages
            .ok_or_else(|| ChatError::Malformed("success without messages".to_string()))?;

        Ok(Self::Success {
            session_id,
            messages,
        })
    }
}

pub fn parse_turn_response(body: &str) -> Result<TurnOutcome, ChatError> {
    let raw: RawTurnResponse =
        serde_json::from_str(body).map_err(|err| ChatError::Malformed(err.to_string()))?;
    TurnOutcome::try_from(raw)
}

#[derive(Debug, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
