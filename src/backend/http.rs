use crate::backend::wire::{parse_turn_response, ChatError, HealthReport, TurnOutcome, TurnRequest};
use crate::backend::ChatBackend;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const CHAT_PATH: &str = "/api/chat";
const HEALTH_PATH: &str = "/api/health";
const USER_AGENT: &str = concat!("helpdesk/", env!("CARGO_PKG_VERSION"));
const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: Client,
    base_url: String,
    health_timeout: Duration,
}

fn build_client(builder: ClientBuilder) -> Result<Client, ChatError> {
    builder
        .build()
        .map_err(|err| ChatError::ClientSetup(err.to_string()))
}

impl HttpChatBackend {
    pub fn new(base_url: &str, request_timeout: Option<Duration>) -> Result<Self, ChatError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = build_client(builder)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        })
    }

    /// Caps each health check, independent of the chat request timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_turn(&self, request: &TurnRequest) -> Result<TurnOutcome, ChatError> {
        let response = self
            .client
            .post(self.endpoint(CHAT_PATH))
            .json(request)
            .send()
            .await
            .map_err(|err| ChatError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ChatError::Network(err.to_string()))?;

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_turn_response(&body)
    }

    async fn health(&self) -> Result<bool, ChatError> {
        let response = self
            .client
            .get(self.endpoint(HEALTH_PATH))
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|err| ChatError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let report: HealthReport = response
            .json()
            .await
            .map_err(|err| ChatError::Malformed(err.to_string()))?;
        if let Some(message) = report.message.as_deref() {
            tracing::debug!(status = %report.status, message, "health report");
        }
        Ok(report.is_healthy())
    }
}
