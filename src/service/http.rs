//! HTTP implementation of the chat service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ChatRequest, ChatService, ServerTurn, ServiceError};

pub struct HttpChatService {
    client: Client,
    endpoint: String,
}

impl HttpChatService {
    /// Build a client posting to `{base_url}/chat`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn send(&self, request: &ChatRequest) -> Result<ServerTurn, ServiceError> {
        tracing::debug!(endpoint = %self.endpoint, user_id = %request.user_id, "Posting chat turn");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_path() {
        let service = HttpChatService::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(service.endpoint(), "http://localhost:5000/chat");

        let service = HttpChatService::new("http://localhost:5000", Duration::from_secs(5)).unwrap();
        assert_eq!(service.endpoint(), "http://localhost:5000/chat");
    }
}
