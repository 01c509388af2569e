//! Remote chat service
//!
//! One `POST /chat` per user turn, one [`ServerTurn`] per request.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpChatService;

/// Request body sent for every turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

/// Reply from the chat service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTurn {
    /// Text shown as the bot's message
    pub response: String,

    /// Suggested quick replies, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<Vec<String>>,

    /// Conversation is over and the client should restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
}

impl ServerTurn {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            menu: None,
            reset: None,
        }
    }

    pub fn with_menu<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.menu = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_reset(mut self) -> Self {
        self.reset = Some(true);
        self
    }

    /// Quick replies to render; empty when the menu is absent
    pub fn menu_options(&self) -> &[String] {
        self.menu.as_deref().unwrap_or_default()
    }

    pub fn wants_reset(&self) -> bool {
        self.reset.unwrap_or(false)
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can answer a chat turn
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ServerTurn, ServiceError>;
}
