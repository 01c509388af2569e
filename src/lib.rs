//! Parley - conversation client for chatbot services
//!
//! Keeps a transcript of the exchange, sends each user turn to the chat
//! service under a stable participant identity, renders replies and
//! quick-reply menus, and restarts the conversation when the service ends it.

pub mod config;
pub mod controller;
pub mod identity;
pub mod render;
pub mod service;
pub mod transcript;

pub use config::{Config, PresentationProfile, ResetIdentityPolicy};
pub use controller::{ControllerState, ConversationController, Session, TurnOutcome, UiEvent};
pub use identity::{IdentityStore, MemoryTabStorage, ParticipantId, TabStorage};
pub use render::{HtmlSurface, Surface, TerminalSurface};
pub use service::{ChatRequest, ChatService, HttpChatService, ServerTurn, ServiceError};
pub use transcript::{Message, Sender, Transcript};
