//! Conversation controller
//!
//! The controller owns the session and drives everything else:
//! 1. Takes user input (typed text or a quick-reply selection)
//! 2. Appends the user's message and renders it
//! 3. Sends exactly one request to the chat service
//! 4. Appends and renders the reply, shows any quick-reply menu
//! 5. Schedules a restart when the service ends the conversation
//!
//! UI events are handled one at a time by [`ConversationController::run`], so
//! input arriving while a reply is in flight queues behind it and replies are
//! always rendered in submission order.

pub mod reset;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::config::{PresentationProfile, ResetIdentityPolicy};
use crate::identity::{IdentityStore, ParticipantId};
use crate::render::{MenuError, MenuId, QuickReplyMenu, Surface, TranscriptRenderer};
use crate::service::{ChatRequest, ChatService, ServerTurn, ServiceError};
use crate::transcript::{Message, Transcript};

use reset::ResetCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for user input
    Idle,
    /// A request is in flight
    AwaitingReply,
    /// The service ended the conversation; a restart is scheduled
    Resetting,
}

/// Everything that belongs to one conversation
#[derive(Debug)]
pub struct Session {
    identity: ParticipantId,
    transcript: Transcript,
    started_at: DateTime<Utc>,
}

impl Session {
    fn new(identity: ParticipantId) -> Self {
        Self {
            identity,
            transcript: Transcript::new(),
            started_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> &ParticipantId {
        &self.identity
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// What happened to one submission
#[derive(Debug)]
pub enum TurnOutcome {
    /// Input was empty after trimming
    Ignored,
    /// Input arrived while the client was waiting to restart
    Suppressed,
    Replied {
        menu: Option<MenuId>,
        reset_scheduled: bool,
    },
    /// The request failed; nothing was added for the bot
    Abandoned(ServiceError),
}

/// Input from the presentation surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Submit(String),
    QuickReply { menu: MenuId, index: usize },
    Teardown,
}

pub struct ConversationController<S: Surface> {
    service: Arc<dyn ChatService>,
    identities: IdentityStore,
    renderer: TranscriptRenderer,
    surface: S,
    session: Session,
    state: ControllerState,
    reset: ResetCoordinator,
    active_menu: Option<QuickReplyMenu>,
    next_menu: MenuId,
    greeting: String,
    reset_identity: ResetIdentityPolicy,
}

impl<S: Surface> ConversationController<S> {
    /// Create a controller and render the greeting
    pub fn start(
        service: Arc<dyn ChatService>,
        mut identities: IdentityStore,
        surface: S,
        profile: PresentationProfile,
    ) -> Self {
        let session = Session::new(identities.get_or_create());
        tracing::info!(
            participant = %session.identity,
            ephemeral = identities.is_ephemeral(),
            "Conversation started"
        );

        let mut controller = Self {
            service,
            identities,
            reset: ResetCoordinator::new(profile.reset_delay()),
            greeting: profile.greeting.clone(),
            reset_identity: profile.reset_identity,
            renderer: TranscriptRenderer::new(profile),
            surface,
            session,
            state: ControllerState::Idle,
            active_menu: None,
            next_menu: MenuId::new(1),
        };
        controller.append(Message::bot(controller.greeting.clone()));
        controller
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.session.transcript
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn active_menu(&self) -> Option<&QuickReplyMenu> {
        self.active_menu.as_ref()
    }

    pub fn reset_pending(&self) -> bool {
        self.reset.is_pending()
    }

    /// Submit user input and play out the resulting turn
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty input");
            return TurnOutcome::Ignored;
        }
        if self.state == ControllerState::Resetting {
            tracing::debug!("Conversation is restarting, discarding input");
            return TurnOutcome::Suppressed;
        }

        self.retire_menu();
        self.append(Message::user(text));
        self.surface.clear_input();
        self.state = ControllerState::AwaitingReply;

        let request = ChatRequest {
            user_id: self.session.identity.to_string(),
            message: text.to_string(),
        };
        tracing::debug!(participant = %request.user_id, "Awaiting reply");

        match self.service.send(&request).await {
            Ok(turn) => self.apply_turn(turn),
            Err(e) => {
                tracing::error!(error = %e, "Chat turn abandoned");
                self.state = ControllerState::Idle;
                TurnOutcome::Abandoned(e)
            }
        }
    }

    /// Select an option from the active quick-reply menu
    ///
    /// The option's text goes through [`submit`](Self::submit) exactly as if
    /// it had been typed.
    pub async fn select_quick_reply(
        &mut self,
        menu: MenuId,
        index: usize,
    ) -> Result<TurnOutcome, MenuError> {
        let active = self
            .active_menu
            .as_mut()
            .filter(|m| m.id() == menu)
            .ok_or(MenuError::Stale(menu))?;
        let text = active.select(index)?;
        Ok(self.submit(&text).await)
    }

    /// Wait for a scheduled reset and restart; returns false when none is pending
    pub async fn wait_for_reset(&mut self) -> bool {
        let Some(deadline) = self.reset.deadline() else {
            return false;
        };
        reset::until(Some(deadline)).await;
        self.restart();
        true
    }

    /// Drop pending timers and menus before the surface goes away
    pub fn teardown(&mut self) {
        self.reset.cancel();
        self.retire_menu();
        tracing::debug!("Controller torn down");
    }

    /// Handle UI events until teardown or until the sender is dropped
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> Self {
        loop {
            let deadline = self.reset.deadline();
            tokio::select! {
                _ = reset::until(deadline) => self.restart(),
                event = events.recv() => match event {
                    Some(UiEvent::Submit(text)) => {
                        self.submit(&text).await;
                    }
                    Some(UiEvent::QuickReply { menu, index }) => {
                        if let Err(e) = self.select_quick_reply(menu, index).await {
                            tracing::debug!(error = %e, "Quick reply rejected");
                        }
                    }
                    Some(UiEvent::Teardown) | None => {
                        self.teardown();
                        break;
                    }
                },
            }
        }
        self
    }

    fn apply_turn(&mut self, turn: ServerTurn) -> TurnOutcome {
        let reset_scheduled = turn.wants_reset();
        let ServerTurn { response, menu, .. } = turn;

        self.append(Message::bot(response));

        // A finished conversation offers no further choices.
        let menu = if reset_scheduled {
            None
        } else {
            self.show_menu(menu.as_deref().unwrap_or_default())
        };

        if reset_scheduled {
            self.reset.schedule();
            self.state = ControllerState::Resetting;
        } else {
            self.state = ControllerState::Idle;
        }

        TurnOutcome::Replied {
            menu,
            reset_scheduled,
        }
    }

    fn append(&mut self, message: Message) {
        let entry = self
            .renderer
            .render_entry(self.session.transcript.append(message));
        self.surface.append_entry(entry);
        self.surface.scroll_to_latest();
    }

    fn show_menu(&mut self, options: &[String]) -> Option<MenuId> {
        let menu = QuickReplyMenu::new(self.next_menu, options)?;
        self.next_menu = self.next_menu.next();

        self.surface.show_menu(&menu);
        self.surface.scroll_to_latest();
        let id = menu.id();
        self.active_menu = Some(menu);
        Some(id)
    }

    fn retire_menu(&mut self) {
        if let Some(menu) = self.active_menu.take() {
            self.surface.retire_menu(menu.id());
        }
    }

    fn restart(&mut self) {
        self.reset.cancel();
        self.retire_menu();

        if self.reset_identity == ResetIdentityPolicy::Rotate {
            self.identities.forget();
        }
        let previous = std::mem::replace(
            &mut self.session,
            Session::new(self.identities.get_or_create()),
        );
        self.surface.clear();
        self.append(Message::bot(self.greeting.clone()));
        self.state = ControllerState::Idle;

        tracing::info!(
            participant = %self.session.identity,
            previous_started_at = %previous.started_at(),
            previous_messages = previous.transcript().len(),
            "Conversation restarted"
        );
    }
}
