//! Transcript rendering
//!
//! Rendering is split in two: [`TranscriptRenderer`] turns messages into
//! [`RenderedEntry`] values, and a [`Surface`] owns the actual display. The
//! controller is the only caller of both.

mod html;
pub mod quick_reply;
mod terminal;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use serde::Serialize;

use crate::config::PresentationProfile;
use crate::transcript::{Message, Sender};

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M";

pub use html::{HtmlSurface, Node};
pub use quick_reply::{MenuError, MenuId, QuickReplyMenu};
pub use terminal::{ActiveMenu, TerminalSurface};

/// Visual unit for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEntry {
    pub sender: Sender,
    pub css_class: &'static str,
    pub label: Option<String>,
    /// Body markup, already safe to insert
    pub body_html: String,
    pub timestamp: String,
}

/// Presentation surface the controller draws on
pub trait Surface: Send {
    /// Add an entry after everything currently displayed
    fn append_entry(&mut self, entry: RenderedEntry);

    /// Display a set of quick-reply controls
    fn show_menu(&mut self, menu: &QuickReplyMenu);

    /// Disable the controls of a menu that can no longer be used
    fn retire_menu(&mut self, id: MenuId);

    /// Advance the scroll position to the newest entry
    fn scroll_to_latest(&mut self);

    fn clear_input(&mut self);

    /// Remove every entry and menu
    fn clear(&mut self);
}

pub struct TranscriptRenderer {
    profile: PresentationProfile,
}

impl TranscriptRenderer {
    pub fn new(mut profile: PresentationProfile) -> Self {
        if !is_valid_timestamp_format(&profile.timestamp_format) {
            tracing::warn!(
                format = %profile.timestamp_format,
                "Invalid timestamp format, using {}",
                DEFAULT_TIMESTAMP_FORMAT
            );
            profile.timestamp_format = DEFAULT_TIMESTAMP_FORMAT.into();
        }
        Self { profile }
    }

    pub fn render_entry(&self, message: &Message) -> RenderedEntry {
        let sender = message.sender();
        let label = self.profile.show_labels.then(|| match sender {
            Sender::Bot => self.profile.bot_label.clone(),
            Sender::User => self.profile.user_label.clone(),
        });

        // Bot text is markup from the trusted service; user text is not.
        let body_html = match sender {
            Sender::Bot => sanitize_markup(message.text()),
            Sender::User => escape_html(message.text()),
        };

        RenderedEntry {
            sender,
            css_class: sender.css_class(),
            label,
            body_html,
            timestamp: message
                .timestamp()
                .with_timezone(&Local)
                .format(&self.profile.timestamp_format)
                .to_string(),
        }
    }
}

/// Whether chrono can format timestamps with `format`
pub fn is_valid_timestamp_format(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reduce service markup to an allowlist of formatting tags and attributes
///
/// Script elements, event-handler attributes and `javascript:` URLs never
/// survive.
pub fn sanitize_markup(markup: &str) -> String {
    ammonia::clean(markup)
}
