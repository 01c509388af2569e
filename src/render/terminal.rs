//! Line-oriented terminal surface

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use super::quick_reply::{MenuId, QuickReplyMenu};
use super::{RenderedEntry, Surface};

/// Shared view of the menu a numeric answer should select from
#[derive(Debug, Clone, Default)]
pub struct ActiveMenu(Arc<Mutex<Option<(MenuId, usize)>>>);

impl ActiveMenu {
    /// Map a 1-based choice to a menu option index
    pub fn resolve(&self, choice: usize) -> Option<(MenuId, usize)> {
        let active = *self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let (id, count) = active?;
        (1..=count).contains(&choice).then(|| (id, choice - 1))
    }

    fn set(&self, value: Option<(MenuId, usize)>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    fn clear_if(&self, id: MenuId) {
        let mut active = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*active, Some((current, _)) if current == id) {
            *active = None;
        }
    }
}

pub struct TerminalSurface<W: Write + Send> {
    out: W,
    active_menu: ActiveMenu,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            active_menu: ActiveMenu::default(),
        }
    }

    pub fn active_menu(&self) -> ActiveMenu {
        self.active_menu.clone()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write + Send> Surface for TerminalSurface<W> {
    fn append_entry(&mut self, entry: RenderedEntry) {
        let label = entry
            .label
            .as_ref()
            .map(|l| format!("{}: ", l))
            .unwrap_or_default();
        let line = format!("[{}] {}{}", entry.timestamp, label, to_plain_text(&entry.body_html));
        self.write_line(&line);
    }

    fn show_menu(&mut self, menu: &QuickReplyMenu) {
        for (i, option) in menu.options().iter().enumerate() {
            self.write_line(&format!("  ({}) {}", i + 1, option));
        }
        self.active_menu.set(Some((menu.id(), menu.options().len())));
    }

    fn retire_menu(&mut self, id: MenuId) {
        self.active_menu.clear_if(id);
    }

    fn scroll_to_latest(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "Failed to flush terminal");
        }
    }

    // The terminal's own line editor owns the input.
    fn clear_input(&mut self) {}

    fn clear(&mut self) {
        self.active_menu.set(None);
        self.write_line("");
        self.write_line("--- new conversation ---");
    }
}

/// Drop tags and decode the entities produced by escaping
fn to_plain_text(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
