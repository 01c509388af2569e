//! In-memory DOM-like surface
//!
//! Mirrors the chat page: a chat box of `div.bot` / `div.user` entries and
//! `div.menu-options` button groups, an input field and a scroll position.

use super::quick_reply::{MenuId, QuickReplyMenu};
use super::{escape_html, RenderedEntry, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Entry(RenderedEntry),
    Menu {
        id: MenuId,
        options: Vec<String>,
        retired: bool,
    },
}

#[derive(Debug, Default)]
pub struct HtmlSurface {
    nodes: Vec<Node>,
    input: String,
    /// Number of nodes scrolled into view
    scrolled_to: usize,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn entries(&self) -> impl Iterator<Item = &RenderedEntry> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Entry(entry) => Some(entry),
            Node::Menu { .. } => None,
        })
    }

    /// Menus whose controls can still be clicked
    pub fn active_menus(&self) -> Vec<(MenuId, &[String])> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Menu {
                    id,
                    options,
                    retired: false,
                } => Some((*id, options.as_slice())),
                _ => None,
            })
            .collect()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the newest node is in view
    pub fn is_scrolled_to_latest(&self) -> bool {
        self.scrolled_to == self.nodes.len()
    }

    /// Serialise the chat box to markup
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for node in &self.nodes {
            match node {
                Node::Entry(entry) => {
                    let label = entry
                        .label
                        .as_ref()
                        .map(|l| format!("{}: ", escape_html(l)))
                        .unwrap_or_default();
                    html.push_str(&format!(
                        "<div class=\"{}\"><span class=\"time\">{}</span>{}{}</div>\n",
                        entry.css_class,
                        escape_html(&entry.timestamp),
                        label,
                        entry.body_html
                    ));
                }
                Node::Menu {
                    id,
                    options,
                    retired,
                } => {
                    html.push_str(&format!("<div class=\"menu-options\" id=\"{}\">", id));
                    for option in options {
                        let disabled = if *retired { " disabled" } else { "" };
                        html.push_str(&format!(
                            "<button{}>{}</button>",
                            disabled,
                            escape_html(option)
                        ));
                    }
                    html.push_str("</div>\n");
                }
            }
        }
        html
    }
}

impl Surface for HtmlSurface {
    fn append_entry(&mut self, entry: RenderedEntry) {
        self.nodes.push(Node::Entry(entry));
    }

    fn show_menu(&mut self, menu: &QuickReplyMenu) {
        self.nodes.push(Node::Menu {
            id: menu.id(),
            options: menu.options().to_vec(),
            retired: false,
        });
    }

    fn retire_menu(&mut self, id: MenuId) {
        for node in &mut self.nodes {
            if let Node::Menu {
                id: node_id,
                retired,
                ..
            } = node
            {
                if *node_id == id {
                    *retired = true;
                }
            }
        }
    }

    fn scroll_to_latest(&mut self) {
        self.scrolled_to = self.nodes.len();
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.scrolled_to = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Sender;

    fn entry(sender: Sender, body: &str) -> RenderedEntry {
        RenderedEntry {
            sender,
            css_class: sender.css_class(),
            label: Some(match sender {
                Sender::Bot => "Bot".into(),
                Sender::User => "You".into(),
            }),
            body_html: body.into(),
            timestamp: "09:30".into(),
        }
    }

    #[test]
    fn test_html_output() {
        let mut surface = HtmlSurface::new();
        surface.append_entry(entry(Sender::User, "hello"));
        surface.append_entry(entry(Sender::Bot, "<b>hi</b>"));
        let menu = QuickReplyMenu::new(MenuId::new(1), &["A & B".to_string()]).unwrap();
        surface.show_menu(&menu);

        let html = surface.to_html();
        assert_eq!(
            html,
            "<div class=\"user\"><span class=\"time\">09:30</span>You: hello</div>\n\
             <div class=\"bot\"><span class=\"time\">09:30</span>Bot: <b>hi</b></div>\n\
             <div class=\"menu-options\" id=\"menu-1\"><button>A &amp; B</button></div>\n"
        );
    }

    #[test]
    fn test_retire_menu_disables_controls() {
        let mut surface = HtmlSurface::new();
        let menu = QuickReplyMenu::new(MenuId::new(2), &["x".to_string()]).unwrap();
        surface.show_menu(&menu);
        assert_eq!(surface.active_menus().len(), 1);

        surface.retire_menu(MenuId::new(2));
        assert!(surface.active_menus().is_empty());
        assert!(surface.to_html().contains("<button disabled>x</button>"));
    }

    #[test]
    fn test_scroll_tracks_latest() {
        let mut surface = HtmlSurface::new();
        surface.append_entry(entry(Sender::Bot, "one"));
        assert!(!surface.is_scrolled_to_latest());
        surface.scroll_to_latest();
        assert!(surface.is_scrolled_to_latest());
    }

    #[test]
    fn test_clear_keeps_input() {
        let mut surface = HtmlSurface::new();
        surface.append_entry(entry(Sender::Bot, "one"));
        surface.set_input("draft");
        surface.clear();

        assert!(surface.nodes().is_empty());
        assert_eq!(surface.input(), "draft");
    }
}
