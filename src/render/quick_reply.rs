//! Quick-reply menus
//!
//! A menu is a single-use set of controls: the first selection yields its
//! text, and every later selection on the same menu is refused.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MenuId(u64);

impl MenuId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("{0} is no longer active")]
    Stale(MenuId),

    #[error("{0} has already been used")]
    Consumed(MenuId),

    #[error("{menu} has no option {index}")]
    NoSuchOption { menu: MenuId, index: usize },
}

#[derive(Debug, Clone)]
pub struct QuickReplyMenu {
    id: MenuId,
    options: Vec<String>,
    consumed: bool,
}

impl QuickReplyMenu {
    /// Build a menu, or nothing when there are no options to show
    pub fn new(id: MenuId, options: &[String]) -> Option<Self> {
        if options.is_empty() {
            return None;
        }
        Some(Self {
            id,
            options: options.to_vec(),
            consumed: false,
        })
    }

    pub fn id(&self) -> MenuId {
        self.id
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Take the text of one option; succeeds at most once per menu
    pub fn select(&mut self, index: usize) -> Result<String, MenuError> {
        if self.consumed {
            return Err(MenuError::Consumed(self.id));
        }
        let text = self
            .options
            .get(index)
            .cloned()
            .ok_or(MenuError::NoSuchOption {
                menu: self.id,
                index,
            })?;
        self.consumed = true;
        Ok(text)
    }
}
