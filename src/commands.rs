//! The Ctrl/Cmd+K command palette.

use crate::input::{Key, KeyPress};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandId {
    NewChat,
    ClearHistory,
    Settings,
}

impl CommandId {
    pub const ALL: [CommandId; 3] = [
        CommandId::NewChat,
        CommandId::ClearHistory,
        CommandId::Settings,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            CommandId::NewChat => "new-chat",
            CommandId::ClearHistory => "clear-history",
            CommandId::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommandId::NewChat => "New Chat",
            CommandId::ClearHistory => "Clear History",
            CommandId::Settings => "Settings",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuOutcome {
    /// The menu closed; run this command.
    Run(CommandId),
    Handled,
    Ignored,
}

#[derive(Clone, Debug, Default)]
pub struct CommandMenu {
    open: bool,
    query: String,
    selected: usize,
}

impl CommandMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open = true;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.selected = 0;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.selected = 0;
    }

    /// Commands whose label contains the query, ignoring case.
    pub fn filtered(&self) -> Vec<CommandId> {
        let needle = self.query.to_lowercase();
        CommandId::ALL
            .into_iter()
            .filter(|cmd| cmd.label().to_lowercase().contains(&needle))
            .collect()
    }

    /// Run the command at `index` of the filtered list and close.
    pub fn choose(&mut self, index: usize) -> Option<CommandId> {
        let command = self.filtered().get(index).copied()?;
        self.close();
        Some(command)
    }

    pub fn handle_key(&mut self, press: &KeyPress) -> MenuOutcome {
        if press.is_command_palette() {
            self.toggle();
            return MenuOutcome::Handled;
        }
        if !self.open {
            return MenuOutcome::Ignored;
        }

        match press.key {
            Key::ArrowDown => {
                let last = self.filtered().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
                MenuOutcome::Handled
            }
            Key::ArrowUp => {
                self.selected = self.selected.saturating_sub(1);
                MenuOutcome::Handled
            }
            Key::Enter => match self.choose(self.selected) {
                Some(command) => MenuOutcome::Run(command),
                None => MenuOutcome::Handled,
            },
            Key::Escape => {
                self.close();
                MenuOutcome::Handled
            }
            _ => MenuOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key) -> KeyPress {
        KeyPress::new(key)
    }

    #[test]
    fn test_shortcut_toggles_the_menu() {
        let mut menu = CommandMenu::new();
        let shortcut = key(Key::Char('k')).with_meta();
        assert_eq!(menu.handle_key(&shortcut), MenuOutcome::Handled);
        assert!(menu.is_open());
        menu.handle_key(&shortcut);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_closed_menu_ignores_navigation() {
        let mut menu = CommandMenu::new();
        assert_eq!(menu.handle_key(&key(Key::Enter)), MenuOutcome::Ignored);
    }

    #[test]
    fn test_filter_matches_labels_and_resets_selection() {
        let mut menu = CommandMenu::new();
        menu.toggle();
        menu.handle_key(&key(Key::ArrowDown));
        assert_eq!(menu.selected(), 1);

        menu.set_query("CH");
        assert_eq!(menu.selected(), 0);
        assert_eq!(menu.filtered(), vec![CommandId::NewChat]);

        menu.set_query("zzz");
        assert!(menu.filtered().is_empty());
        assert_eq!(menu.handle_key(&key(Key::Enter)), MenuOutcome::Handled);
        assert!(menu.is_open());
    }

    #[test]
    fn test_enter_runs_the_selection_and_closes() {
        let mut menu = CommandMenu::new();
        menu.toggle();
        for _ in 0..5 {
            menu.handle_key(&key(Key::ArrowDown));
        }
        assert_eq!(menu.selected(), 2);
        menu.handle_key(&key(Key::ArrowUp));
        assert_eq!(
            menu.handle_key(&key(Key::Enter)),
            MenuOutcome::Run(CommandId::ClearHistory)
        );
        assert!(!menu.is_open());
        assert_eq!(menu.query(), "");
    }

    #[test]
    fn test_escape_closes() {
        let mut menu = CommandMenu::new();
        menu.toggle();
        menu.set_query("set");
        menu.handle_key(&key(Key::Escape));
        assert!(!menu.is_open());
        assert_eq!(menu.query(), "");
    }

    #[test]
    fn test_slugs_are_stable() {
        let slugs: Vec<&str> = CommandId::ALL.iter().map(|c| c.slug()).collect();
        assert_eq!(slugs, vec!["new-chat", "clear-history", "settings"]);
    }
}
