// Maps keyboard input to actions

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::ui::actions::{Action, AppMode, NavigateAction};

/// Maps keyboard input to actions based on the current mode
pub struct KeyMapper {
    /// Mappings that work in every mode
    global_mappings: HashMap<(KeyCode, KeyModifiers), Action>,

    mode_mappings: HashMap<AppMode, HashMap<(KeyCode, KeyModifiers), Action>>,
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMapper {
    pub fn new() -> Self {
        let mut mapper = Self {
            global_mappings: HashMap::new(),
            mode_mappings: HashMap::new(),
        };

        mapper.init_global_mappings();
        mapper.init_grid_mappings();
        mapper.init_viewer_mappings();
        mapper
    }

    fn init_global_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        self.global_mappings
            .insert((Char('c'), Mod::CONTROL), Action::ForceQuit);
        self.global_mappings.insert((F(1), Mod::NONE), Action::ShowHelp);
    }

    fn init_grid_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        let mut mappings = HashMap::new();

        mappings.insert((Up, Mod::NONE), Action::Navigate(NavigateAction::Up(1)));
        mappings.insert((Down, Mod::NONE), Action::Navigate(NavigateAction::Down(1)));
        mappings.insert((Left, Mod::NONE), Action::Navigate(NavigateAction::Left(1)));
        mappings.insert((Right, Mod::NONE), Action::Navigate(NavigateAction::Right(1)));
        mappings.insert((PageUp, Mod::NONE), Action::Navigate(NavigateAction::PageUp));
        mappings.insert((PageDown, Mod::NONE), Action::Navigate(NavigateAction::PageDown));
        mappings.insert((Home, Mod::NONE), Action::Navigate(NavigateAction::Home));
        mappings.insert((End, Mod::NONE), Action::Navigate(NavigateAction::End));

        // Vim navigation
        mappings.insert((Char('h'), Mod::NONE), Action::Navigate(NavigateAction::Left(1)));
        mappings.insert((Char('j'), Mod::NONE), Action::Navigate(NavigateAction::Down(1)));
        mappings.insert((Char('k'), Mod::NONE), Action::Navigate(NavigateAction::Up(1)));
        mappings.insert((Char('l'), Mod::NONE), Action::Navigate(NavigateAction::Right(1)));
        mappings.insert((Char('g'), Mod::NONE), Action::Navigate(NavigateAction::Home));
        mappings.insert((Char('G'), Mod::SHIFT), Action::Navigate(NavigateAction::End));

        mappings.insert((Char('/'), Mod::NONE), Action::StartSearch);
        mappings.insert((Char('s'), Mod::NONE), Action::SortColumn);
        mappings.insert((Char('f'), Mod::NONE), Action::OpenFilterPanel);
        mappings.insert((Char('c'), Mod::NONE), Action::OpenColumnPanel);
        mappings.insert((Enter, Mod::NONE), Action::BeginEdit);
        mappings.insert((Char('e'), Mod::NONE), Action::BeginEdit);
        mappings.insert((Char(' '), Mod::NONE), Action::ToggleRowSelection);
        mappings.insert((Char('a'), Mod::NONE), Action::ToggleSelectAll);
        mappings.insert((Char('o'), Mod::NONE), Action::ActivateRow);
        mappings.insert((Char('x'), Mod::NONE), Action::ExportSelection);
        mappings.insert((Char('w'), Mod::NONE), Action::SaveData);
        mappings.insert((Char('L'), Mod::SHIFT), Action::ShowLog);
        mappings.insert((Char('?'), Mod::NONE), Action::ShowHelp);
        mappings.insert((Esc, Mod::NONE), Action::ClearSearch);
        mappings.insert((Char('q'), Mod::NONE), Action::Quit);

        self.mode_mappings.insert(AppMode::Grid, mappings);
    }

    /// Help and log views only scroll and close
    fn init_viewer_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        let mut mappings = HashMap::new();
        mappings.insert((Esc, Mod::NONE), Action::ExitCurrentMode);
        mappings.insert((Char('q'), Mod::NONE), Action::ExitCurrentMode);
        mappings.insert((Up, Mod::NONE), Action::Navigate(NavigateAction::Up(1)));
        mappings.insert((Down, Mod::NONE), Action::Navigate(NavigateAction::Down(1)));
        mappings.insert((Char('k'), Mod::NONE), Action::Navigate(NavigateAction::Up(1)));
        mappings.insert((Char('j'), Mod::NONE), Action::Navigate(NavigateAction::Down(1)));
        mappings.insert((PageUp, Mod::NONE), Action::Navigate(NavigateAction::PageUp));
        mappings.insert((PageDown, Mod::NONE), Action::Navigate(NavigateAction::PageDown));

        self.mode_mappings.insert(AppMode::Help, mappings.clone());
        self.mode_mappings.insert(AppMode::Log, mappings);
    }

    /// Map a key event to an action, if the mode has one for it
    pub fn map_key(&self, key: KeyEvent, mode: AppMode) -> Option<Action> {
        // Some terminals report shifted letters with SHIFT, some without
        let modifiers = match key.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => key.modifiers.union(KeyModifiers::SHIFT),
            KeyCode::Char(_) => key.modifiers.difference(KeyModifiers::SHIFT),
            _ => key.modifiers,
        };
        let key_combo = (key.code, modifiers);

        if let Some(action) = self.global_mappings.get(&key_combo) {
            return Some(action.clone());
        }

        self.mode_mappings
            .get(&mode)
            .and_then(|mappings| mappings.get(&key_combo))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_keys() {
        let mapper = KeyMapper::new();
        let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(
            mapper.map_key(key, AppMode::Grid),
            Some(Action::Navigate(NavigateAction::Down(1)))
        );

        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(mapper.map_key(key, AppMode::Grid), Some(Action::SortColumn));
        assert_eq!(mapper.map_key(key, AppMode::Help), None);
    }

    #[test]
    fn test_shifted_letters_without_modifier() {
        let mapper = KeyMapper::new();
        let key = KeyEvent::new(KeyCode::Char('L'), KeyModifiers::NONE);
        assert_eq!(mapper.map_key(key, AppMode::Grid), Some(Action::ShowLog));
    }

    #[test]
    fn test_ctrl_c_everywhere() {
        let mapper = KeyMapper::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(mapper.map_key(key, AppMode::Edit), Some(Action::ForceQuit));
    }
}
