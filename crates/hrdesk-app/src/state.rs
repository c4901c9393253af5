// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::EntityKind;

/// Which part of the screen owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Search,
    ColumnPicker,
    Edit,
    ConfirmDelete,
    Create,
    Help,
}

impl AppMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nav => "NAV",
            Self::Search => "SEARCH",
            Self::ColumnPicker => "COLUMNS",
            Self::Edit => "EDIT",
            Self::ConfirmDelete => "DELETE",
            Self::Create => "ADD",
            Self::Help => "HELP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: EntityKind,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_tab: EntityKind::Employee,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    SelectTab(EntityKind),
    Enter(AppMode),
    ExitToNav,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(EntityKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::SelectTab(kind) => {
                if kind == self.active_tab {
                    return Vec::new();
                }
                self.active_tab = kind;
                self.mode = AppMode::Nav;
                vec![AppEvent::TabChanged(kind)]
            }
            AppCommand::Enter(mode) => {
                self.mode = mode;
                vec![AppEvent::ModeChanged(mode)]
            }
            AppCommand::ExitToNav => {
                if self.mode == AppMode::Nav {
                    return Vec::new();
                }
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Tab switches only happen from nav mode; popups keep their tab.
    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        if self.mode != AppMode::Nav {
            return Vec::new();
        }
        let tabs = EntityKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::EntityKind;

    #[test]
    fn tab_rotation_wraps() {
        let last = *EntityKind::ALL.last().expect("tabs");
        let mut state = AppState {
            active_tab: last,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextTab);
        assert_eq!(state.active_tab, EntityKind::ALL[0]);
        assert_eq!(events, vec![AppEvent::TabChanged(EntityKind::ALL[0])]);

        state.dispatch(AppCommand::PrevTab);
        assert_eq!(state.active_tab, last);
    }

    #[test]
    fn tabs_stay_put_while_a_popup_is_open() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Enter(AppMode::Edit));

        assert!(state.dispatch(AppCommand::NextTab).is_empty());
        assert_eq!(state.active_tab, EntityKind::Employee);
    }

    #[test]
    fn select_tab_returns_to_nav() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Enter(AppMode::Search));

        let events = state.dispatch(AppCommand::SelectTab(EntityKind::Leave));
        assert_eq!(events, vec![AppEvent::TabChanged(EntityKind::Leave)]);
        assert_eq!(state.mode, AppMode::Nav);
        assert!(state.dispatch(AppCommand::SelectTab(EntityKind::Leave)).is_empty());
    }

    #[test]
    fn status_set_and_cleared() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::SetStatus("saved".to_owned()));
        assert_eq!(events, vec![AppEvent::StatusUpdated("saved".to_owned())]);
        assert_eq!(state.status_line.as_deref(), Some("saved"));

        state.dispatch(AppCommand::ClearStatus);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn mode_transitions() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::Enter(AppMode::ColumnPicker));
        assert_eq!(state.mode, AppMode::ColumnPicker);

        let events = state.dispatch(AppCommand::ExitToNav);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(events, vec![AppEvent::ModeChanged(AppMode::Nav)]);
        assert!(state.dispatch(AppCommand::ExitToNav).is_empty());
    }
}
