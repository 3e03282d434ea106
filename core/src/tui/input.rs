use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::vim::InputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    SwitchTab(usize),
    NextTab,
    PrevTab,
    NextField,
    PrevField,
    Activate,
    StartBuild,
    ToggleTheme,
    ClearLog,
    YankLine,
    EnterCommand,
    EnterSearch,
    ExecuteCommand,
    ExecuteSearch,
    CancelInput,
    InsertChar(char),
    Backspace,
    ClearField,
    NextSearch,
    PrevSearch,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollHalfPageUp,
    ScrollHalfPageDown,
    ScrollToTop,
    ScrollToBottom,
    None,
}

/// Maps a key press to an action for the current input mode. `multiline`
/// tells editing mode whether Enter inserts a newline or finishes the edit.
pub fn handle_key_event(key: KeyEvent, mode: InputMode, multiline: bool) -> InputAction {
    match mode {
        InputMode::Normal => handle_normal_mode(key),
        InputMode::Editing => handle_editing_mode(key, multiline),
        InputMode::Command => handle_prompt_mode(key, true),
        InputMode::Search => handle_prompt_mode(key, false),
    }
}

fn handle_normal_mode(key: KeyEvent) -> InputAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => InputAction::Quit,
        KeyCode::Char('u') if ctrl => InputAction::ScrollHalfPageUp,
        KeyCode::Char('d') if ctrl => InputAction::ScrollHalfPageDown,
        KeyCode::Char(c @ '1'..='3') if alt => InputAction::SwitchTab(c as usize - '1' as usize),
        KeyCode::F(n @ 1..=3) => InputAction::SwitchTab(n as usize - 1),
        KeyCode::F(5) => InputAction::StartBuild,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('H') | KeyCode::Char('[') => InputAction::PrevTab,
        KeyCode::Char('L') | KeyCode::Char(']') => InputAction::NextTab,
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => InputAction::NextField,
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => InputAction::PrevField,
        KeyCode::Enter | KeyCode::Char(' ') => InputAction::Activate,
        KeyCode::Char('b') => InputAction::StartBuild,
        KeyCode::Char('t') => InputAction::ToggleTheme,
        KeyCode::Char('c') => InputAction::ClearLog,
        KeyCode::Char('y') => InputAction::YankLine,
        KeyCode::Char(':') => InputAction::EnterCommand,
        KeyCode::Char('/') => InputAction::EnterSearch,
        KeyCode::Char('n') => InputAction::NextSearch,
        KeyCode::Char('N') => InputAction::PrevSearch,
        KeyCode::Char('K') => InputAction::ScrollUp,
        KeyCode::Char('J') => InputAction::ScrollDown,
        KeyCode::PageUp => InputAction::ScrollPageUp,
        KeyCode::PageDown => InputAction::ScrollPageDown,
        KeyCode::Char('g') | KeyCode::Home => InputAction::ScrollToTop,
        KeyCode::Char('G') | KeyCode::End => InputAction::ScrollToBottom,
        _ => InputAction::None,
    }
}

fn handle_editing_mode(key: KeyEvent, multiline: bool) -> InputAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => InputAction::CancelInput,
            KeyCode::Char('u') => InputAction::ClearField,
            _ => InputAction::None,
        };
    }

    match key.code {
        KeyCode::Esc => InputAction::CancelInput,
        KeyCode::Enter if multiline => InputAction::InsertChar('\n'),
        KeyCode::Enter | KeyCode::Tab => InputAction::CancelInput,
        KeyCode::Backspace => InputAction::Backspace,
        KeyCode::Char(c) => InputAction::InsertChar(c),
        _ => InputAction::None,
    }
}

fn handle_prompt_mode(key: KeyEvent, is_command: bool) -> InputAction {
    match key.code {
        KeyCode::Enter => {
            if is_command {
                InputAction::ExecuteCommand
            } else {
                InputAction::ExecuteSearch
            }
        }
        KeyCode::Esc => InputAction::CancelInput,
        KeyCode::Backspace => InputAction::Backspace,
        KeyCode::Char(c) => InputAction::InsertChar(c),
        _ => InputAction::None,
    }
}
