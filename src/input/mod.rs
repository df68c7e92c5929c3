use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::{AppState, Screen};
use crate::playback::SpeedTier;
use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(Duration::from_millis(250)).unwrap_or(false) {
                if !forward_event(&tx, event::read(), mouse_enabled) {
                    break;
                }
            } else if tx.is_closed() {
                break;
            }
        }
    });
}

const READ_BACKOFF: Duration = Duration::from_millis(50);

/// Pushes one terminal event into the app loop. Returns false once the
/// app has gone away.
fn forward_event(
    tx: &mpsc::Sender<Event>,
    read: std::io::Result<CtEvent>,
    mouse_enabled: bool,
) -> bool {
    let ev = match read {
        Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
        Ok(CtEvent::Mouse(m)) if mouse_enabled => InputEvent::Mouse(m),
        Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
        Ok(_) => return true,
        Err(e) => {
            // A broken terminal fails every read; don't spin on it.
            debug!("terminal read failed: {e}");
            std::thread::sleep(READ_BACKOFF);
            return !tx.is_closed();
        }
    };
    tx.blocking_send(Event::Input(ev)).is_ok()
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Mouse(m) => match (state.screen, m.kind) {
            (Screen::Reproducer, MouseEventKind::ScrollUp) => Some(Action::ScrollUp),
            (Screen::Reproducer, MouseEventKind::ScrollDown) => Some(Action::ScrollDown),
            (Screen::Library, MouseEventKind::ScrollUp) => Some(Action::ListUp),
            (Screen::Library, MouseEventKind::ScrollDown) => Some(Action::ListDown),
            _ => None,
        },
        InputEvent::Key(k) => match state.screen {
            Screen::Library => handle_library_screen(k),
            Screen::Reproducer => handle_reproducer_screen(k),
            Screen::Help => handle_help_screen(k),
        },
    }
}

fn handle_library_screen(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),

        KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::GoTop),
        KeyCode::Char('G') | KeyCode::End => Some(Action::GoBottom),

        KeyCode::Enter => Some(Action::OpenSelected),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::DeleteSelected),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ShowHelp),
        _ => None,
    }
}

fn handle_reproducer_screen(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc | KeyCode::Backspace => Some(Action::Back),

        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::TogglePlay),
        KeyCode::Char('1') => Some(Action::SetSpeed(SpeedTier::Slow)),
        KeyCode::Char('2') => Some(Action::SetSpeed(SpeedTier::Normal)),
        KeyCode::Char('3') => Some(Action::SetSpeed(SpeedTier::Fast)),
        KeyCode::Char('4') => Some(Action::SetSpeed(SpeedTier::VeryFast)),
        KeyCode::Char('s') | KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::SpeedUp),
        KeyCode::Char('S') | KeyCode::Char('-') => Some(Action::SpeedDown),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Rewind),

        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ShowHelp),
        _ => None,
    }
}

fn handle_help_screen(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) | KeyCode::Backspace => Some(Action::Back),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn on(screen: Screen) -> AppState {
        let mut state = AppState::new(SpeedTier::Normal);
        state.screen = screen;
        state
    }

    #[test]
    fn test_library_keys() {
        let state = on(Screen::Library);
        assert_eq!(map_input_to_action(&state, key(KeyCode::Enter)), Some(Action::OpenSelected));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('j'))), Some(Action::ListDown));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char(' '))), None);
    }

    #[test]
    fn test_reproducer_keys() {
        let state = on(Screen::Reproducer);
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char(' '))), Some(Action::TogglePlay));
        assert_eq!(
            map_input_to_action(&state, key(KeyCode::Char('4'))),
            Some(Action::SetSpeed(SpeedTier::VeryFast))
        );
        assert_eq!(map_input_to_action(&state, key(KeyCode::Esc)), Some(Action::Back));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('g'))), Some(Action::Rewind));
    }

    #[test]
    fn test_help_keys() {
        let state = on(Screen::Help);
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('?'))), Some(Action::Back));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Char('j'))), None);
    }

    #[test]
    fn test_forward_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);

        assert!(forward_event(&tx, Ok(CtEvent::Key(press)), false));
        assert!(matches!(rx.try_recv(), Ok(Event::Input(InputEvent::Key(_)))));

        let failed = Err(std::io::Error::other("tty gone"));
        assert!(forward_event(&tx, failed, false));
        assert!(rx.try_recv().is_err());

        drop(rx);
        let failed = Err(std::io::Error::other("tty gone"));
        assert!(!forward_event(&tx, failed, false));
        assert!(!forward_event(&tx, Ok(CtEvent::Key(press)), false));
    }

    #[test]
    fn test_mouse_wheel_depends_on_screen() {
        let wheel = |kind| {
            InputEvent::Mouse(MouseEvent {
                kind,
                column: 0,
                row: 0,
                modifiers: KeyModifiers::NONE,
            })
        };
        assert_eq!(
            map_input_to_action(&on(Screen::Reproducer), wheel(MouseEventKind::ScrollDown)),
            Some(Action::ScrollDown)
        );
        assert_eq!(
            map_input_to_action(&on(Screen::Library), wheel(MouseEventKind::ScrollUp)),
            Some(Action::ListUp)
        );
        assert_eq!(map_input_to_action(&on(Screen::Help), wheel(MouseEventKind::ScrollUp)), None);
    }
}
