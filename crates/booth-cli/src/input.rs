use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use booth_core::{BoothSignal, ShutdownSignal, SignalSource};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

/// Signal source fed by the keyboard monitor thread.
pub struct KeyboardSignals {
    rx: Receiver<BoothSignal>,
}

impl SignalSource for KeyboardSignals {
    fn poll(&mut self, timeout: Duration) -> Option<BoothSignal> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Spawn a thread that maps operator keys to booth signals:
///
/// - Enter or `s`: start the next try (stand-in for the join-hands gesture)
/// - Space: game over, capture the score
/// - `p`: play again, `e`: save & end
/// - Esc, `q`, Ctrl+C: terminate the booth (also trips `shutdown`)
pub fn spawn_keyboard_monitor(
    shutdown: Arc<ShutdownSignal>,
) -> (KeyboardSignals, JoinHandle<()>) {
    let (tx, rx): (Sender<BoothSignal>, Receiver<BoothSignal>) = mpsc::channel();

    let handle = thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !shutdown.is_shutdown() {
            // Poll with a timeout to keep checking the shutdown state
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && key_event.kind != KeyEventKind::Release
                && let Some(signal) = map_key(&key_event)
            {
                debug!("Key {:?} -> {:?}", key_event.code, signal);
                let terminate = signal == BoothSignal::Terminate;
                let _ = tx.send(signal);
                if terminate {
                    shutdown.trigger();
                    break;
                }
            }
        }

        debug!("Keyboard monitor stopped");
    });

    (KeyboardSignals { rx }, handle)
}

/// Map one key event to a booth signal, if any.
fn map_key(event: &KeyEvent) -> Option<BoothSignal> {
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(BoothSignal::Terminate)
        }
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(BoothSignal::Terminate),
        KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => Some(BoothSignal::StartTry),
        KeyCode::Char(' ') => Some(BoothSignal::GameOver),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(BoothSignal::PlayAgain),
        KeyCode::Char('e') | KeyCode::Char('E') => Some(BoothSignal::SaveAndEnd),
        _ => None,
    }
}
