// Copyright (c) 2026 rezky_nightky

use std::io;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

pub const QUEUE_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StormEvent {
    Resize(u16, u16),
    Key(KeyEvent),
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Reset,
    TogglePause,
}

pub fn channel() -> (SyncSender<StormEvent>, Receiver<StormEvent>) {
    sync_channel(QUEUE_CAPACITY)
}

/// Forwards terminal input and resizes into the queue until the queue closes.
pub fn spawn_input_thread(tx: SyncSender<StormEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("input".into())
        .spawn(move || loop {
            let ev = match event::read() {
                Ok(Event::Resize(w, h)) => StormEvent::Resize(w, h),
                Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => StormEvent::Key(k),
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal input failed; input thread stopping");
                    return;
                }
            };
            if tx.send(ev).is_err() {
                return;
            }
        })?;
    Ok(())
}

#[cfg(unix)]
pub fn install_shutdown_handler(tx: SyncSender<StormEvent>) {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = match Signals::new([SIGINT, SIGTERM, SIGHUP]) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install signal handler");
            return;
        }
    };
    let spawned = thread::Builder::new().name("signals".into()).spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(sig, "shutdown signal received");
            let _ = tx.send(StormEvent::Shutdown);
        }
    });
    if let Err(e) = spawned {
        warn!(error = %e, "failed to start signal thread");
    }
}

#[cfg(windows)]
pub fn install_shutdown_handler(tx: SyncSender<StormEvent>) {
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.try_send(StormEvent::Shutdown);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler");
    }
}

pub fn classify_key(key: &KeyEvent, screensaver: bool) -> Control {
    if screensaver {
        return Control::Quit;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Control::Quit,
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Control::Quit,
        (KeyCode::Char(' '), _) => Control::Reset,
        (KeyCode::Char('p'), _) => Control::TogglePause,
        _ => Control::Continue,
    }
}
