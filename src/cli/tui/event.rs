//! Event handling for the TUI

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

/// Terminal events
#[derive(Debug)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal resize; the next draw picks up the new size
    Resize(u16, u16),
    /// No input within one tick
    Tick,
}

/// Reads terminal events on a separate thread
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate in milliseconds
    pub fn new(tick_rate_ms: u64) -> Self {
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let event = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    // Only key presses, not releases or repeats
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        Event::Key(key)
                    }
                    Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                    _ => continue,
                }
            } else {
                Event::Tick
            };

            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }

    /// Receive the next event (blocking)
    pub fn next(&self) -> Result<Event> {
        Ok(self.rx.recv()?)
    }
}
