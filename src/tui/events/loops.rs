use super::{AppEvent, POLL_TIMEOUT, SCROLL_DELTA, TICK_INTERVAL};
use crate::core::error::{AppError, Result};
use crossterm::event::{self, Event, MouseEventKind};
use tokio::sync::mpsc::UnboundedSender;

/// Translates a terminal event into the app's vocabulary. Events the chat
/// has no use for map to `None`.
#[must_use]
pub fn map_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) => Some(AppEvent::Input(key)),
        Event::Paste(text) => Some(AppEvent::Paste(text)),
        Event::Resize(width, height) => Some(AppEvent::Resize(width, height)),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(AppEvent::MouseScroll(-SCROLL_DELTA)),
            MouseEventKind::ScrollDown => Some(AppEvent::MouseScroll(SCROLL_DELTA)),
            _ => None,
        },
        Event::FocusGained | Event::FocusLost => None,
    }
}

/// Reads terminal input on the blocking pool until the UI stops listening.
pub async fn terminal_event_loop(tx: UnboundedSender<AppEvent>) -> Result<()> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        while !tx.is_closed() {
            if !event::poll(POLL_TIMEOUT)? {
                continue;
            }
            if let Some(event) = map_event(event::read()?)
                && tx.send(event).is_err()
            {
                break;
            }
        }
        Ok(())
    })
    .await
    .map_err(|e| AppError::Terminal(format!("input reader stopped: {e}")))?
}

pub async fn tick_loop(tx: UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    while !tx.is_closed() {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    }
}
