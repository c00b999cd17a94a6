//! prompt.rs - firmware event source for the timed boot prompt.
//!
//! One wait services two firmware events: the console's key event and a
//! one-second periodic timer. The timer is owned here and closed on drop;
//! the key event belongs to the console driver.

use super::console;
use crate::prompt::{EventWait, PromptEvent};
use uefi::boot::{self, EventType, TimerTrigger, Tpl};
use uefi::proto::console::text::Key;
use uefi::{system, Event};

/// 100ns units per countdown second.
const TICK_PERIOD_100NS: u64 = 10_000_000;

pub struct ConsoleTimerWait {
    key_event: Event,
    timer: Option<Event>,
}

impl ConsoleTimerWait {
    /// Arm the timer and grab the console key event. `None` when the
    /// firmware refuses either; the caller falls back to the default
    /// boot source.
    pub fn new() -> Option<Self> {
        let timer =
            unsafe { boot::create_event(EventType::TIMER, Tpl::CALLBACK, None, None) }.ok()?;
        if boot::set_timer(&timer, TimerTrigger::Periodic(TICK_PERIOD_100NS)).is_err() {
            let _ = boot::close_event(timer);
            return None;
        }
        let key_event = system::with_stdin(|input| input.wait_for_key_event())?;
        Some(Self {
            key_event,
            timer: Some(timer),
        })
    }
}

impl EventWait for ConsoleTimerWait {
    fn wait(&mut self) -> PromptEvent {
        let Some(timer) = self.timer.as_ref() else {
            return PromptEvent::Failed;
        };
        let mut events = unsafe { [self.key_event.unsafe_clone(), timer.unsafe_clone()] };
        match boot::wait_for_event(&mut events) {
            Ok(0) => {
                let key = system::with_stdin(|input| input.read_key());
                match key {
                    // Special keys surface as NUL and fall through the
                    // prompt's key map.
                    Ok(Some(Key::Printable(c))) => PromptEvent::Key(char::from(c)),
                    Ok(Some(Key::Special(_))) | Ok(None) => PromptEvent::Key('\0'),
                    Err(_) => PromptEvent::Key('\0'),
                }
            }
            Ok(_) => {
                console::print(".");
                PromptEvent::Tick
            }
            Err(_) => PromptEvent::Failed,
        }
    }
}

impl Drop for ConsoleTimerWait {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            let _ = boot::close_event(timer);
        }
    }
}
