//! prompt.rs - the timed boot-source prompt.
//!
//! One second per tick, counted by an event provider; any key answers the
//! prompt, a tick burns one second, and an exhausted countdown or a broken
//! provider falls back to netboot so a headless box still comes up.

use crate::device::BootDevice;
use crate::logger::{log_info, log_warn};

/// Key that selects netboot.
pub const NETBOOT_KEY: char = 'n';
/// Key that selects the local kernel.
pub const LOCAL_KEY: char = 'm';
/// Countdown seconds when the command line does not override it.
pub const DEFAULT_TIMEOUT: u32 = 3;

/// One observation from the prompt's event provider.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromptEvent {
    /// A countdown second elapsed.
    Tick,
    /// A key arrived. Unmapped keys are delivered as-is and ignored here.
    Key(char),
    /// The provider failed; the prompt cannot continue.
    Failed,
}

/// Blocking source of prompt events. The firmware implementation waits on
/// a key event and a one-second periodic timer.
pub trait EventWait {
    fn wait(&mut self) -> PromptEvent;
}

/// Run the countdown. Keys win over ticks; a key that maps to no choice is
/// ignored without consuming countdown time.
pub fn run_prompt(events: &mut dyn EventWait, timeout_s: u32) -> BootDevice {
    let mut remaining = timeout_s;
    loop {
        if remaining == 0 {
            log_info("prompt", "timeout, defaulting to netboot");
            return BootDevice::Netboot;
        }
        match events.wait() {
            PromptEvent::Key(NETBOOT_KEY) => return BootDevice::Netboot,
            PromptEvent::Key(LOCAL_KEY) => return BootDevice::Local,
            PromptEvent::Key(_) => {}
            PromptEvent::Tick => remaining -= 1,
            PromptEvent::Failed => {
                log_warn("prompt", "event wait failed, defaulting to netboot");
                return BootDevice::Netboot;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    struct Script {
        events: Vec<PromptEvent>,
        consumed: usize,
    }

    impl Script {
        fn new(events: &[PromptEvent]) -> Self {
            Self {
                events: events.to_vec(),
                consumed: 0,
            }
        }
    }

    impl EventWait for Script {
        fn wait(&mut self) -> PromptEvent {
            let ev = self.events[self.consumed];
            self.consumed += 1;
            ev
        }
    }

    #[test]
    fn timeout_defaults_to_netboot() {
        let mut s = Script::new(&[PromptEvent::Tick; 3]);
        assert_eq!(run_prompt(&mut s, 3), BootDevice::Netboot);
        assert_eq!(s.consumed, 3);
    }

    #[test]
    fn keys_select_a_source() {
        let mut s = Script::new(&[PromptEvent::Key('m')]);
        assert_eq!(run_prompt(&mut s, 3), BootDevice::Local);

        let mut s = Script::new(&[PromptEvent::Tick, PromptEvent::Key('n')]);
        assert_eq!(run_prompt(&mut s, 3), BootDevice::Netboot);
        assert_eq!(s.consumed, 2);
    }

    #[test]
    fn unmapped_keys_cost_no_time() {
        let mut s = Script::new(&[
            PromptEvent::Key('x'),
            PromptEvent::Key('\0'),
            PromptEvent::Tick,
            PromptEvent::Key('q'),
            PromptEvent::Tick,
        ]);
        assert_eq!(run_prompt(&mut s, 2), BootDevice::Netboot);
        // All five events consumed: only the two ticks advanced the clock.
        assert_eq!(s.consumed, 5);
    }

    #[test]
    fn provider_failure_defaults_to_netboot() {
        let mut s = Script::new(&[PromptEvent::Failed]);
        assert_eq!(run_prompt(&mut s, 3), BootDevice::Netboot);
    }

    #[test]
    fn zero_timeout_never_waits() {
        let mut s = Script::new(&[]);
        assert_eq!(run_prompt(&mut s, 0), BootDevice::Netboot);
        assert_eq!(s.consumed, 0);
    }
}
