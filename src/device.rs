//! device.rs - boot-source arbitration.
//!
//! Availability of a local kernel and of a usable network interface are
//! probed up front; the interactive prompt only runs when both sources
//! exist and a real choice has to be made.

use crate::logger::log_info;

/// The arbitrated boot source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BootDevice {
    /// Nothing to boot from. Terminal failure.
    None,
    /// Listen for a pushed kernel on the network.
    Netboot,
    /// Boot the kernel found on local storage.
    Local,
}

/// Pick the boot source. `prompt` runs only when both a local kernel and a
/// network interface are available.
pub fn decide(
    local_present: bool,
    network_available: bool,
    prompt: impl FnOnce() -> BootDevice,
) -> BootDevice {
    match (local_present, network_available) {
        (false, false) => BootDevice::None,
        (false, true) => {
            log_info("boot", "no local kernel, defaulting to netboot");
            BootDevice::Netboot
        }
        (true, false) => {
            log_info("boot", "no network, booting local kernel");
            BootDevice::Local
        }
        (true, true) => prompt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn unreached() -> BootDevice {
        panic!("prompt must not run");
    }

    #[test]
    fn neither_source_is_terminal() {
        assert_eq!(decide(false, false, unreached), BootDevice::None);
    }

    #[test]
    fn single_source_skips_prompt() {
        assert_eq!(decide(false, true, unreached), BootDevice::Netboot);
        assert_eq!(decide(true, false, unreached), BootDevice::Local);
    }

    #[test]
    fn both_sources_ask_the_prompt() {
        let asked = Cell::new(false);
        let choice = decide(true, true, || {
            asked.set(true);
            BootDevice::Local
        });
        assert!(asked.get());
        assert_eq!(choice, BootDevice::Local);
    }
}
