//! netboot.rs - the network-boot dispatch loop.
//!
//! The loop owns the session lifecycle: poll the transport, judge whether
//! the kernel buffer holds a complete payload, and either chainload it as a
//! firmware image or break out for handoff. Chainload failures are
//! transient by definition; the loop logs them and keeps listening so the
//! sender can push a corrected image without a power cycle.

use crate::buffers::NetbootBuffers;
use crate::classify::{self, PayloadKind};
use crate::errors::FirmwareStatus;
use crate::logger::{log_info, log_warn};
use core::fmt;

/// Chainload failure, split by which firmware call refused the image.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LaunchError {
    Load(FirmwareStatus),
    Start(FirmwareStatus),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::Load(status) => write!(f, "LoadImage failed ({status})"),
            LaunchError::Start(status) => write!(f, "StartImage failed ({status})"),
        }
    }
}

/// Datagram source for the dispatch loop. `poll` returns the number of
/// payload bytes it accepted into the buffers; zero means nothing usable
/// arrived this round.
pub trait NetbootTransport {
    fn poll(&mut self, bufs: &mut NetbootBuffers) -> usize;
    /// Shut the interface down before handoff.
    fn stop(&mut self);
}

/// Chainloads a standalone firmware image. Returning `Ok` means the image
/// ran and came back; either way the dispatch loop resumes listening.
pub trait ImageLauncher {
    fn chainload(&mut self, image: &[u8]) -> Result<(), LaunchError>;
}

/// Outcome of one dispatch round.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DispatchTick {
    /// Nothing complete yet; keep polling.
    Listening,
    /// A chainloaded image ran and returned control.
    ChainloadReturned,
    /// The firmware refused the chainload image.
    ChainloadFailed,
    /// A kernel payload is complete; leave the loop and hand off.
    HandoffReady,
}

/// One round of the dispatch loop.
pub fn dispatch_tick(
    transport: &mut dyn NetbootTransport,
    launcher: &mut dyn ImageLauncher,
    bufs: &mut NetbootBuffers,
) -> DispatchTick {
    if transport.poll(bufs) == 0 {
        return DispatchTick::Listening;
    }
    if !classify::plausibly_complete(bufs.kernel().len()) {
        return DispatchTick::Listening;
    }
    match classify::classify(bufs.kernel().bytes()) {
        PayloadKind::ChainloadImage => match launcher.chainload(bufs.kernel().bytes()) {
            Ok(()) => {
                log_info("netboot", "chainloaded image returned, resuming");
                DispatchTick::ChainloadReturned
            }
            Err(err) => {
                log_warn("netboot", &alloc::format!("{err}"));
                DispatchTick::ChainloadFailed
            }
        },
        PayloadKind::KernelPayload => DispatchTick::HandoffReady,
    }
}

/// Run the dispatch loop until a kernel payload is ready, then stop the
/// transport. The buffers hold the payload on return.
pub fn run(
    transport: &mut dyn NetbootTransport,
    launcher: &mut dyn ImageLauncher,
    bufs: &mut NetbootBuffers,
) {
    log_info("netboot", "listening for push");
    loop {
        if dispatch_tick(transport, launcher, bufs) == DispatchTick::HandoffReady {
            transport.stop();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::testutil::test_buffers;
    use crate::classify::{MIN_KERNEL_SIZE, SIG_HEAD, SIG_TAIL, SIG_TAIL_OFFSET};
    use crate::errors::FirmwareStatus;
    use alloc::vec;
    use alloc::vec::Vec;

    /// Scripted transport: each entry is the bytes one poll writes into the
    /// kernel buffer at the current end.
    struct Script {
        feeds: Vec<Vec<u8>>,
        next: usize,
        stopped: u32,
    }

    impl Script {
        fn new(feeds: Vec<Vec<u8>>) -> Self {
            Self {
                feeds,
                next: 0,
                stopped: 0,
            }
        }
    }

    impl NetbootTransport for Script {
        fn poll(&mut self, bufs: &mut NetbootBuffers) -> usize {
            if self.next >= self.feeds.len() {
                return 0;
            }
            let chunk = &self.feeds[self.next];
            self.next += 1;
            let k = bufs.buffer_for(crate::buffers::KERNEL_BUFFER).unwrap();
            k.write_at(k.len(), chunk).unwrap()
        }

        fn stop(&mut self) {
            self.stopped += 1;
        }
    }

    struct FakeLauncher {
        fail: bool,
        calls: u32,
    }

    impl ImageLauncher for FakeLauncher {
        fn chainload(&mut self, _image: &[u8]) -> Result<(), LaunchError> {
            self.calls += 1;
            if self.fail {
                Err(LaunchError::Load(FirmwareStatus(1 << (usize::BITS - 1) | 3)))
            } else {
                Ok(())
            }
        }
    }

    fn chainload_image(len: usize) -> Vec<u8> {
        let mut p = vec![0u8; len];
        p[..2].copy_from_slice(&SIG_HEAD);
        p[SIG_TAIL_OFFSET..SIG_TAIL_OFFSET + 2].copy_from_slice(&SIG_TAIL);
        p
    }

    #[test]
    fn partial_transfers_stay_listening() {
        let mut bufs = test_buffers(MIN_KERNEL_SIZE * 4, 64);
        // Four feeds, each well under the completion gate in total.
        let mut t = Script::new(vec![vec![0xAB; 1024]; 4]);
        let mut l = FakeLauncher {
            fail: false,
            calls: 0,
        };
        for _ in 0..4 {
            assert_eq!(
                dispatch_tick(&mut t, &mut l, &mut bufs),
                DispatchTick::Listening
            );
        }
        assert_eq!(l.calls, 0);
        assert_eq!(bufs.kernel().len(), 4096);
    }

    #[test]
    fn failed_chainload_resumes_listening() {
        let mut bufs = test_buffers(MIN_KERNEL_SIZE * 4, 64);
        let image = chainload_image(40_000);
        let mut t = Script::new(vec![image.clone()]);
        let mut l = FakeLauncher {
            fail: true,
            calls: 0,
        };
        assert_eq!(
            dispatch_tick(&mut t, &mut l, &mut bufs),
            DispatchTick::ChainloadFailed
        );
        assert_eq!(l.calls, 1);
        // The refused image stays in the buffer untouched.
        assert_eq!(bufs.kernel().bytes(), &image[..]);
        // Quiet polls keep the loop alive.
        assert_eq!(
            dispatch_tick(&mut t, &mut l, &mut bufs),
            DispatchTick::Listening
        );
    }

    #[test]
    fn returned_chainload_resumes_listening() {
        let mut bufs = test_buffers(MIN_KERNEL_SIZE * 4, 64);
        let mut t = Script::new(vec![chainload_image(40_000)]);
        let mut l = FakeLauncher {
            fail: false,
            calls: 0,
        };
        assert_eq!(
            dispatch_tick(&mut t, &mut l, &mut bufs),
            DispatchTick::ChainloadReturned
        );
        assert_eq!(l.calls, 1);
    }

    #[test]
    fn kernel_payload_ends_the_loop() {
        let mut bufs = test_buffers(MIN_KERNEL_SIZE * 4, 64);
        let mut t = Script::new(vec![vec![0xC3; 40_000]]);
        let mut l = FakeLauncher {
            fail: false,
            calls: 0,
        };
        run(&mut t, &mut l, &mut bufs);
        assert_eq!(l.calls, 0);
        assert_eq!(t.stopped, 1);
        assert_eq!(bufs.kernel().len(), 40_000);
    }
}
