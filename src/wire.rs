//! wire.rs - netboot datagram format and receive-side routing.
//!
//! Each datagram is a 16-byte little-endian header followed by a payload:
//! magic, cookie, command, argument. The cookie is a sender-side sequence
//! number; this receiver does not acknowledge, so it is parsed and ignored.
//! Malformed datagrams are dropped without disturbing the active transfer.

use crate::buffers::NetbootBuffers;
use crate::logger::{log_debug, log_info, log_warn};

/// Protocol magic.
pub const NB_MAGIC: u32 = 0xAA77_4217;
/// Header length in bytes.
pub const HEADER_LEN: usize = 16;

/// Begin a named transfer; payload is the NUL- or length-terminated name.
pub const CMD_SEND_FILE: u32 = 2;
/// Data for the active transfer; argument is the write offset.
pub const CMD_DATA: u32 = 3;
/// Sender believes the transfer set is complete.
pub const CMD_BOOT: u32 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WireError {
    /// Datagram shorter than the header.
    Truncated,
    /// Magic mismatch; not ours.
    BadMagic,
    /// Header parsed but the command is not one we speak.
    UnknownCommand(u32),
    /// SEND_FILE name is empty or not UTF-8.
    BadName,
}

/// A parsed datagram, borrowing the packet.
#[derive(PartialEq, Eq, Debug)]
pub enum Frame<'a> {
    SendFile { name: &'a str },
    Data { offset: usize, payload: &'a [u8] },
    Boot,
}

fn read_u32(packet: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&packet[at..at + 4]);
    u32::from_le_bytes(raw)
}

/// Parse one datagram. Bounds are checked before any field read.
pub fn parse_frame(packet: &[u8]) -> Result<Frame<'_>, WireError> {
    if packet.len() < HEADER_LEN {
        return Err(WireError::Truncated);
    }
    if read_u32(packet, 0) != NB_MAGIC {
        return Err(WireError::BadMagic);
    }
    let cmd = read_u32(packet, 8);
    let arg = read_u32(packet, 12);
    let payload = &packet[HEADER_LEN..];
    match cmd {
        CMD_SEND_FILE => {
            // Name runs to the first NUL or to the end of the payload.
            let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
            let name = core::str::from_utf8(&payload[..end]).map_err(|_| WireError::BadName)?;
            if name.is_empty() {
                return Err(WireError::BadName);
            }
            Ok(Frame::SendFile { name })
        }
        CMD_DATA => Ok(Frame::Data {
            offset: arg as usize,
            payload,
        }),
        CMD_BOOT => Ok(Frame::Boot),
        other => Err(WireError::UnknownCommand(other)),
    }
}

/// Receive-side state: at most one transfer is active at a time. A
/// SEND_FILE naming an unknown buffer deactivates the session so the
/// following DATA stream is discarded rather than misrouted.
pub struct Receiver {
    active: Option<&'static str>,
}

impl Receiver {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// The buffer the current DATA stream targets, if any.
    pub fn active(&self) -> Option<&'static str> {
        self.active
    }

    /// Route one datagram into the buffers. Returns the number of payload
    /// bytes accepted; drops (and logs) everything malformed or unroutable.
    pub fn handle(&mut self, packet: &[u8], bufs: &mut NetbootBuffers) -> usize {
        let frame = match parse_frame(packet) {
            Ok(frame) => frame,
            Err(WireError::BadMagic) | Err(WireError::Truncated) => return 0,
            Err(err) => {
                log_debug("netboot", &alloc::format!("dropped datagram: {err:?}"));
                return 0;
            }
        };
        match frame {
            Frame::SendFile { name } => {
                match bufs.buffer_for(name) {
                    Some(buf) => {
                        log_info("netboot", &alloc::format!("receiving {}", buf.name()));
                        buf.reset();
                        self.active = Some(buf.name());
                    }
                    None => {
                        log_debug("netboot", &alloc::format!("ignoring transfer: {name}"));
                        self.active = None;
                    }
                }
                0
            }
            Frame::Data { offset, payload } => {
                let Some(name) = self.active else { return 0 };
                let Some(buf) = bufs.buffer_for(name) else {
                    return 0;
                };
                match buf.write_at(offset, payload) {
                    Ok(n) => n,
                    Err(err) => {
                        log_warn("netboot", &alloc::format!("{name}: {err}"));
                        0
                    }
                }
            }
            // The dispatch loop decides completion from the kernel buffer
            // itself; BOOT is informational.
            Frame::Boot => {
                log_debug("netboot", "sender signalled boot");
                0
            }
        }
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::testutil::test_buffers;
    use crate::buffers::KERNEL_BUFFER;
    use alloc::vec::Vec;

    fn datagram(cmd: u32, arg: u32, payload: &[u8]) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&NB_MAGIC.to_le_bytes());
        p.extend_from_slice(&7u32.to_le_bytes()); // cookie, ignored
        p.extend_from_slice(&cmd.to_le_bytes());
        p.extend_from_slice(&arg.to_le_bytes());
        p.extend_from_slice(payload);
        p
    }

    #[test]
    fn parse_rejects_junk() {
        assert_eq!(parse_frame(&[0; 4]), Err(WireError::Truncated));
        let mut bad = datagram(CMD_BOOT, 0, &[]);
        bad[0] ^= 0xFF;
        assert_eq!(parse_frame(&bad), Err(WireError::BadMagic));
        assert_eq!(
            parse_frame(&datagram(99, 0, &[])),
            Err(WireError::UnknownCommand(99))
        );
        assert_eq!(
            parse_frame(&datagram(CMD_SEND_FILE, 0, &[])),
            Err(WireError::BadName)
        );
    }

    #[test]
    fn parse_send_file_stops_at_nul() {
        let dgram = datagram(CMD_SEND_FILE, 0, b"kernel.bin\0junk");
        let frame = parse_frame(&dgram).unwrap();
        assert_eq!(frame, Frame::SendFile { name: "kernel.bin" });
    }

    #[test]
    fn data_routes_into_active_buffer() {
        let mut bufs = test_buffers(1024, 1024);
        let mut rx = Receiver::new();
        rx.handle(&datagram(CMD_SEND_FILE, 0, b"kernel.bin"), &mut bufs);
        assert_eq!(rx.active(), Some(KERNEL_BUFFER));
        assert_eq!(rx.handle(&datagram(CMD_DATA, 0, &[1, 2, 3]), &mut bufs), 3);
        assert_eq!(rx.handle(&datagram(CMD_DATA, 3, &[4, 5]), &mut bufs), 2);
        assert_eq!(bufs.kernel().bytes(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn unknown_name_discards_following_data() {
        let mut bufs = test_buffers(1024, 1024);
        let mut rx = Receiver::new();
        rx.handle(&datagram(CMD_SEND_FILE, 0, b"kernel.bin"), &mut bufs);
        rx.handle(&datagram(CMD_DATA, 0, &[1, 2]), &mut bufs);
        rx.handle(&datagram(CMD_SEND_FILE, 0, b"other.bin"), &mut bufs);
        assert_eq!(rx.active(), None);
        assert_eq!(rx.handle(&datagram(CMD_DATA, 0, &[9; 64]), &mut bufs), 0);
        // The earlier kernel bytes are untouched.
        assert_eq!(bufs.kernel().bytes(), &[1, 2]);
    }

    #[test]
    fn send_file_restarts_the_transfer() {
        let mut bufs = test_buffers(1024, 1024);
        let mut rx = Receiver::new();
        rx.handle(&datagram(CMD_SEND_FILE, 0, b"kernel.bin"), &mut bufs);
        rx.handle(&datagram(CMD_DATA, 0, &[1; 100]), &mut bufs);
        rx.handle(&datagram(CMD_SEND_FILE, 0, b"kernel.bin"), &mut bufs);
        assert_eq!(bufs.kernel().len(), 0);
    }

    #[test]
    fn out_of_range_data_is_dropped() {
        let mut bufs = test_buffers(16, 16);
        let mut rx = Receiver::new();
        rx.handle(&datagram(CMD_SEND_FILE, 0, b"kernel.bin"), &mut bufs);
        assert_eq!(rx.handle(&datagram(CMD_DATA, 12, &[0; 8]), &mut bufs), 0);
        assert_eq!(bufs.kernel().len(), 0);
    }
}
