//! errors.rs - boot failure taxonomy + symbolic firmware status names.
//!
//! Every user-visible failure prints the firmware status by its symbolic
//! name, never as a bare number; the table below mirrors the EFI status
//! code space so messages stay readable on a machine with no debugger
//! attached.

use core::fmt;

/// High bit of the status word marks an error code.
const ERROR_BIT: usize = 1 << (usize::BITS - 1);

/// Symbolic names for the EFI error code space, indexed by the code with the
/// error bit stripped. Index 0 is SUCCESS.
const STATUS_NAMES: [&str; 34] = [
    "SUCCESS",
    "LOAD_ERROR",
    "INVALID_PARAMETER",
    "UNSUPPORTED",
    "BAD_BUFFER_SIZE",
    "BUFFER_TOO_SMALL",
    "NOT_READY",
    "DEVICE_ERROR",
    "WRITE_PROTECTED",
    "OUT_OF_RESOURCES",
    "VOLUME_CORRUPTED",
    "VOLUME_FULL",
    "NO_MEDIA",
    "MEDIA_CHANGED",
    "NOT_FOUND",
    "ACCESS_DENIED",
    "NO_RESPONSE",
    "NO_MAPPING",
    "TIMEOUT",
    "NOT_STARTED",
    "ALREADY_STARTED",
    "ABORTED",
    "ICMP_ERROR",
    "TFTP_ERROR",
    "PROTOCOL_ERROR",
    "INCOMPATIBLE_VERSION",
    "SECURITY_VIOLATION",
    "CRC_ERROR",
    "END_OF_MEDIA",
    "ERROR_29",
    "ERROR_30",
    "END_OF_FILE",
    "INVALID_LANGUAGE",
    "COMPROMISED_DATA",
];

/// Raw firmware status word, carried across the portable/firmware seam so
/// core code can log failures without depending on firmware bindings.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FirmwareStatus(pub usize);

impl FirmwareStatus {
    pub const SUCCESS: FirmwareStatus = FirmwareStatus(0);

    pub fn is_error(self) -> bool {
        self.0 & ERROR_BIT != 0
    }

    /// Symbolic name, or a stable fallback for codes outside the table.
    pub fn name(self) -> &'static str {
        let idx = self.0 & !ERROR_BIT;
        if self.0 != 0 && !self.is_error() {
            return "WARNING";
        }
        match STATUS_NAMES.get(idx) {
            Some(name) => name,
            None => "UNKNOWN_STATUS",
        }
    }
}

impl fmt::Display for FirmwareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fatal-path boot errors. Transient transfer errors (a malformed chainload
/// attempt) never reach this type; the dispatch loop logs them and keeps
/// listening.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BootError {
    /// A transfer buffer could not be allocated; names the buffer.
    /// Fatal to the netboot session, recoverable by local fallback.
    ResourceExhausted(&'static str),
    /// No local kernel and no network: nothing to arbitrate.
    NoBootSource,
    /// The kernel image is unreadable or empty.
    InvalidMedia,
    /// An underlying firmware call failed; `op` names the call site.
    Firmware {
        op: &'static str,
        status: FirmwareStatus,
    },
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::ResourceExhausted(which) => {
                write!(f, "out of memory allocating {which} buffer")
            }
            BootError::NoBootSource => f.write_str("no local kernel and no network"),
            BootError::InvalidMedia => f.write_str("kernel image unreadable or empty"),
            BootError::Firmware { op, status } => write!(f, "{op} failed ({status})"),
        }
    }
}
