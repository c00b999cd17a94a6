//! NØNOS netboot loader library.
//!
//! Boot-source arbitration and network-boot dispatch for the UEFI stage-0
//! loader. The firmware-facing half lives under [`efi`] and only builds for
//! UEFI targets; everything else is portable so the decision logic, the
//! prompt loop, the transfer buffers and the dispatch state machine can be
//! exercised on a host with fake providers.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod buffers;
pub mod classify;
pub mod cmdline;
pub mod device;
pub mod errors;
pub mod handoff;
pub mod logger;
pub mod netboot;
pub mod prompt;
pub mod wire;

#[cfg(target_os = "uefi")]
pub mod efi;
