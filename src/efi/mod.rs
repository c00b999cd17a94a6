//! Firmware-facing half of the loader. Everything here talks to UEFI boot
//! services through the `uefi` crate and adapts the firmware to the
//! portable provider traits.

pub mod app;
pub mod console;
pub mod files;
pub mod gfx;
pub mod launch;
pub mod memory;
pub mod netsvc;
pub mod prompt;
