//! gfx.rs - graphics mode selection and the splash fill.
//!
//! The kernel inherits whatever mode is active at handoff, so the mode is
//! applied right before the jump. `bootloader.fbres=WxH` on the command
//! line picks the mode; without it, or when no mode matches, the current
//! mode stands.

use crate::cmdline;
use crate::logger::{log_info, log_warn};
use uefi::boot;
use uefi::proto::console::gop::{BltOp, BltPixel, GraphicsOutput};

/// Apply `bootloader.fbres` from the command line, if present and matched
/// by the adapter. A miss is reported and left on screen for a beat so it
/// is readable before the kernel scrolls it away.
pub fn apply_cmdline_mode(cmdline_text: &str) {
    let Some(value) = cmdline::get(cmdline_text, "bootloader.fbres") else {
        return;
    };
    let Some((want_w, want_h)) = cmdline::parse_resolution(value) else {
        log_warn("gfx", &alloc::format!("bad bootloader.fbres: {value}"));
        return;
    };

    let Ok(handle) = boot::get_handle_for_protocol::<GraphicsOutput>() else {
        return;
    };
    let Ok(mut gop) = boot::open_protocol_exclusive::<GraphicsOutput>(handle) else {
        return;
    };

    let wanted = gop
        .modes()
        .find(|mode| mode.info().resolution() == (want_w as usize, want_h as usize));
    match wanted {
        Some(mode) => {
            if gop.set_mode(&mode).is_ok() {
                log_info("gfx", &alloc::format!("mode set to {want_w}x{want_h}"));
                boot::stall(1_000);
                // Whatever was on screen predates the mode switch.
                super::console::clear();
            }
        }
        None => {
            log_warn("gfx", &alloc::format!("no {want_w}x{want_h} mode"));
            boot::stall(5_000_000);
        }
    }
}

/// Fill the framebuffer with the splash background. Ignored when there is
/// no graphics adapter; the text banner already went out.
pub fn draw_splash() {
    let Ok(handle) = boot::get_handle_for_protocol::<GraphicsOutput>() else {
        return;
    };
    let Ok(mut gop) = boot::open_protocol_exclusive::<GraphicsOutput>(handle) else {
        return;
    };
    let (width, height) = gop.current_mode_info().resolution();

    let _ = gop.blt(BltOp::VideoFill {
        color: BltPixel::new(0, 0, 0),
        dest: (0, 0),
        dims: (width, height),
    });
    // Accent bar along the top edge.
    let _ = gop.blt(BltOp::VideoFill {
        color: BltPixel::new(0, 180, 200),
        dest: (0, 0),
        dims: (width, 4),
    });
}
