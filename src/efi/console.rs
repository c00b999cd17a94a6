//! console.rs - text console output and the terminal fail path.

use uefi::proto::console::text::Color;
use uefi::{boot, system, CStr16};

/// Write a UTF-8 string to the firmware console. Long strings are chunked
/// to fit the UCS-2 conversion buffer.
pub fn print(s: &str) {
    system::with_stdout(|out| {
        let mut utf16 = [0u16; 256];
        let mut rest = s;
        while !rest.is_empty() {
            // Split on char boundaries so the UCS-2 buffer always fits.
            let take = rest
                .char_indices()
                .take(120)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(rest.len());
            let (part, tail) = rest.split_at(take);
            if let Ok(c) = CStr16::from_str_with_buf(part, &mut utf16) {
                let _ = out.output_string(c);
            }
            rest = tail;
        }
    });
}

pub fn print_line(s: &str) {
    print(s);
    print("\r\n");
}

pub fn clear() {
    system::with_stdout(|out| {
        let _ = out.clear();
    });
}

/// The boot splash.
pub fn banner() {
    system::with_stdout(|out| {
        let _ = out.set_color(Color::LightCyan, Color::Black);
    });
    print("\r\n");
    print("  ╔══════════════════════════════════════════════════╗\r\n");
    print("  ║          NØNOS NETBOOT :: STAGE-0 LOADER          ║\r\n");
    print("  ║      network push / local kernel arbitration      ║\r\n");
    print("  ╚══════════════════════════════════════════════════╝\r\n");
    print("\r\n");
    system::with_stdout(|out| {
        let _ = out.set_color(Color::White, Color::Black);
    });
}

/// Structured red failure block, shown right before the machine halts at
/// the any-key wait.
pub fn display_failure(msg: &str) {
    system::with_stdout(|out| {
        let _ = out.set_color(Color::Red, Color::Black);
    });
    print("\r\n──────────────── BOOT FAILURE ────────────────\r\n");
    print("[!] ");
    print(msg);
    print("\r\n──────────────────────────────────────────────\r\n");
    system::with_stdout(|out| {
        let _ = out.set_color(Color::White, Color::Black);
    });
}

/// Park until any key arrives. The machine is not coming up; leave the
/// failure block on screen for whoever is at the console.
pub fn wait_any_key() {
    print_line("press any key...");
    loop {
        let pressed = system::with_stdin(|input| matches!(input.read_key(), Ok(Some(_))));
        if pressed {
            return;
        }
        boot::stall(10_000);
    }
}
