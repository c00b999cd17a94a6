//! app.rs - the loader's top-level flow.
//!
//! Probe the boot sources, arbitrate (with the timed prompt when both are
//! live), then run the chosen path. Everything that returns from here is a
//! failure; success leaves through the kernel jump in [`super::launch`].

use super::{console, files, gfx, launch, memory, netsvc};
use crate::cmdline;
use crate::device::{self, BootDevice};
use crate::errors::BootError;
use crate::handoff::{BootFlags, HandoffPackage};
use crate::logger::{log_critical, log_info, log_warn};
use crate::netboot::{self, NetbootTransport};
use crate::prompt;
use alloc::format;
use alloc::vec::Vec;
use uefi::boot::{self, Tpl};
use uefi::proto::network::pxe::BaseCode;
use uefi::{cstr16, CStr16, Status};

const KERNEL_FILE: &CStr16 = cstr16!("kernel.bin");
const RAMDISK_FILE: &CStr16 = cstr16!("ramdisk.bin");
const CMDLINE_FILE: &CStr16 = cstr16!("cmdline");

pub fn run() -> Status {
    if uefi::helpers::init().is_err() {
        return Status::LOAD_ERROR;
    }
    let disk_cmdline_raw = files::load_file(CMDLINE_FILE).unwrap_or_default();
    let disk_cmdline = text_of(&disk_cmdline_raw);

    // The requested mode goes in before anything is drawn, so the banner
    // and prompt already render at the configured resolution. The splash
    // fill precedes the banner text so it does not paint over it.
    gfx::apply_cmdline_mode(disk_cmdline);
    console::clear();
    gfx::draw_splash();
    console::banner();

    let local_present = files::file_present(KERNEL_FILE);
    let network_available = boot::get_handle_for_protocol::<BaseCode>().is_ok();
    log_info(
        "boot",
        &format!("local kernel: {local_present}, network: {network_available}"),
    );

    let timeout = cmdline::get_u32(disk_cmdline, "bootloader.timeout", prompt::DEFAULT_TIMEOUT);

    let choice = device::decide(local_present, network_available, || {
        console::print("boot source: (n)etboot / (m) local kernel ");
        let picked = match super::prompt::ConsoleTimerWait::new() {
            Some(mut events) => prompt::run_prompt(&mut events, timeout),
            None => {
                log_warn("prompt", "could not arm prompt events, defaulting to netboot");
                BootDevice::Netboot
            }
        };
        console::print("\r\n");
        picked
    });

    let err = match choice {
        BootDevice::None => BootError::NoBootSource,
        BootDevice::Local => boot_local(disk_cmdline),
        BootDevice::Netboot => match run_netboot(disk_cmdline) {
            // Out of buffer memory is the one netboot failure a local
            // kernel can still rescue.
            err @ BootError::ResourceExhausted(_) if local_present => {
                log_warn("boot", &format!("{err}, falling back to local kernel"));
                boot_local(disk_cmdline)
            }
            err => err,
        },
    };

    log_critical("boot", &format!("{err}"));
    console::display_failure(&format!("{err}"));
    console::wait_any_key();
    Status::LOAD_ERROR
}

/// Treat file bytes as trimmed text; binary junk degrades to empty.
fn text_of(raw: &[u8]) -> &str {
    core::str::from_utf8(raw)
        .unwrap_or("")
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
}

/// The netboot path. Returns only on failure.
fn run_netboot(disk_cmdline: &str) -> BootError {
    let mut transport = match netsvc::PxeTransport::open() {
        Ok(t) => t,
        Err(err) => return err,
    };
    let mut bufs = match memory::allocate_buffers() {
        Ok(b) => b,
        Err(err) => {
            transport.stop();
            return err;
        }
    };

    console::print_line("netboot: waiting for push...");
    {
        // Shut out firmware callbacks while datagrams are being routed
        // into the buffers.
        let _tpl = unsafe { boot::raise_tpl(Tpl::NOTIFY) };
        netboot::run(&mut transport, &mut launch::EfiLauncher, &mut bufs);
    }

    bufs.cmdline_mut().terminate_text();

    let err = {
        let net_cmdline = text_of(bufs.cmdline().bytes());
        // The push may carry its own mode request; apply it now that the
        // transfer is complete.
        gfx::apply_cmdline_mode(net_cmdline);

        let pkg = HandoffPackage {
            kernel: bufs.kernel().bytes(),
            ramdisk: bufs.ramdisk().bytes(),
            cmdline: net_cmdline.as_bytes(),
            cmdline_extra: disk_cmdline.as_bytes(),
        };
        launch::boot_kernel(&pkg, BootFlags::NETBOOT)
    };

    // Handoff refused the package before leaving boot services; the
    // session is over and the regions go back to the firmware.
    memory::release_buffers(bufs);
    err
}

/// The local path. Returns only on failure.
fn boot_local(disk_cmdline: &str) -> BootError {
    let Some(kernel) = files::load_file(KERNEL_FILE) else {
        return BootError::InvalidMedia;
    };
    let ramdisk: Vec<u8> = files::load_file(RAMDISK_FILE).unwrap_or_default();

    let pkg = HandoffPackage {
        kernel: &kernel,
        ramdisk: &ramdisk,
        cmdline: disk_cmdline.as_bytes(),
        cmdline_extra: &[],
    };
    launch::boot_kernel(&pkg, BootFlags::empty())
}
