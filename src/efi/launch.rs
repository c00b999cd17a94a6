//! launch.rs - image chainload and the final kernel handoff.
//!
//! Chainload goes through the firmware's own loader so a pushed bootloader
//! or diagnostic image runs with full boot services. The kernel handoff is
//! the opposite: boot services end and control jumps to the payload with
//! the staged descriptor's address in the entry register.

use crate::errors::{BootError, FirmwareStatus};
use crate::handoff::{BootFlags, BootInfo, HandoffPackage};
use crate::logger::log_info;
use crate::netboot::{ImageLauncher, LaunchError};
use uefi::boot::{self, LoadImageSource, MemoryType};

pub struct EfiLauncher;

impl ImageLauncher for EfiLauncher {
    fn chainload(&mut self, image: &[u8]) -> Result<(), LaunchError> {
        let handle = boot::load_image(
            boot::image_handle(),
            LoadImageSource::FromBuffer {
                buffer: image,
                file_path: None,
            },
        )
        .map_err(|err| LaunchError::Load(FirmwareStatus(err.status().0)))?;
        boot::start_image(handle)
            .map_err(|err| LaunchError::Start(FirmwareStatus(err.status().0)))?;
        Ok(())
    }
}

/// Stage the descriptor, leave boot services and jump. Returns only when a
/// pre-flight step fails; past `exit_boot_services` there is no coming
/// back.
pub fn boot_kernel(pkg: &HandoffPackage<'_>, flags: BootFlags) -> BootError {
    if let Err(err) = pkg.validate() {
        return err;
    }
    let info = pkg.to_boot_info(flags);

    let staged = match boot::allocate_pool(MemoryType::LOADER_DATA, core::mem::size_of::<BootInfo>())
    {
        Ok(ptr) => ptr.cast::<BootInfo>(),
        Err(err) => {
            return BootError::Firmware {
                op: "AllocatePool",
                status: FirmwareStatus(err.status().0),
            }
        }
    };
    unsafe { staged.as_ptr().write(info) };

    let entry = pkg.kernel.as_ptr() as u64;
    let descriptor = staged.as_ptr() as u64;
    log_info(
        "handoff",
        &alloc::format!("entering kernel ({} bytes)", pkg.kernel.len()),
    );

    // No logging past this point; the console is gone with boot services.
    unsafe {
        let _map = boot::exit_boot_services(None);
        enter_kernel(entry, descriptor)
    }
}

#[cfg(target_arch = "x86_64")]
unsafe fn enter_kernel(entry: u64, descriptor: u64) -> ! {
    unsafe {
        core::arch::asm!(
            "mov rdi, {descriptor}",
            "jmp {entry}",
            descriptor = in(reg) descriptor,
            entry = in(reg) entry,
            options(noreturn),
        );
    }
}

#[cfg(target_arch = "aarch64")]
unsafe fn enter_kernel(entry: u64, descriptor: u64) -> ! {
    unsafe {
        let kmain: extern "C" fn(u64) -> ! = core::mem::transmute(entry as usize);
        kmain(descriptor)
    }
}
