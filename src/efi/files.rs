//! files.rs - reads from the volume this loader was started from.

use crate::logger::{log_debug, log_info};
use alloc::vec;
use alloc::vec::Vec;
use uefi::boot;
use uefi::proto::loaded_image::LoadedImage;
use uefi::proto::media::file::{File, FileAttribute, FileInfo, FileMode};
use uefi::proto::media::fs::SimpleFileSystem;
use uefi::CStr16;

/// Read a file from the root of the boot volume. `None` covers both "no
/// such file" and "no filesystem at all"; callers treat the file as simply
/// not present.
pub fn load_file(name: &CStr16) -> Option<Vec<u8>> {
    let image = boot::open_protocol_exclusive::<LoadedImage>(boot::image_handle()).ok()?;
    let device = image.device()?;
    drop(image);

    let mut fs = boot::open_protocol_exclusive::<SimpleFileSystem>(device).ok()?;
    let mut root = fs.open_volume().ok()?;
    let handle = match root.open(name, FileMode::Read, FileAttribute::empty()) {
        Ok(handle) => handle,
        Err(err) => {
            log_debug("fs", &alloc::format!("open failed: {:?}", err.status()));
            return None;
        }
    };
    let mut file = handle.into_regular_file()?;

    let info = file.get_boxed_info::<FileInfo>().ok()?;
    let size = info.file_size() as usize;
    let mut data = vec![0u8; size];
    let read = file.read(&mut data).ok()?;
    data.truncate(read);
    log_info("fs", &alloc::format!("loaded {read} bytes from disk"));
    Some(data)
}

/// True when the boot volume carries a file of this name, without reading
/// the content. Used for the availability probe.
pub fn file_present(name: &CStr16) -> bool {
    let Ok(image) = boot::open_protocol_exclusive::<LoadedImage>(boot::image_handle()) else {
        return false;
    };
    let Some(device) = image.device() else {
        return false;
    };
    drop(image);
    let Ok(mut fs) = boot::open_protocol_exclusive::<SimpleFileSystem>(device) else {
        return false;
    };
    let Ok(mut root) = fs.open_volume() else {
        return false;
    };
    root.open(name, FileMode::Read, FileAttribute::empty())
        .is_ok()
}
