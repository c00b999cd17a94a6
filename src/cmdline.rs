//! cmdline.rs - key=value lookups in a boot command line.
//!
//! The command line is a flat space-separated list of `key=value` items.
//! First match wins; bare words (no `=`) are legal and ignored by lookup.

/// Find the value of `key` in a space-separated `key=value` command line.
pub fn get<'a>(cmdline: &'a str, key: &str) -> Option<&'a str> {
    cmdline.split_whitespace().find_map(|item| {
        let (k, v) = item.split_once('=')?;
        (k == key).then_some(v)
    })
}

/// Numeric lookup with a fallback for a missing or malformed value.
pub fn get_u32(cmdline: &str, key: &str, default: u32) -> u32 {
    match get(cmdline, key) {
        Some(v) => v.parse().unwrap_or(default),
        None => default,
    }
}

/// Parse a `WIDTHxHEIGHT` resolution string.
pub fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_first_match() {
        let cl = "console=tty0 bootloader.timeout=5 quiet bootloader.timeout=9";
        assert_eq!(get(cl, "console"), Some("tty0"));
        assert_eq!(get(cl, "bootloader.timeout"), Some("5"));
        assert_eq!(get(cl, "quiet"), None);
        assert_eq!(get(cl, "missing"), None);
    }

    #[test]
    fn numeric_lookup_falls_back() {
        assert_eq!(get_u32("bootloader.timeout=7", "bootloader.timeout", 3), 7);
        assert_eq!(get_u32("bootloader.timeout=x", "bootloader.timeout", 3), 3);
        assert_eq!(get_u32("", "bootloader.timeout", 3), 3);
    }

    #[test]
    fn resolution_parse() {
        assert_eq!(parse_resolution("1024x768"), Some((1024, 768)));
        assert_eq!(parse_resolution("1024"), None);
        assert_eq!(parse_resolution("wxh"), None);
    }
}
