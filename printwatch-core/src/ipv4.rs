//! Dotted-quad IPv4 syntax checks.

/// Four dot-separated decimal segments of 1 to 3 digits, each 0..=255.
/// Surrounding whitespace is tolerated, nothing else is.
pub fn is_valid_ipv4(candidate: &str) -> bool {
    let segments: Vec<&str> = candidate.trim().split('.').collect();
    if segments.len() != 4 {
        return false;
    }
    segments.iter().all(|seg| {
        !seg.is_empty()
            && seg.len() <= 3
            && seg.bytes().all(|b| b.is_ascii_digit())
            && seg.parse::<u16>().map(|v| v <= 255).unwrap_or(false)
    })
}

/// Numeric octets of a four-segment address, for ordering.
///
/// Unlike [`is_valid_ipv4`] the values are not range checked: `300.1.1.1`
/// still sorts numerically.
pub fn octets(ip: &str) -> Option<[u32; 4]> {
    let mut out = [0u32; 4];
    let mut parts = ip.trim().split('.');
    for slot in out.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
