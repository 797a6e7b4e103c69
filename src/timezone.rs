use std::env;
use std::path::Path;

/// Fallback time-zone hint.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

const ZONEINFO_MARKER: &str = "zoneinfo/";

/// Resolve the IANA time-zone name sent as the request's location hint.
///
/// Order: explicit override, `TZ`, the `/etc/localtime` link target, `UTC`.
pub fn resolve_time_zone(override_zone: Option<&str>) -> String {
    if let Some(zone) = override_zone.and_then(clean_zone) {
        return zone;
    }

    if let Some(zone) = env::var("TZ").ok().as_deref().and_then(clean_zone) {
        return zone;
    }

    if let Some(zone) = zone_from_localtime_link(Path::new("/etc/localtime")) {
        return zone;
    }

    DEFAULT_TIME_ZONE.to_string()
}

/// `TZ` values may carry a leading `:`; absolute paths into zoneinfo are
/// reduced to the zone name.
fn clean_zone(value: &str) -> Option<String> {
    let value = value.trim().trim_start_matches(':');
    if value.is_empty() {
        return None;
    }

    match value.rfind(ZONEINFO_MARKER) {
        Some(index) => Some(value[index + ZONEINFO_MARKER.len()..].to_string())
            .filter(|zone| !zone.is_empty()),
        None if value.starts_with('/') => None,
        None => Some(value.to_string()),
    }
}

fn zone_from_localtime_link(path: &Path) -> Option<String> {
    let target = std::fs::read_link(path).ok()?;
    let target = target.to_string_lossy();
    let index = target.rfind(ZONEINFO_MARKER)?;
    clean_zone(&target[index..])
}
