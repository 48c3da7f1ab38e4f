//! Unique record identifiers.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use uuid::Builder;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a collision-resistant identifier.
///
/// Normally a UUID v4 drawn from the OS random source. If that source is
/// unavailable the id is `"{prefix}_{random}{time}"` in base 36.
pub fn generate_id(prefix: &str) -> String {
    let mut bytes = [0u8; 16];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes).into_uuid().to_string(),
        Err(e) => {
            debug!("OS randomness unavailable ({}), using fallback id", e);
            fallback_id(prefix)
        }
    }
}

pub(crate) fn fallback_id(prefix: &str) -> String {
    let now = chrono::Utc::now();
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);

    // RandomState is seeded per instance, which is enough to spread ids
    // generated in the same millisecond.
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u64(count);
    hasher.write_i64(now.timestamp_nanos_opt().unwrap_or_default());
    let random = hasher.finish();

    format!(
        "{}_{}{}",
        prefix,
        to_base36(random),
        to_base36(now.timestamp_millis().max(0) as u64)
    )
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_is_uuid() {
        let id = generate_id("fav");
        assert_eq!(id.len(), 36);
        let parsed = uuid::Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_generate_id_unique() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id("hist")).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_fallback_id_shape_and_uniqueness() {
        let ids: HashSet<String> = (0..500).map(|_| fallback_id("fav")).collect();
        assert_eq!(ids.len(), 500);
        for id in &ids {
            assert!(id.starts_with("fav_"));
            assert!(id[4..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "zz");
    }
}
