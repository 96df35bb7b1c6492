use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::StdRng, Rng, SeedableRng};

pub const ACCOUNT_ID_LEN: usize = 30;
pub const ACCOUNT_ID_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789~!@#$%^&*";

static CALLS: AtomicU64 = AtomicU64::new(0);

/// Generates a 30-character account id from a clock-seeded PRNG.
///
/// Not cryptographically secure. The per-process call counter is folded into
/// the seed so two calls inside one clock tick still produce different ids.
/// Uniqueness is ultimately enforced by the accounts primary key.
pub fn generate_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let call = CALLS.fetch_add(1, Ordering::Relaxed);
    let mut rng = StdRng::seed_from_u64(nanos ^ call.wrapping_mul(0x9E37_79B9_7F4A_7C15));

    (0..ACCOUNT_ID_LEN)
        .map(|_| ACCOUNT_ID_CHARSET[rng.gen_range(0..ACCOUNT_ID_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_have_fixed_length_and_charset() {
        let id = generate_id();
        assert_eq!(id.len(), ACCOUNT_ID_LEN);
        assert!(id.bytes().all(|b| ACCOUNT_ID_CHARSET.contains(&b)));
    }

    #[test]
    fn thousands_of_ids_are_unique() {
        let ids: HashSet<String> = (0..5_000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 5_000);
        assert!(ids
            .iter()
            .all(|id| id.len() == ACCOUNT_ID_LEN
                && id.bytes().all(|b| ACCOUNT_ID_CHARSET.contains(&b))));
    }
}
