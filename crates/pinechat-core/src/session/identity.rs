//! Session and message identifiers.

use chrono::Utc;
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Generates a session token of the form `chat_<unix-millis>_<suffix>`.
///
/// The suffix is nine base-36 characters, so two sessions created in the
/// same millisecond still differ with overwhelming probability.
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("chat_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Allocates message identifiers that follow the wall clock but never repeat.
///
/// Each id is `max(now_ms, previous + 1)`, so ids stay roughly time-ordered
/// while two messages created in the same millisecond still get distinct,
/// increasing values.
#[derive(Debug, Default)]
pub struct MessageIdAllocator {
    last: Option<i64>,
}

impl MessageIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> i64 {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    fn next_id_at(&mut self, now_ms: i64) -> i64 {
        let id = match self.last {
            Some(last) if last >= now_ms => last + 1,
            _ => now_ms,
        };
        self.last = Some(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "chat");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_session_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }

    #[test]
    fn test_allocator_never_repeats_within_same_millisecond() {
        let mut alloc = MessageIdAllocator::new();
        let a = alloc.next_id_at(1_000);
        let b = alloc.next_id_at(1_000);
        let c = alloc.next_id_at(1_000);
        assert_eq!((a, b, c), (1_000, 1_001, 1_002));
    }

    #[test]
    fn test_allocator_follows_clock_when_it_moves_ahead() {
        let mut alloc = MessageIdAllocator::new();
        alloc.next_id_at(1_000);
        alloc.next_id_at(1_000);
        assert_eq!(alloc.next_id_at(5_000), 5_000);
    }

    #[test]
    fn test_allocator_ignores_clock_going_backwards() {
        let mut alloc = MessageIdAllocator::new();
        alloc.next_id_at(5_000);
        assert_eq!(alloc.next_id_at(4_000), 5_001);
    }
}
