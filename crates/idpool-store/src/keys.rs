//! Store key builders for every id pool.
//!
//! Room and sequential pools use disjoint namespaces so a base key can
//! back both kinds of pool without collisions.

/// Namespace of random room id pools.
const ROOM_PREFIX: &str = "room_ids";

/// Namespace of sequential id pools.
const SEQUENTIAL_PREFIX: &str = "seq_room_ids";

// ── Room pools ─────────────────────────────────────────────

/// Set of room ids currently in use.
pub fn room_used(base_key: &str) -> String {
    format!("{ROOM_PREFIX}:used:{base_key}")
}

/// List of recently released room ids.
pub fn room_released(base_key: &str) -> String {
    format!("{ROOM_PREFIX}:released:{base_key}")
}

// ── Sequential pools ───────────────────────────────────────

/// Set of sequential ids currently in use.
pub fn sequential_used(base_key: &str) -> String {
    format!("{SEQUENTIAL_PREFIX}:used:{base_key}")
}

/// List of recently released sequential ids.
pub fn sequential_released(base_key: &str) -> String {
    format!("{SEQUENTIAL_PREFIX}:released:{base_key}")
}

/// Counter of the last sequential id handed out.
pub fn sequential_counter(base_key: &str) -> String {
    format!("{SEQUENTIAL_PREFIX}:counter:{base_key}")
}
