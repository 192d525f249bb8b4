//! Lua bodies of every allocator script.
//!
//! All scripts reply with a string or nil so a single reply type covers
//! every backend.

use idpool_core::types::{AtomicScript, ScriptKind};

/// Mode argument of [`REUSE_TAKE_OR_MARK`] that pops the released queue.
pub const MODE_TAKE_RELEASED: &str = "take_released";

/// Mode argument of [`REUSE_TAKE_OR_MARK`] that inserts a candidate id.
pub const MODE_MARK_CANDIDATE: &str = "mark_candidate";

/// Initialise the counter to `ARGV[1]` and return it, or increment it.
///
/// KEYS[1] = counter
/// ARGV[1] = initial value
pub const COUNTER_GET_OR_INIT: AtomicScript = AtomicScript::new(
    ScriptKind::CounterGetOrInit,
    r#"
        local counter_key = KEYS[1]
        local initial_str = ARGV[1]

        if tonumber(initial_str) == nil then
            return redis.error_reply("ERR initial value ARGV[1] ('" .. initial_str .. "') is not a number")
        end

        if redis.call('EXISTS', counter_key) == 0 then
            redis.call('SET', counter_key, initial_str)
            return initial_str
        end

        redis.call('INCR', counter_key)
        return redis.call('GET', counter_key)
    "#,
);

/// Pop a released id and mark it used, or mark a candidate id used.
///
/// KEYS[1] = released queue
/// KEYS[2] = used set
/// ARGV[1] = candidate id (mark mode only)
/// ARGV[2] = mode
///
/// Returns the popped id or nil in take mode; "1" (added) or "0" (already
/// used) in mark mode. A newly marked candidate is also removed from the
/// released queue, so no id is ever queued while in use.
pub const REUSE_TAKE_OR_MARK: AtomicScript = AtomicScript::new(
    ScriptKind::ReuseTakeOrMark,
    r#"
        local released_key = KEYS[1]
        local used_key = KEYS[2]
        local candidate = ARGV[1]
        local mode = ARGV[2]

        if mode == 'take_released' then
            local id = redis.call('LPOP', released_key)
            if not id then
                return nil
            end
            redis.call('SADD', used_key, id)
            return id
        elseif mode == 'mark_candidate' then
            if redis.call('SADD', used_key, candidate) == 1 then
                redis.call('LREM', released_key, 0, candidate)
                return '1'
            end
            return '0'
        end

        return redis.error_reply('ERR unknown mode: ' .. tostring(mode))
    "#,
);

/// Remove an id from the used set, move it to the tail of the released
/// queue, and trim the queue to its cap.
///
/// KEYS[1] = used set
/// KEYS[2] = released queue
/// ARGV[1] = id
/// ARGV[2] = queue cap
///
/// Returns "1" if the id was in use, "0" otherwise.
pub const RELEASE_AND_ENQUEUE: AtomicScript = AtomicScript::new(
    ScriptKind::ReleaseAndEnqueue,
    r#"
        local used_key = KEYS[1]
        local released_key = KEYS[2]
        local id = ARGV[1]
        local max_len = tonumber(ARGV[2])

        if max_len == nil or max_len < 1 then
            return redis.error_reply("ERR queue cap ARGV[2] ('" .. tostring(ARGV[2]) .. "') is not a positive number")
        end

        local removed = redis.call('SREM', used_key, id)
        redis.call('LREM', released_key, 0, id)
        redis.call('RPUSH', released_key, id)
        redis.call('LTRIM', released_key, -max_len, -1)
        return tostring(removed)
    "#,
);

/// Reuse a released id, or advance the counter inside `[min, max]`.
///
/// KEYS[1] = released queue
/// KEYS[2] = used set
/// KEYS[3] = counter
/// ARGV[1] = counter seed, one below the min id
/// ARGV[2] = max id
/// ARGV[3] = canonical id width
///
/// Returns the zero-padded id, or "EXHAUSTED" once the counter passes the
/// maximum. The counter is clamped to the maximum in that case. Seed and
/// max are written back verbatim and the id is read with GET, so no value
/// goes through a Lua number on its way into the store.
pub const SEQUENTIAL_GET: AtomicScript = AtomicScript::new(
    ScriptKind::SequentialGet,
    r#"
        local released_key = KEYS[1]
        local used_key = KEYS[2]
        local counter_key = KEYS[3]
        local seed = ARGV[1]
        local max_str = ARGV[2]
        local width = tonumber(ARGV[3])

        local reused = redis.call('LPOP', released_key)
        if reused then
            redis.call('SADD', used_key, reused)
            return reused
        end

        redis.call('SETNX', counter_key, seed)
        local current = redis.call('GET', counter_key)
        if tonumber(current) == nil then
            return redis.error_reply('ERR value is not an integer or out of range')
        end
        if tonumber(current) >= tonumber(max_str) then
            redis.call('SET', counter_key, max_str)
            return 'EXHAUSTED'
        end

        redis.call('INCR', counter_key)
        local digits = redis.call('GET', counter_key)
        local id = string.rep('0', width - #digits) .. digits
        redis.call('SADD', used_key, id)
        return id
    "#,
);
