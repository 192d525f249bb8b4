//! Atomic script descriptors shared by the allocators and store backends.

use std::fmt;

/// Reply of the sequential script when the counter has passed the range.
pub const EXHAUSTED_REPLY: &str = "EXHAUSTED";

/// The named atomic operations a coordination store must support.
///
/// Scripting backends execute [`AtomicScript::body`]; backends without
/// server-side scripting dispatch on the kind instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// Initialise a counter to a starting value or increment it.
    CounterGetOrInit,
    /// Pop a released id and mark it used, or mark a candidate id used.
    ReuseTakeOrMark,
    /// Remove an id from the used set and push it onto the bounded queue.
    ReleaseAndEnqueue,
    /// Reuse a released id or advance a bounded counter.
    SequentialGet,
}

impl ScriptKind {
    /// Stable name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::CounterGetOrInit => "counter_get_or_init",
            Self::ReuseTakeOrMark => "reuse_take_or_mark",
            Self::ReleaseAndEnqueue => "release_and_enqueue",
            Self::SequentialGet => "sequential_get",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A server-side script together with the operation it implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomicScript {
    /// Which operation this script performs.
    pub kind: ScriptKind,
    /// Lua source.
    pub body: &'static str,
}

impl AtomicScript {
    /// Describe a script.
    pub const fn new(kind: ScriptKind, body: &'static str) -> Self {
        Self { kind, body }
    }
}

/// Opaque handle returned by the store when a script is registered.
///
/// For Redis this is the SHA1 digest of the script body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptHandle(String);

impl ScriptHandle {
    /// Wrap a handle string returned by the store.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The raw handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
