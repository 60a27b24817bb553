//! Debug assertion macros for ring cursor invariants.
//!
//! These macros check the cursor bookkeeping documented on [`Ring`](crate::Ring).
//! They are only active in debug builds (`#[cfg(debug_assertions)]`), so there is
//! zero overhead in release builds.

// =============================================================================
// Cursor Range
// =============================================================================

/// Assert that a cursor stays inside the storage.
///
/// **Invariant**: `0 ≤ cursor < capacity`
///
/// Used in: `enqueue()` after every chunk, for both `head` and `tail`
macro_rules! debug_assert_cursor_in_range {
    ($name:literal, $cursor:expr, $capacity:expr) => {
        debug_assert!(
            $cursor < $capacity,
            "cursor invariant violated: {} = {} outside [0, {})",
            $name,
            $cursor,
            $capacity
        )
    };
}

/// Assert that a chunk copy stays inside the storage.
///
/// **Invariant**: `tail + chunk ≤ capacity`
///
/// Used in: `enqueue()` before copying a chunk
macro_rules! debug_assert_chunk_fits {
    ($tail:expr, $chunk:expr, $capacity:expr) => {
        debug_assert!(
            $tail + $chunk <= $capacity,
            "chunk invariant violated: tail {} + chunk {} exceeds capacity {}",
            $tail,
            $chunk,
            $capacity
        )
    };
}

// =============================================================================
// Full Flag
// =============================================================================

/// Assert the cursor convention tied to the full flag.
///
/// **Invariant**: `full ⟹ head == tail` and `¬full ⟹ head == 0`
///
/// The second half holds because `head` only moves once the ring has wrapped.
///
/// Used in: `enqueue()` after every chunk, `dump()` on entry
macro_rules! debug_assert_full_convention {
    ($full:expr, $head:expr, $tail:expr) => {
        debug_assert!(
            if $full { $head == $tail } else { $head == 0 },
            "full-flag invariant violated: full = {}, head = {}, tail = {}",
            $full,
            $head,
            $tail
        )
    };
}

// =============================================================================
// Bounded Dump
// =============================================================================

/// Assert that a dump never yields more than one ring's worth of bytes.
///
/// **Invariant**: `dumped ≤ capacity`
///
/// Used in: `dump()` before returning
macro_rules! debug_assert_bounded_dump {
    ($dumped:expr, $capacity:expr) => {
        debug_assert!(
            $dumped <= $capacity,
            "dump invariant violated: {} bytes dumped from a ring of capacity {}",
            $dumped,
            $capacity
        )
    };
}

// =============================================================================
// Read Cycle Watermark
// =============================================================================

/// Assert that the delivery watermark never passes the write counter.
///
/// **Invariant**: `delivered ≤ written`
///
/// Used in: `ReadCycle::read()` after a burst
macro_rules! debug_assert_watermark {
    ($delivered:expr, $written:expr) => {
        debug_assert!(
            $delivered <= $written,
            "watermark invariant violated: delivered {} exceeds written {}",
            $delivered,
            $written
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_dump;
pub(crate) use debug_assert_chunk_fits;
pub(crate) use debug_assert_cursor_in_range;
pub(crate) use debug_assert_full_convention;
pub(crate) use debug_assert_watermark;
