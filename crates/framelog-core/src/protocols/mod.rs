//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: marker bytes and frame sizes (source of truth)
//! - `reader`: byte pairing and word conventions
//! - `parser`: the byte-level state machine (no direct marker literals)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; sources and the pipeline handle
//! device access and dispatch.

pub mod frame;
