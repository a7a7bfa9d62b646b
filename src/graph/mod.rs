//! Filter-graph model and the helpers that wire it together.

/// Conversion automaton between memory domains.
pub mod convert;
/// Filters, wired stages, and their textual serialization.
pub mod filter;
/// Memory domains frames can live in.
pub mod format;
/// Pad labels and their allocator.
pub mod pad;
/// Pipeline builder and combinator.
pub mod pipeline;
