use std::fmt;

/// Named edge endpoint in a filter graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pad(String);

impl Pad {
    /// Wrap an externally meaningful label such as `0:v`.
    pub fn named(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Raw label without brackets.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Issues unique pad labels for one graph-construction session.
///
/// Labels are `p0`, `p1`, ... in allocation order. Each session owns its allocator, so
/// concurrent constructions never share a counter.
#[derive(Debug, Default)]
pub struct PadAllocator {
    next: u32,
}

impl PadAllocator {
    /// Create an allocator starting at `p0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh pad.
    pub fn next_pad(&mut self) -> Pad {
        let pad = Pad(format!("p{}", self.next));
        self.next += 1;
        pad
    }

    /// Number of pads handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/pad.rs"]
mod tests;
