/// A byte range `[start, end)` into a document rope.
///
/// Blocks store spans rather than copied text, so slicing the rope with any
/// span reproduces the exact source and a replacement touches only its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Byte range form, for slicing `&str` and `Rope`.
    pub fn range(self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}
