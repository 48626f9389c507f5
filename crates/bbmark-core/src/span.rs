use thiserror::Error;

/// Byte range into the markup a render was given.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(SpanError::Inverted { start, end })
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The covered text, or `""` when the span does not fall on char boundaries of `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SpanError {
    #[error("span start {start} is past its end {end}")]
    Inverted { start: usize, end: usize },
}

#[cfg(test)]
mod tests {
    use super::{Span, SpanError};

    #[test]
    fn inverted_spans_are_rejected() {
        assert_eq!(
            Span::new(4, 2),
            Err(SpanError::Inverted { start: 4, end: 2 })
        );
        let span = Span::new(1, 4).expect("span");
        assert_eq!(span.len(), 3);
        assert_eq!(span.slice("[b]x"), "b]x");
    }

    #[test]
    fn slice_off_boundary_is_empty() {
        let span = Span { start: 1, end: 2 };
        assert_eq!(span.slice("é"), "");
    }
}
