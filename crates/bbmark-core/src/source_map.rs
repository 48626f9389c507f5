use memchr::memchr_iter;

use crate::span::Span;

/// Zero-based line and column. Columns count chars, not bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Maps byte offsets in a piece of markup back to line/column positions for error reports.
#[derive(Clone, Debug)]
pub struct SourceMap<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr_iter(b'\n', source.as_bytes()).map(|idx| idx + 1));
        Self {
            source,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let character = self
            .source
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        Position { line, character }
    }

    pub fn range(&self, span: Span) -> Range {
        Range {
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, SourceMap};
    use crate::span::Span;

    #[test]
    fn positions_are_line_based() {
        let map = SourceMap::new("[b]\nx[/b]\n");

        assert_eq!(map.line_count(), 3);
        assert_eq!(
            map.position(4),
            Position {
                line: 1,
                character: 0
            }
        );
        let range = map.range(Span { start: 5, end: 9 });
        assert_eq!(range.start.character, 1);
        assert_eq!(range.end.line, 1);
    }

    #[test]
    fn columns_count_chars() {
        let map = SourceMap::new("héllo [url]");
        assert_eq!(map.position(7).character, 6);
    }
}
