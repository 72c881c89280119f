//! Source locations attached to AST nodes.
//!
//! The parser never computes line/column itself (§1: "Line/column are
//! derived on demand from offset via the source interface"); it only
//! ever stores byte offsets. [`Span::location_in`] does the on-demand
//! scan when a caller actually wants a human-readable position.

/// A half-open byte range into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// A span carrying no location information, used for synthetic
    /// nodes built outside of a real parse (tests, tree rewrites).
    pub fn none() -> Self {
        Span { start: 0, end: 0 }
    }

    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Scans `source` once to turn this span's start offset into a
    /// 1-based `(line, column)` pair.
    pub fn location_in(&self, source: &str) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for (offset, ch) in source.char_indices() {
            if offset >= self.start {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

/// Wraps a syntax tree payload together with the span of source text
/// it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Node<T> {
    pub fn new(node: T, span: Span) -> Node<T> {
        Node { node, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Node<U> {
        Node {
            node: f(self.node),
            span: self.span,
        }
    }
}

#[cfg(test)]
impl<T> From<T> for Node<T> {
    fn from(t: T) -> Node<T> {
        Node::new(t, Span::none())
    }
}
