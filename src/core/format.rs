//! The output template mini-language.
//!
//! A template is plain text with `@<code>` placeholders, where `<code>` is one character naming a
//! rendering rule. `@^<code>` right-aligns the column instead of left-aligning it and `@@` is a
//! literal `@`. A dangling `@` or `@^` at the end of the template is kept literally.
//!
//! Templates are parsed once into [Node]s. Every entry renders each distinct code once into a
//! [Segment]; [FormatSpec::expand] then pads the segments to the batch-wide [ColumnWidths].

use std::collections::HashMap;

/// One rendered placeholder: the colored text and its visible width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub width: usize,
}

impl Segment {
    pub fn new(text: String, width: usize) -> Self {
        Segment { text, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Literal(char),
    Placeholder { code: char, pad_left: bool },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    nodes: Vec<Node>,
    codes: Vec<char>,
}

impl FormatSpec {
    pub fn parse(template: &str) -> Self {
        let mut nodes = Vec::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '@' {
                nodes.push(Node::Literal(c));
                continue;
            }

            match chars.next() {
                None => nodes.push(Node::Literal('@')),
                Some('@') => nodes.push(Node::Literal('@')),
                Some('^') => match chars.next() {
                    Some(code) => nodes.push(Node::Placeholder {
                        code,
                        pad_left: true,
                    }),
                    None => {
                        nodes.push(Node::Literal('@'));
                        nodes.push(Node::Literal('^'));
                    }
                },
                Some(code) => nodes.push(Node::Placeholder {
                    code,
                    pad_left: false,
                }),
            }
        }

        let mut codes = Vec::new();
        for node in &nodes {
            if let Node::Placeholder { code, .. } = node
                && !codes.contains(code)
            {
                codes.push(*code);
            }
        }

        FormatSpec { nodes, codes }
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Distinct placeholder codes in order of first appearance.
    #[inline]
    pub fn codes(&self) -> &[char] {
        &self.codes
    }

    /// Visible width of every expanded row: literal characters plus the global column widths.
    pub fn row_width(&self, widths: &ColumnWidths) -> usize {
        self.nodes
            .iter()
            .map(|node| match node {
                Node::Literal(_) => 1,
                Node::Placeholder { code, .. } => widths.get(*code),
            })
            .sum()
    }

    /// Substitutes the segments of one entry, padding each placeholder with spaces to its
    /// column's width. Returns the row and its visible width.
    pub fn expand(
        &self,
        segments: &HashMap<char, Segment>,
        widths: &ColumnWidths,
    ) -> (String, usize) {
        let mut row = String::new();
        let mut width = 0;

        for node in &self.nodes {
            match *node {
                Node::Literal(c) => {
                    row.push(c);
                    width += 1;
                }
                Node::Placeholder { code, pad_left } => {
                    let column = widths.get(code);
                    let (text, used) = segments
                        .get(&code)
                        .map_or(("", 0), |s| (s.text.as_str(), s.width));
                    let padding = " ".repeat(column.saturating_sub(used));

                    if pad_left {
                        row.push_str(&padding);
                        row.push_str(text);
                    } else {
                        row.push_str(text);
                        row.push_str(&padding);
                    }
                    width += column.max(used);
                }
            }
        }

        (row, width)
    }
}

/// Maximum visible width per placeholder code over a batch of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnWidths(HashMap<char, usize>);

impl ColumnWidths {
    pub fn new() -> Self {
        ColumnWidths::default()
    }

    /// Records one segment width, keeping the maximum.
    pub fn observe(&mut self, code: char, width: usize) {
        let slot = self.0.entry(code).or_insert(0);
        *slot = (*slot).max(width);
    }

    #[inline]
    pub fn get(&self, code: char) -> usize {
        self.0.get(&code).copied().unwrap_or(0)
    }
}
