//! Inline markdown parser.
//!
//! This module turns the raw text of a paragraph, heading or table cell
//! into inline nodes: emphasis, strong emphasis, code spans, links,
//! images and line breaks.
//!
//! Emphasis and links are resolved with a delimiter stack. Candidate
//! nodes live in a linked arena so that matched runs can wrap the nodes
//! between them without shifting indices.

use crate::entities::decode_entity;
use datadown_config::ParseOptions;
use datadown_core::ast::{inline_depth, plain_text};
use datadown_core::Inline;
use log::trace;

/// Unescaped parentheses a bare link destination may nest.
const MAX_LINK_PAREN_DEPTH: usize = 32;

/// A node in the arena together with its neighbours.
#[derive(Debug)]
struct Slot {
    inline: Inline,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked list of inline nodes backed by a vector.
#[derive(Debug, Default)]
struct NodeList {
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl NodeList {
    fn push(&mut self, inline: Inline) -> usize {
        let idx = self.slots.len();
        self.slots.push(Slot {
            inline,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.slots[tail].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        idx
    }

    fn insert_after(&mut self, at: usize, inline: Inline) -> usize {
        let idx = self.slots.len();
        let next = self.slots[at].next;
        self.slots.push(Slot {
            inline,
            prev: Some(at),
            next,
        });
        self.slots[at].next = Some(idx);
        match next {
            Some(n) => self.slots[n].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        idx
    }

    /// Unlink and return the nodes strictly between `from` and `to`
    /// (`None` means up to the end of the list).
    fn take_between(&mut self, from: usize, to: Option<usize>) -> Vec<Inline> {
        let mut taken = Vec::new();
        let mut cursor = self.slots[from].next;
        while cursor != to {
            let Some(idx) = cursor else { break };
            cursor = self.slots[idx].next;
            taken.push(std::mem::replace(&mut self.slots[idx].inline, Inline::SoftBreak));
        }
        self.slots[from].next = to;
        match to {
            Some(t) => self.slots[t].prev = Some(from),
            None => self.tail = Some(from),
        }
        taken
    }

    /// Depth of the deepest node strictly between `from` and `to`.
    fn depth_between(&self, from: usize, to: Option<usize>) -> usize {
        let mut depth = 0;
        let mut cursor = self.slots[from].next;
        while cursor != to {
            let Some(idx) = cursor else { break };
            depth = depth.max(inline_depth(std::slice::from_ref(&self.slots[idx].inline)));
            cursor = self.slots[idx].next;
        }
        depth
    }

    fn set(&mut self, idx: usize, inline: Inline) {
        self.slots[idx].inline = inline;
    }

    fn into_vec(mut self) -> Vec<Inline> {
        let mut out = Vec::new();
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            cursor = self.slots[idx].next;
            out.push(std::mem::replace(&mut self.slots[idx].inline, Inline::SoftBreak));
        }
        out
    }
}

/// A run of `*` or `_` that may open or close emphasis.
#[derive(Debug, Clone)]
struct Delimiter {
    ch: char,
    node: usize,
    /// Characters left in the run
    len: usize,
    /// Length of the run as written
    orig_len: usize,
    can_open: bool,
    can_close: bool,
    active: bool,
}

/// An unmatched `[` or `![`.
#[derive(Debug, Clone)]
struct Bracket {
    node: usize,
    image: bool,
    active: bool,
    /// Delimiter stack height when the bracket was opened
    delim_bottom: usize,
}

/// Inline markdown parser.
#[derive(Debug, Clone)]
pub struct InlineParser<'o> {
    options: &'o ParseOptions,
}

impl<'o> InlineParser<'o> {
    /// Create a parser using the given dialect options.
    pub fn new(options: &'o ParseOptions) -> Self {
        Self { options }
    }

    /// Parse inline content into nodes.
    ///
    /// Never fails: anything that does not form a construct stays text.
    pub fn parse(&self, text: &str) -> Vec<Inline> {
        let mut state = InlineState::new(text, self.options);
        state.run();
        state.finish()
    }
}

/// Parse inline content with the given options.
///
/// ```
/// use datadown_config::ParseOptions;
/// use datadown_core::Inline;
/// use datadown_parser::parse_inline;
///
/// let nodes = parse_inline("`code`", &ParseOptions::default());
/// assert_eq!(nodes, vec![Inline::CodeSpan { value: "code".to_string() }]);
/// ```
pub fn parse_inline(text: &str, options: &ParseOptions) -> Vec<Inline> {
    InlineParser::new(options).parse(text)
}

struct InlineState<'a> {
    src: &'a str,
    pos: usize,
    options: &'a ParseOptions,
    nodes: NodeList,
    /// Pending literal text not yet pushed as a node
    buffer: String,
    delims: Vec<Delimiter>,
    brackets: Vec<Bracket>,
}

impl<'a> InlineState<'a> {
    fn new(src: &'a str, options: &'a ParseOptions) -> Self {
        Self {
            src,
            pos: 0,
            options,
            nodes: NodeList::default(),
            buffer: String::new(),
            delims: Vec::new(),
            brackets: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset..)?.chars().next()
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '`' => self.code_span(),
                '\\' => self.backslash(),
                '&' if self.options.decode_entities => self.entity(),
                '\n' => self.line_ending(),
                '*' | '_' => self.delimiter_run(c),
                '[' => self.open_bracket(false),
                '!' if self.peek_at(1) == Some('[') => self.open_bracket(true),
                ']' => self.close_bracket(),
                _ => {
                    self.buffer.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn finish(mut self) -> Vec<Inline> {
        self.flush();
        self.process_emphasis(0);
        normalize(self.nodes.into_vec())
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let value = std::mem::take(&mut self.buffer);
            self.nodes.push(Inline::Text { value });
        }
    }

    fn push_node(&mut self, inline: Inline) -> usize {
        self.flush();
        self.nodes.push(inline)
    }

    /// Code spans bind tighter than everything else.
    fn code_span(&mut self) {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let run = count_run(bytes, start, b'`');
        let content_start = start + run;

        let mut i = content_start;
        while i < bytes.len() {
            if bytes[i] == b'`' {
                let closing = count_run(bytes, i, b'`');
                if closing == run {
                    let value = normalize_code_span(&self.src[content_start..i]);
                    self.push_node(Inline::CodeSpan { value });
                    self.pos = i + closing;
                    return;
                }
                i += closing;
            } else {
                i += 1;
            }
        }

        // No closing run of the same length: the backticks are literal
        self.buffer.push_str(&self.src[start..content_start]);
        self.pos = content_start;
    }

    fn backslash(&mut self) {
        match self.peek_at(1) {
            Some('\n') => {
                self.push_node(Inline::LineBreak);
                self.pos += 2;
                self.skip_line_indent();
            }
            Some(c) if c.is_ascii_punctuation() => {
                self.buffer.push(c);
                self.pos += 2;
            }
            _ => {
                self.buffer.push('\\');
                self.pos += 1;
            }
        }
    }

    fn entity(&mut self) {
        match decode_entity(&self.src[self.pos..]) {
            Some((decoded, len)) => {
                self.buffer.push_str(&decoded);
                self.pos += len;
            }
            None => {
                self.buffer.push('&');
                self.pos += 1;
            }
        }
    }

    fn line_ending(&mut self) {
        let kept = self.buffer.trim_end_matches(' ').len();
        let trailing = self.buffer.len() - kept;
        self.buffer.truncate(kept);

        let node = if trailing >= 2 {
            Inline::LineBreak
        } else {
            Inline::SoftBreak
        };
        self.push_node(node);
        self.pos += 1;
        self.skip_line_indent();
    }

    fn skip_line_indent(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn delimiter_run(&mut self, ch: char) {
        let start = self.pos;
        let run = count_run(self.src.as_bytes(), start, ch as u8);
        let prev = self.src[..start].chars().next_back();
        let next = self.src[start + run..].chars().next();
        let (can_open, can_close) = flanking(ch, prev, next);

        let node = self.push_node(Inline::text(ch.to_string().repeat(run)));
        if can_open || can_close {
            self.delims.push(Delimiter {
                ch,
                node,
                len: run,
                orig_len: run,
                can_open,
                can_close,
                active: true,
            });
        }
        self.pos += run;
    }

    fn open_bracket(&mut self, image: bool) {
        let marker = if image { "![" } else { "[" };
        let node = self.push_node(Inline::text(marker));
        self.pos += marker.len();

        if self.brackets.len() >= self.options.nesting_depth() {
            trace!("bracket nesting limit reached at byte {}", self.pos);
            return;
        }
        self.brackets.push(Bracket {
            node,
            image,
            active: true,
            delim_bottom: self.delims.len(),
        });
    }

    fn close_bracket(&mut self) {
        let Some(bracket) = self.brackets.pop() else {
            self.buffer.push(']');
            self.pos += 1;
            return;
        };
        if !bracket.active {
            self.buffer.push(']');
            self.pos += 1;
            return;
        }
        let Some((url, title, end)) = self.link_tail(self.pos + 1) else {
            self.buffer.push(']');
            self.pos += 1;
            return;
        };

        self.flush();
        self.process_emphasis(bracket.delim_bottom);
        self.delims.truncate(bracket.delim_bottom);

        if self.nodes.depth_between(bracket.node, None) + 1 > self.options.nesting_depth() {
            self.buffer.push(']');
            self.pos += 1;
            return;
        }

        let children = self.nodes.take_between(bracket.node, None);
        let inline = if bracket.image {
            Inline::Image {
                url,
                title,
                alt: plain_text(&children),
            }
        } else {
            Inline::Link {
                url,
                title,
                children,
            }
        };
        self.nodes.set(bracket.node, inline);
        self.pos = end;

        // Links may not contain other links
        if !bracket.image {
            for open in self.brackets.iter_mut().filter(|b| !b.image) {
                open.active = false;
            }
        }
    }

    /// Parse `(destination "title")` starting at `start`.
    ///
    /// Returns the destination, title and the byte offset after `)`.
    fn link_tail(&self, start: usize) -> Option<(String, Option<String>, usize)> {
        let src = self.src;
        if !src[start..].starts_with('(') {
            return None;
        }
        let mut pos = skip_link_whitespace(src, start + 1);

        let (raw_url, after_url) = if src[pos..].starts_with('<') {
            let mut end = None;
            let mut chars = src[pos + 1..].char_indices();
            while let Some((offset, c)) = chars.next() {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '>' => {
                        end = Some(pos + 1 + offset);
                        break;
                    }
                    '<' | '\n' => return None,
                    _ => {}
                }
            }
            let end = end?;
            (&src[pos + 1..end], end + 1)
        } else {
            let mut depth = 0usize;
            let mut end = src.len();
            let mut chars = src[pos..].char_indices();
            while let Some((offset, c)) = chars.next() {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '(' if depth == MAX_LINK_PAREN_DEPTH => return None,
                    '(' => depth += 1,
                    ')' if depth == 0 => {
                        end = pos + offset;
                        break;
                    }
                    ')' => depth -= 1,
                    c if c.is_whitespace() || c.is_control() => {
                        end = pos + offset;
                        break;
                    }
                    _ => {}
                }
            }
            if depth != 0 {
                return None;
            }
            (&src[pos..end], end)
        };
        pos = after_url;

        let after_space = skip_link_whitespace(src, pos);
        let mut title = None;
        if after_space > pos {
            if let Some((raw_title, after_title)) = link_title(src, after_space) {
                title = Some(self.unescape(raw_title));
                pos = after_title;
            } else {
                pos = after_space;
            }
        }
        pos = skip_link_whitespace(src, pos);

        if !src[pos..].starts_with(')') {
            return None;
        }
        Some((self.unescape(raw_url), title, pos + 1))
    }

    /// Resolve backslash escapes and entities in a destination or title.
    fn unescape(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(c) = rest.chars().next() {
            match c {
                '\\' => match rest[1..].chars().next() {
                    Some(next) if next.is_ascii_punctuation() => {
                        out.push(next);
                        rest = &rest[2..];
                    }
                    _ => {
                        out.push('\\');
                        rest = &rest[1..];
                    }
                },
                '&' if self.options.decode_entities => match decode_entity(rest) {
                    Some((decoded, len)) => {
                        out.push_str(&decoded);
                        rest = &rest[len..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                },
                _ => {
                    out.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        out
    }

    /// Match emphasis delimiters above `bottom` on the stack.
    fn process_emphasis(&mut self, bottom: usize) {
        // Lowest index worth searching, per (char, closer can_open, length mod 3)
        let mut openers_bottom = [bottom; 12];
        let mut closer = bottom;

        while closer < self.delims.len() {
            let current = &self.delims[closer];
            if !current.active || !current.can_close {
                closer += 1;
                continue;
            }
            let key = usize::from(current.ch == '_') * 6
                + usize::from(current.can_open) * 3
                + current.orig_len % 3;

            let opener = (openers_bottom[key].max(bottom)..closer)
                .rev()
                .find(|&i| self.can_pair(i, closer));

            let Some(opener) = opener else {
                openers_bottom[key] = closer;
                if !self.delims[closer].can_open {
                    self.delims[closer].active = false;
                }
                closer += 1;
                continue;
            };

            let open_node = self.delims[opener].node;
            let close_node = self.delims[closer].node;
            if self.nodes.depth_between(open_node, Some(close_node)) + 1
                > self.options.nesting_depth()
            {
                trace!("emphasis nesting limit reached");
                openers_bottom[key] = closer;
                self.delims[closer].active = false;
                closer += 1;
                continue;
            }

            let used = if self.delims[opener].len >= 2 && self.delims[closer].len >= 2 {
                2
            } else {
                1
            };

            for between in &mut self.delims[opener + 1..closer] {
                between.active = false;
            }

            let children = self.nodes.take_between(open_node, Some(close_node));
            let wrapped = if used == 2 {
                Inline::Strong { children }
            } else {
                Inline::Emphasis { children }
            };
            self.nodes.insert_after(open_node, wrapped);

            self.consume(opener, used);
            self.consume(closer, used);
            if self.delims[closer].len == 0 {
                closer += 1;
            }
        }

        for delim in &mut self.delims[bottom..] {
            delim.active = false;
        }
    }

    fn can_pair(&self, opener: usize, closer: usize) -> bool {
        let open = &self.delims[opener];
        let close = &self.delims[closer];
        if !open.active || !open.can_open || open.ch != close.ch {
            return false;
        }
        // Rule of 3: a run that can both open and close only pairs
        // when the combined length is not a multiple of 3
        let both_sides = open.can_close || close.can_open;
        let sum_multiple_of_3 = (open.orig_len + close.orig_len) % 3 == 0;
        let each_multiple_of_3 = open.orig_len % 3 == 0 && close.orig_len % 3 == 0;
        !(both_sides && sum_multiple_of_3 && !each_multiple_of_3)
    }

    fn consume(&mut self, idx: usize, used: usize) {
        let delim = &mut self.delims[idx];
        delim.len -= used;
        if delim.len == 0 {
            delim.active = false;
        }
        let remaining = delim.ch.to_string().repeat(delim.len);
        let node = delim.node;
        self.nodes.set(node, Inline::text(remaining));
    }
}

fn count_run(bytes: &[u8], start: usize, b: u8) -> usize {
    bytes[start..].iter().take_while(|&&c| c == b).count()
}

/// Newlines become spaces; one leading and trailing space is stripped
/// when both are present and the content is not all spaces.
fn normalize_code_span(raw: &str) -> String {
    let value = raw.replace('\n', " ");
    if value.len() >= 2
        && value.starts_with(' ')
        && value.ends_with(' ')
        && !value.chars().all(|c| c == ' ')
    {
        value[1..value.len() - 1].to_string()
    } else {
        value
    }
}

/// Skip spaces, tabs and at most one newline.
fn skip_link_whitespace(src: &str, mut pos: usize) -> usize {
    let mut newline_seen = false;
    for c in src[pos..].chars() {
        match c {
            ' ' | '\t' => pos += 1,
            '\n' if !newline_seen => {
                newline_seen = true;
                pos += 1;
            }
            _ => break,
        }
    }
    pos
}

/// Parse a link title delimited by `"`, `'` or parentheses.
fn link_title(src: &str, start: usize) -> Option<(&str, usize)> {
    let open = src[start..].chars().next()?;
    let close = match open {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };
    let body_start = start + 1;
    let mut chars = src[body_start..].char_indices();
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == close {
            let end = body_start + offset;
            return Some((&src[body_start..end], end + 1));
        } else if open == '(' && c == '(' {
            return None;
        }
    }
    None
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
}

/// Compute (can_open, can_close) for a delimiter run.
fn flanking(ch: char, prev: Option<char>, next: Option<char>) -> (bool, bool) {
    let prev_space = prev.map(char::is_whitespace).unwrap_or(true);
    let next_space = next.map(char::is_whitespace).unwrap_or(true);
    let prev_punct = prev.map(is_punctuation).unwrap_or(false);
    let next_punct = next.map(is_punctuation).unwrap_or(false);

    let left = !next_space && (!next_punct || prev_space || prev_punct);
    let right = !prev_space && (!prev_punct || next_space || next_punct);

    if ch == '_' {
        // Underscores do not create intraword emphasis
        (left && (!right || prev_punct), right && (!left || next_punct))
    } else {
        (left, right)
    }
}

/// Merge adjacent text nodes and drop empty ones, recursively.
fn normalize(nodes: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = match node {
            Inline::Text { value } if value.is_empty() => continue,
            Inline::Emphasis { children } => Inline::Emphasis {
                children: normalize(children),
            },
            Inline::Strong { children } => Inline::Strong {
                children: normalize(children),
            },
            Inline::Link {
                url,
                title,
                children,
            } => Inline::Link {
                url,
                title,
                children: normalize(children),
            },
            other => other,
        };
        match (out.last_mut(), node) {
            (Some(Inline::Text { value: last }), Inline::Text { value }) => last.push_str(&value),
            (_, node) => out.push(node),
        }
    }
    out
}
