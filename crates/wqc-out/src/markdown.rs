//! Constrained markdown to a safe node tree.
//!
//! Narrative text comes from the backend (often an LLM), so the three HTML
//! metacharacters are escaped before any markdown is recognised. Supported,
//! in pass order: `#`/`##`/`###` headings, `**bold**`, `-`/`*` bullet lists,
//! fenced code blocks, `inline code`, blank-line paragraphs and single line
//! breaks. Fence contents are taken verbatim.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    H1,
    H2,
    H3,
    P,
    Strong,
    Ul,
    Li,
    Pre,
    Code,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::P => "p",
            Tag::Strong => "strong",
            Tag::Ul => "ul",
            Tag::Li => "li",
            Tag::Pre => "pre",
            Tag::Code => "code",
        }
    }

    fn heading(level: usize) -> Option<Tag> {
        match level {
            1 => Some(Tag::H1),
            2 => Some(Tag::H2),
            3 => Some(Tag::H3),
            _ => None,
        }
    }
}

/// Node of a rendered fragment. `Text` is already escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element { tag: Tag, children: Vec<Node> },
    Text { text: String },
    LineBreak,
}

impl Node {
    fn element(tag: Tag, children: Vec<Node>) -> Self {
        Node::Element { tag, children }
    }

    fn text(text: &str) -> Self {
        Node::Text { text: text.to_string() }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element { tag, children } => {
                out.push('<');
                out.push_str(tag.as_str());
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag.as_str());
                out.push('>');
            }
            Node::Text { text } => out.push_str(text),
            Node::LineBreak => out.push_str("<br>"),
        }
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Node::Element { children, .. } => children.iter().for_each(|c| c.write_text(out)),
            Node::Text { text } => out.push_str(&unescape_html(text)),
            Node::LineBreak => out.push('\n'),
        }
    }
}

/// Escaped fragment. Every text node went through [`escape_html`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SafeHtml {
    nodes: Vec<Node>,
}

impl SafeHtml {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Serialise to an HTML string
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    /// Plain text with markup dropped and entities decoded. Blocks are
    /// separated by a blank line.
    pub fn text_content(&self) -> String {
        self.nodes
            .iter()
            .map(|node| {
                let mut out = String::new();
                node.write_text(&mut out);
                out
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}

/// Render narrative markdown. `None` and `""` give the empty fragment.
pub fn render_markdown(text: Option<&str>) -> SafeHtml {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return SafeHtml::empty();
    };

    let escaped = escape_html(&text.replace("\r\n", "\n"));
    let mut blocks = BlockBuilder::default();

    for line in escaped.split('\n') {
        if let Some(code) = blocks.fence.as_mut() {
            if line.trim_start().starts_with("```") {
                let body = code.join("\n");
                blocks.fence = None;
                blocks.nodes.push(code_block(&body));
            } else {
                code.push(line.to_string());
            }
            continue;
        }

        if line.trim_start().starts_with("```") {
            blocks.flush();
            blocks.fence = Some(Vec::new());
        } else if let Some((level, rest)) = heading(line) {
            blocks.flush();
            if let Some(tag) = Tag::heading(level) {
                blocks.nodes.push(Node::element(tag, inline(rest.trim())));
            }
        } else if let Some(item) = bullet(line) {
            blocks.flush_paragraph();
            blocks.items.push(item.to_string());
        } else if line.trim().is_empty() {
            blocks.flush();
        } else {
            blocks.flush_list();
            blocks.paragraph.push(line.to_string());
        }
    }

    // An unterminated fence still renders as code.
    if let Some(code) = blocks.fence.take() {
        blocks.nodes.push(code_block(&code.join("\n")));
    }
    blocks.flush();

    SafeHtml { nodes: blocks.nodes }
}

#[derive(Default)]
struct BlockBuilder {
    nodes: Vec<Node>,
    paragraph: Vec<String>,
    items: Vec<String>,
    fence: Option<Vec<String>>,
}

impl BlockBuilder {
    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let mut children = Vec::new();
        for (i, line) in self.paragraph.drain(..).enumerate() {
            if i > 0 {
                children.push(Node::LineBreak);
            }
            children.extend(inline(&line));
        }
        self.nodes.push(Node::element(Tag::P, children));
    }

    fn flush_list(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let items = self
            .items
            .drain(..)
            .map(|item| Node::element(Tag::Li, inline(&item)))
            .collect();
        self.nodes.push(Node::element(Tag::Ul, items));
    }
}

fn code_block(body: &str) -> Node {
    Node::element(Tag::Pre, vec![Node::element(Tag::Code, vec![Node::text(body)])])
}

/// `# title` through `### title`
fn heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    line[hashes..].strip_prefix(' ').map(|rest| (hashes, rest))
}

/// `- item` or `* item`
fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

enum Segment<'a> {
    Plain(&'a str),
    Marked(&'a str),
}

/// Split on paired delimiters. An unpaired or empty pair stays literal.
fn split_delimited<'a>(text: &'a str, delim: &str) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find(delim) {
        let after = &rest[open + delim.len()..];
        match after.find(delim) {
            Some(close) if close > 0 => {
                if open > 0 {
                    out.push(Segment::Plain(&rest[..open]));
                }
                out.push(Segment::Marked(&after[..close]));
                rest = &after[close + delim.len()..];
            }
            _ => break,
        }
    }
    if !rest.is_empty() {
        out.push(Segment::Plain(rest));
    }
    out
}

/// Bold first, then code spans inside each piece.
fn inline(text: &str) -> Vec<Node> {
    split_delimited(text, "**")
        .into_iter()
        .flat_map(|segment| match segment {
            Segment::Plain(plain) => code_spans(plain),
            Segment::Marked(bold) => vec![Node::element(Tag::Strong, code_spans(bold))],
        })
        .collect()
}

fn code_spans(text: &str) -> Vec<Node> {
    split_delimited(text, "`")
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(plain) => Node::text(plain),
            Segment::Marked(code) => Node::element(Tag::Code, vec![Node::text(code)]),
        })
        .collect()
}
