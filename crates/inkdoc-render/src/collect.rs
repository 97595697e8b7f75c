//! Block collection from the Markdown event stream.
//!
//! Flattening happens here, mirroring what the output needs: styled spans
//! and link labels collapse to plain text, blockquotes collapse to text
//! chunks, table cells collapse to per-segment-trimmed strings. Images and
//! links are recorded alongside the paragraph they appear in so the
//! renderer can emit figures after the paragraph text.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::block::{
    BlockNode, ImageRef, Inline, LinkRef, ListItem, ListNode, RowKind, stripped_text,
};

/// Collect a Markdown document into block nodes.
#[must_use]
pub fn collect_blocks(markdown: &str) -> Vec<BlockNode> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);

    let mut collector = BlockCollector::default();
    for event in parser {
        collector.process_event(event);
    }
    collector.blocks
}

/// What an open inline sink will become when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkKind {
    /// Top-level paragraph (or a paragraph inside a blockquote).
    Paragraph,
    /// Heading with its level.
    Heading(u8),
    /// Table cell.
    Cell,
    /// List item's direct inline content.
    Item,
    /// Paragraph inside a loose list item, flattened into the item.
    LoosePara,
}

/// Inline accumulation for one open block.
#[derive(Debug, Default)]
struct InlineSink {
    inlines: Vec<Inline>,
    images: Vec<ImageRef>,
    links: Vec<LinkRef>,
    span_depth: usize,
    span_buf: String,
}

impl InlineSink {
    /// Append text, merging into the previous bare text segment.
    fn push_text(&mut self, text: &str) {
        if let Some(Inline::Text(last)) = self.inlines.last_mut() {
            last.push_str(text);
        } else {
            self.inlines.push(Inline::Text(text.to_owned()));
        }
    }
}

#[derive(Debug)]
struct LinkCapture {
    href: String,
    inner: Vec<Inline>,
}

#[derive(Debug)]
struct ImageCapture {
    src: String,
    alt: String,
}

#[derive(Debug)]
struct ListBuild {
    ordered: bool,
    items: Vec<ListItem>,
}

#[derive(Debug, Default)]
struct ItemBuild {
    sink: InlineSink,
    flattened_code: bool,
    nested: Vec<ListNode>,
}

#[derive(Debug, Default)]
struct TableBuild {
    rows: Vec<(RowKind, Vec<String>)>,
    in_head: bool,
    current: Vec<String>,
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<BlockNode>,
    sinks: Vec<(SinkKind, InlineSink)>,
    link_stack: Vec<LinkCapture>,
    image_stack: Vec<ImageCapture>,
    code: Option<(Option<String>, String)>,
    quote_depth: usize,
    quote_chunks: Vec<String>,
    list_stack: Vec<ListBuild>,
    item_stack: Vec<ItemBuild>,
    table: Option<TableBuild>,
}

impl BlockCollector {
    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::InlineHtml(_) => self.boundary(),
            Event::Html(_)
            | Event::Rule
            | Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                let kind = if self.item_stack.is_empty() {
                    SinkKind::Paragraph
                } else {
                    SinkKind::LoosePara
                };
                self.sinks.push((kind, InlineSink::default()));
            }
            Tag::Heading { level, .. } => {
                let kind = SinkKind::Heading(heading_level_to_num(level));
                self.sinks.push((kind, InlineSink::default()));
            }
            Tag::BlockQuote(_) => {
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|token| token.trim().to_owned())
                        .filter(|token| !token.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                self.list_stack.push(ListBuild {
                    ordered: start.is_some(),
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.item_stack.push(ItemBuild::default());
            }
            Tag::Table(_) => {
                self.table = Some(TableBuild::default());
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_head = true;
                }
            }
            Tag::TableRow => {}
            Tag::TableCell => {
                self.sinks.push((SinkKind::Cell, InlineSink::default()));
            }
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough => {
                if self.link_stack.is_empty() && self.image_stack.is_empty() {
                    if let Some((_, sink)) = self.sinks.last_mut() {
                        sink.span_depth += 1;
                    }
                }
            }
            Tag::Link { dest_url, .. } => {
                self.link_stack.push(LinkCapture {
                    href: dest_url.into_string(),
                    inner: Vec::new(),
                });
            }
            Tag::Image { dest_url, .. } => {
                self.image_stack.push(ImageCapture {
                    src: dest_url.into_string(),
                    alt: String::new(),
                });
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => self.close_sink(),
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    let chunks = std::mem::take(&mut self.quote_chunks);
                    if self.item_stack.is_empty() {
                        self.blocks.push(BlockNode::Blockquote { lines: chunks });
                    } else {
                        // Quote inside a list item flattens into the item.
                        self.flatten_into_item(chunks, false);
                    }
                }
            }
            TagEnd::CodeBlock => {
                if let Some((language, text)) = self.code.take() {
                    if self.quote_depth > 0 {
                        self.quote_chunks.push(text);
                    } else if self.item_stack.is_empty() {
                        self.blocks.push(BlockNode::CodeBlock { language, text });
                    } else {
                        self.flatten_into_item(vec![text], true);
                    }
                }
            }
            TagEnd::List(_) => {
                if let Some(list) = self.list_stack.pop() {
                    let node = ListNode {
                        ordered: list.ordered,
                        items: list.items,
                    };
                    if let Some(item) = self.item_stack.last_mut() {
                        item.nested.push(node);
                    } else if self.quote_depth > 0 {
                        flatten_list_text(&node, &mut self.quote_chunks);
                    } else {
                        self.blocks.push(BlockNode::List(node));
                    }
                }
            }
            TagEnd::Item => {
                if let Some(item) = self.item_stack.pop() {
                    let has_code = item.flattened_code
                        || item
                            .sink
                            .inlines
                            .iter()
                            .any(|i| matches!(i, Inline::Code(_)));
                    let built = ListItem {
                        inlines: item.sink.inlines,
                        has_code,
                        nested: item.nested,
                    };
                    if let Some(list) = self.list_stack.last_mut() {
                        list.items.push(built);
                    }
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    if self.quote_depth > 0 {
                        for (_, cells) in table.rows {
                            self.quote_chunks.extend(cells);
                        }
                    } else {
                        self.blocks.push(BlockNode::Table { rows: table.rows });
                    }
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_head = false;
                    let row = std::mem::take(&mut table.current);
                    if !row.is_empty() {
                        table.rows.push((RowKind::Header, row));
                    }
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.current);
                    if !row.is_empty() {
                        table.rows.push((RowKind::Body, row));
                    }
                }
            }
            TagEnd::TableCell => {
                if let Some((SinkKind::Cell, sink)) = self.sinks.pop() {
                    if let Some(table) = &mut self.table {
                        table.current.push(stripped_text(&sink.inlines));
                    }
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                if self.link_stack.is_empty() && self.image_stack.is_empty() {
                    if let Some((_, sink)) = self.sinks.last_mut() {
                        if sink.span_depth > 0 {
                            sink.span_depth -= 1;
                            if sink.span_depth == 0 {
                                let buf = std::mem::take(&mut sink.span_buf);
                                sink.inlines.push(Inline::Span(buf));
                            }
                        }
                    }
                }
            }
            TagEnd::Link => {
                if let Some(capture) = self.link_stack.pop() {
                    let raw: String = capture.inner.iter().map(Inline::text).collect();
                    let label = stripped_text(&capture.inner);
                    if let Some(outer) = self.link_stack.last_mut() {
                        push_capture_text(&mut outer.inner, &raw);
                    } else if let Some((_, sink)) = self.sinks.last_mut() {
                        if sink.span_depth > 0 {
                            sink.span_buf.push_str(&raw);
                        } else {
                            sink.inlines.push(Inline::Span(raw));
                        }
                        sink.links.push(LinkRef {
                            href: capture.href,
                            text: label,
                        });
                    }
                }
            }
            TagEnd::Image => {
                if let Some(capture) = self.image_stack.pop() {
                    if let Some((_, sink)) = self.sinks.last_mut() {
                        sink.images.push(ImageRef {
                            src: capture.src,
                            alt: capture.alt,
                        });
                    }
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buffer)) = &mut self.code {
            buffer.push_str(text);
        } else if let Some(image) = self.image_stack.last_mut() {
            image.alt.push_str(text);
        } else if let Some(link) = self.link_stack.last_mut() {
            push_capture_text(&mut link.inner, text);
        } else if let Some((_, sink)) = self.sinks.last_mut() {
            if sink.span_depth > 0 {
                sink.span_buf.push_str(text);
            } else {
                sink.push_text(text);
            }
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(image) = self.image_stack.last_mut() {
            image.alt.push_str(code);
        } else if let Some(link) = self.link_stack.last_mut() {
            link.inner.push(Inline::Code(code.to_owned()));
        } else if let Some((_, sink)) = self.sinks.last_mut() {
            if sink.span_depth > 0 {
                sink.span_buf.push_str(code);
            } else {
                sink.inlines.push(Inline::Code(code.to_owned()));
            }
        }
    }

    fn soft_break(&mut self) {
        self.text("\n");
    }

    /// A hard break contributes no text but ends the current text segment.
    fn hard_break(&mut self) {
        self.boundary();
    }

    fn boundary(&mut self) {
        if self.code.is_some() || !self.image_stack.is_empty() {
            return;
        }
        if let Some(link) = self.link_stack.last_mut() {
            link.inner.push(Inline::Span(String::new()));
        } else if let Some((_, sink)) = self.sinks.last_mut() {
            if sink.span_depth == 0 {
                sink.inlines.push(Inline::Span(String::new()));
            }
        }
    }

    /// Close the innermost paragraph or heading sink.
    fn close_sink(&mut self) {
        let Some((kind, sink)) = self.sinks.pop() else {
            return;
        };
        match kind {
            SinkKind::Paragraph => {
                if self.quote_depth > 0 {
                    for inline in &sink.inlines {
                        self.quote_chunks.push(inline.text().to_owned());
                    }
                } else {
                    self.blocks.push(BlockNode::Paragraph {
                        inlines: sink.inlines,
                        images: sink.images,
                        links: sink.links,
                    });
                }
            }
            SinkKind::Heading(level) => {
                let text = stripped_text(&sink.inlines);
                if self.quote_depth > 0 {
                    self.quote_chunks.push(text);
                } else if self.item_stack.is_empty() {
                    self.blocks.push(BlockNode::Heading { level, text });
                } else {
                    self.flatten_into_item(vec![text], false);
                }
            }
            SinkKind::LoosePara => {
                let had_code = sink.inlines.iter().any(|i| matches!(i, Inline::Code(_)));
                if self.quote_depth > 0 {
                    for inline in &sink.inlines {
                        self.quote_chunks.push(inline.text().to_owned());
                    }
                } else {
                    let raw: String = sink.inlines.iter().map(Inline::text).collect();
                    self.flatten_into_item(vec![raw], had_code);
                }
            }
            // Cells close on TagEnd::TableCell, items on TagEnd::Item.
            SinkKind::Cell | SinkKind::Item => {}
        }
    }

    /// Push flattened texts into the innermost open list item.
    fn flatten_into_item(&mut self, texts: Vec<String>, has_code: bool) {
        if let Some(item) = self.item_stack.last_mut() {
            for text in texts {
                item.sink.inlines.push(Inline::Span(text));
            }
            item.flattened_code |= has_code;
        }
    }
}

/// Append text to a capture, merging into a trailing bare text segment.
fn push_capture_text(inner: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = inner.last_mut() {
        last.push_str(text);
    } else {
        inner.push(Inline::Text(text.to_owned()));
    }
}

/// Flatten a list's item texts into quote chunks.
fn flatten_list_text(list: &ListNode, chunks: &mut Vec<String>) {
    for item in &list.items {
        let text = stripped_text(&item.inlines);
        if !text.is_empty() {
            chunks.push(text);
        }
        for nested in &item.nested {
            flatten_list_text(nested, chunks);
        }
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
