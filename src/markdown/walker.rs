//! Document tree to ANSI text.
//!
//! Every block renders to lines no wider than [`RenderContext::available`]; parents add their
//! own prefixes (list markers, `> `) to the lines their children return. Code boxes are the one
//! exception: they never shrink below [`MIN_BOX_WIDTH`](super::layout::MIN_BOX_WIDTH).

use markdown::mdast::{AlignKind, Blockquote, Code, Heading, List, ListItem, Node, Table};

use super::layout::{self, BoxChrome};
use super::table::{layout_table, TableStyle};
use crate::core::text::ansi::{HYPERLINK_CLOSE, RESET};
use crate::core::text::utils::Align;
use crate::core::text::width::visible_width;
use crate::highlight::{HighlightedCode, Highlighter};
use crate::theme::{style_prefix, StyleFn, Theme};

const MAX_RULE_WIDTH: usize = 80;

#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub width: usize,
    pub indent_level: usize,
    pub theme: &'a Theme,
    /// Emit OSC-8 hyperlinks for links.
    pub interactive: bool,
    pub terminal_width: Option<usize>,
    pub heading_rule: bool,
    pub highlighter: Option<&'a Highlighter>,
    /// Escapes that re-open the enclosing style after a nested span closes its own.
    restore: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(width: usize, theme: &'a Theme) -> Self {
        Self {
            width,
            indent_level: 0,
            theme,
            interactive: false,
            terminal_width: None,
            heading_rule: true,
            highlighter: None,
            restore: "",
        }
    }

    /// Columns left for content once the current indentation is taken.
    pub fn available(&self) -> usize {
        self.width.saturating_sub(self.indent_level).max(1)
    }

    pub fn with_indent(&self, by: usize) -> Self {
        Self {
            indent_level: self.indent_level + by,
            ..*self
        }
    }

    fn with_restore<'b>(&self, restore: &'b str) -> RenderContext<'b>
    where
        'a: 'b,
    {
        RenderContext {
            width: self.width,
            indent_level: self.indent_level,
            theme: self.theme,
            interactive: self.interactive,
            terminal_width: self.terminal_width,
            heading_rule: self.heading_rule,
            highlighter: self.highlighter,
            restore,
        }
    }

    fn nested_restore(&self, style: &StyleFn) -> String {
        format!("{}{}", self.restore, style_prefix(&**style))
    }
}

pub fn render(tree: &Node, ctx: &RenderContext<'_>) -> String {
    render_block(tree, ctx).join("\n")
}

fn render_blocks(children: &[Node], ctx: &RenderContext<'_>, tight: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for child in children {
        let block = render_block(child, ctx);
        if block.is_empty() {
            continue;
        }
        if !lines.is_empty() && !tight {
            lines.push(String::new());
        }
        lines.extend(block);
    }
    lines
}

fn render_block(node: &Node, ctx: &RenderContext<'_>) -> Vec<String> {
    match node {
        Node::Root(root) => render_blocks(&root.children, ctx, false),
        Node::Paragraph(paragraph) => {
            layout::wrap(&render_inline(&paragraph.children, ctx), ctx.available(), "", None)
        }
        Node::Heading(heading) => render_heading(heading, ctx),
        Node::Code(code) => render_code(code, ctx),
        Node::List(list) => render_list(list, ctx),
        Node::Blockquote(blockquote) => render_blockquote(blockquote, ctx),
        Node::ThematicBreak(_) => {
            let rule = "─".repeat(ctx.available().min(MAX_RULE_WIDTH));
            vec![(ctx.theme.hr)(&rule)]
        }
        Node::Table(table) => render_table(table, ctx),
        Node::Html(html) => literal(html.value.trim_end(), ctx),
        Node::Math(math) => literal(&format!("$$\n{}\n$$", math.value), ctx),
        Node::FootnoteDefinition(definition) => {
            let mut lines = vec![format!("[^{}]:", definition.label.as_deref().unwrap_or(""))];
            lines.extend(
                render_blocks(&definition.children, &ctx.with_indent(2), false)
                    .into_iter()
                    .map(|line| prefix_line("  ", &line)),
            );
            lines
        }
        Node::Definition(_) => Vec::new(),
        Node::Text(_)
        | Node::Strong(_)
        | Node::Emphasis(_)
        | Node::Delete(_)
        | Node::InlineCode(_)
        | Node::InlineMath(_)
        | Node::Link(_)
        | Node::LinkReference(_)
        | Node::Image(_)
        | Node::ImageReference(_)
        | Node::FootnoteReference(_)
        | Node::Break(_) => layout::wrap(
            &render_inline(std::slice::from_ref(node), ctx),
            ctx.available(),
            "",
            None,
        ),
        other => other
            .children()
            .map(|children| render_blocks(children, ctx, false))
            .unwrap_or_default(),
    }
}

fn literal(source: &str, ctx: &RenderContext<'_>) -> Vec<String> {
    layout::wrap(&styled_lines(source, &ctx.theme.text), ctx.available(), "", None)
}

fn prefix_line(prefix: &str, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{prefix}{line}")
    }
}

/// Applies `style` to each `\n`-separated segment so no escape spans a line break.
fn styled_lines(text: &str, style: &StyleFn) -> String {
    text.split('\n')
        .map(|segment| style(segment))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_inline(nodes: &[Node], ctx: &RenderContext<'_>) -> String {
    let theme = ctx.theme;
    let mut out = String::new();

    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&styled_lines(&text.value, &theme.text)),
            Node::Strong(strong) => {
                out.push_str(&span(&strong.children, &theme.strong, ctx));
            }
            Node::Emphasis(emphasis) => {
                out.push_str(&span(&emphasis.children, &theme.emphasis, ctx));
            }
            Node::Delete(delete) => {
                out.push_str(&span(&delete.children, &theme.strikethrough, ctx));
            }
            Node::InlineCode(code) => {
                out.push_str(&(theme.code)(&code.value));
                out.push_str(ctx.restore);
            }
            Node::Link(link) => {
                out.push_str(&render_link(&link.children, &link.url, ctx));
            }
            Node::Break(_) => out.push('\n'),
            Node::Image(image) => {
                let alt = if image.alt.is_empty() {
                    image.url.as_str()
                } else {
                    image.alt.as_str()
                };
                out.push_str(&styled_lines(alt, &theme.text));
            }
            Node::InlineMath(math) => {
                out.push_str(&styled_lines(&format!("${}$", math.value), &theme.text));
            }
            Node::Html(html) => out.push_str(&styled_lines(&html.value, &theme.text)),
            Node::FootnoteReference(reference) => {
                let label = reference.label.as_deref().unwrap_or(&reference.identifier);
                out.push_str(&(theme.text)(&format!("[^{label}]")));
            }
            other => {
                if let Some(children) = other.children() {
                    out.push_str(&render_inline(children, ctx));
                }
            }
        }
    }

    out
}

/// Renders `children` inside `style`, then re-opens the enclosing style.
fn span(children: &[Node], style: &StyleFn, ctx: &RenderContext<'_>) -> String {
    let restore = ctx.nested_restore(style);
    let content = render_inline(children, &ctx.with_restore(&restore));
    format!("{}{}", style(&content), ctx.restore)
}

fn render_link(children: &[Node], url: &str, ctx: &RenderContext<'_>) -> String {
    let theme = ctx.theme;
    let restore = ctx.nested_restore(&theme.link);
    let text = render_inline(children, &ctx.with_restore(&restore));
    let styled = (theme.link)(&text);

    let mut out = if ctx.interactive {
        format!("\x1b]8;;{url}\x07{styled}{HYPERLINK_CLOSE}")
    } else {
        let plain = plain_text_from_nodes(children);
        let bare = url.strip_prefix("mailto:").unwrap_or(url);
        if plain == url || plain == bare {
            styled
        } else {
            format!("{styled} {}", (theme.link_url)(&format!("({url})")))
        }
    };
    out.push_str(ctx.restore);
    out
}

fn plain_text_from_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.value),
            Node::InlineCode(code) => out.push_str(&code.value),
            Node::Html(html) => out.push_str(&html.value),
            Node::Image(image) => out.push_str(&image.alt),
            other => {
                if let Some(children) = other.children() {
                    out.push_str(&plain_text_from_nodes(children));
                }
            }
        }
    }
    out
}

fn render_heading(heading: &Heading, ctx: &RenderContext<'_>) -> Vec<String> {
    let theme = ctx.theme;
    let style = match heading.depth {
        1 => &theme.heading1,
        2 => &theme.heading2,
        3 => &theme.heading3,
        _ => &theme.heading4,
    };

    let restore = ctx.nested_restore(style);
    let mut text = render_inline(&heading.children, &ctx.with_restore(&restore));
    if heading.depth >= 3 {
        text = format!("{} {text}", "#".repeat(usize::from(heading.depth)));
    }

    let rows = layout::wrap(&text, ctx.available(), "", None);
    let rule_width = rows
        .iter()
        .map(|row| visible_width(row))
        .max()
        .unwrap_or(0)
        .min(ctx.available());

    let mut lines: Vec<String> = rows.iter().map(|row| style(row)).collect();
    if ctx.heading_rule && heading.depth <= 2 && rule_width > 0 {
        let glyph = if heading.depth == 1 { "═" } else { "─" };
        lines.push((theme.underline)(&glyph.repeat(rule_width)));
    }
    lines
}

fn render_code(code: &Code, ctx: &RenderContext<'_>) -> Vec<String> {
    let theme = ctx.theme;
    let language = code.lang.as_deref();
    let highlighted = match ctx.highlighter {
        Some(highlighter) => highlighter.highlight(&code.value, language),
        None => HighlightedCode::plain(&code.value),
    };

    let lines: Vec<String> = if highlighted.highlighted {
        highlighted.lines
    } else {
        highlighted
            .lines
            .iter()
            .map(|line| (theme.code_block)(line))
            .collect()
    };

    let chrome = BoxChrome {
        border: &*theme.code_block_border,
        label: &*theme.code_label,
    };
    layout::box_code(
        &lines,
        ctx.available(),
        language.unwrap_or(""),
        ctx.terminal_width,
        &chrome,
    )
}

fn render_list(list: &List, ctx: &RenderContext<'_>) -> Vec<String> {
    let theme = ctx.theme;
    let start = list.start.unwrap_or(1);
    let mut lines = Vec::new();

    for (idx, node) in list.children.iter().enumerate() {
        let Node::ListItem(item) = node else {
            continue;
        };

        let (glyph, style) = if list.ordered {
            (format!("{}.", start + idx as u32), &theme.list_number)
        } else {
            (theme.bullet.clone(), &theme.list_bullet)
        };
        let mut marker = format!("{} ", style(&glyph));
        if let Some(checked) = item.checked {
            marker.push_str(if checked { "[x] " } else { "[ ] " });
        }
        let hanging = " ".repeat(visible_width(&marker));

        if idx > 0 && list.spread {
            lines.push(String::new());
        }
        lines.extend(render_list_item(item, &marker, &hanging, ctx));
    }
    lines
}

fn render_list_item(
    item: &ListItem,
    marker: &str,
    hanging: &str,
    ctx: &RenderContext<'_>,
) -> Vec<String> {
    let inner = ctx.with_indent(hanging.len());
    let mut children = item.children.as_slice();
    let mut lines = Vec::new();

    if let Some((Node::Paragraph(paragraph), rest)) = children.split_first() {
        let text = render_inline(&paragraph.children, ctx);
        lines.extend(layout::wrap(&text, ctx.available(), marker, Some(hanging)));
        children = rest;
    }

    for child in children {
        let block = render_block(child, &inner);
        if block.is_empty() {
            continue;
        }
        if item.spread && !lines.is_empty() {
            lines.push(String::new());
        }
        for line in block {
            let prefix = if lines.is_empty() { marker } else { hanging };
            lines.push(prefix_line(prefix, &line));
        }
    }

    if lines.is_empty() {
        lines.push(marker.trim_end().to_string());
    }
    lines
}

fn render_blockquote(blockquote: &Blockquote, ctx: &RenderContext<'_>) -> Vec<String> {
    let theme = ctx.theme;
    let restore = ctx.nested_restore(&theme.blockquote);
    let inner = ctx.with_indent(2);
    let reopened = format!("{RESET}{restore}");
    render_blocks(&blockquote.children, &inner.with_restore(&restore), false)
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                return (theme.blockquote)(">");
            }
            // Code box rows reset before their right border.
            let line = if restore.is_empty() {
                line
            } else {
                line.replace(RESET, &reopened)
            };
            (theme.blockquote)(&format!("> {line}"))
        })
        .collect()
}

fn render_table(table: &Table, ctx: &RenderContext<'_>) -> Vec<String> {
    let theme = ctx.theme;
    let rows: Vec<Vec<String>> = table
        .children
        .iter()
        .filter_map(|row| match row {
            Node::TableRow(row) => Some(
                row.children
                    .iter()
                    .map(|cell| {
                        render_inline(cell.children().map(Vec::as_slice).unwrap_or_default(), ctx)
                    })
                    .collect(),
            ),
            _ => None,
        })
        .collect();
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };

    let aligns: Vec<Align> = table
        .align
        .iter()
        .map(|align| match align {
            AlignKind::Right => Align::Right,
            AlignKind::Center => Align::Center,
            AlignKind::Left | AlignKind::None => Align::Left,
        })
        .collect();
    let style = TableStyle {
        border: &*theme.table_border,
        header: &*theme.strong,
    };

    layout_table(header, body, &aligns, ctx.available(), &style).unwrap_or_else(|| {
        let source = rows
            .iter()
            .map(|row| format!("| {} |", row.join(" | ")))
            .collect::<Vec<_>>()
            .join("\n");
        layout::wrap(&source, ctx.available(), "", None)
    })
}
