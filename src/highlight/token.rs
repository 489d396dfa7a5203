//! Normalization of grammar-engine tokens into styled text.
//!
//! Engines disagree on where a token's color lives. [`RawToken`] carries every shape we accept
//! and [`Token::from_raw`] resolves them in one place, in priority order:
//! direct `color` field, then the nested style object's `color`, then a `color:` declaration
//! inside an inline CSS-like style string.

use std::collections::BTreeMap;

pub const FONT_ITALIC: u8 = 0b001;
pub const FONT_BOLD: u8 = 0b010;
pub const FONT_UNDERLINE: u8 = 0b100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawToken {
    pub content: String,
    pub color: Option<String>,
    pub style: Option<BTreeMap<String, String>>,
    pub html_style: Option<String>,
    /// Bit 0 italic, bit 1 bold, bit 2 underline.
    pub font_style: Option<u8>,
}

impl RawToken {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub content: String,
    pub color: Option<Rgb>,
    pub font_style: u8,
}

impl Token {
    pub fn from_raw(raw: RawToken) -> Self {
        let color = resolve_color(&raw);
        Self {
            content: raw.content,
            color,
            font_style: raw.font_style.unwrap_or(0),
        }
    }

    pub fn render(&self) -> String {
        if self.content.is_empty() {
            return String::new();
        }

        let mut styled = self.content.clone();
        if self.font_style & FONT_ITALIC != 0 {
            styled = format!("\x1b[3m{styled}\x1b[23m");
        }
        if self.font_style & FONT_BOLD != 0 {
            styled = format!("\x1b[1m{styled}\x1b[22m");
        }
        if self.font_style & FONT_UNDERLINE != 0 {
            styled = format!("\x1b[4m{styled}\x1b[24m");
        }
        if let Some(Rgb(r, g, b)) = self.color {
            styled = format!("\x1b[38;2;{r};{g};{b}m{styled}\x1b[39m");
        }
        styled
    }
}

/// Renders one line of raw tokens.
pub fn render_line(tokens: Vec<RawToken>) -> String {
    tokens
        .into_iter()
        .map(|raw| Token::from_raw(raw).render())
        .collect()
}

fn resolve_color(raw: &RawToken) -> Option<Rgb> {
    raw.color
        .as_deref()
        .and_then(parse_hex_color)
        .or_else(|| {
            raw.style
                .as_ref()
                .and_then(|style| style.get("color"))
                .and_then(|color| parse_hex_color(color))
        })
        .or_else(|| raw.html_style.as_deref().and_then(color_from_css))
}

/// Parses `#rgb`, `#rrggbb`, or `#rrggbbaa` (alpha ignored).
pub fn parse_hex_color(value: &str) -> Option<Rgb> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Rgb(digits.next()??, digits.next()??, digits.next()??))
        }
        6 | 8 => Some(Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn color_from_css(style: &str) -> Option<Rgb> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        if property.trim().eq_ignore_ascii_case("color") {
            parse_hex_color(value)
        } else {
            None
        }
    })
}
