//! GFM table layout with box-drawing borders.

use crate::core::text::ansi::{contains_escape, RESET};
use crate::core::text::slice::{hard_break, wrap_text_with_ansi};
use crate::core::text::utils::{align_to_width, Align};
use crate::core::text::width::visible_width;

const MAX_UNBROKEN_WORD: usize = 30;

pub struct TableStyle<'a> {
    pub border: &'a dyn Fn(&str) -> String,
    pub header: &'a dyn Fn(&str) -> String,
}

/// Lays out pre-rendered cells into bordered rows no wider than `width`.
///
/// Returns `None` when `width` cannot give every column at least one column of content.
pub fn layout_table(
    header: &[String],
    rows: &[Vec<String>],
    aligns: &[Align],
    width: usize,
    style: &TableStyle<'_>,
) -> Option<Vec<String>> {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return Some(Vec::new());
    }

    let available = width
        .checked_sub(3 * columns + 1)
        .filter(|available| *available >= columns)?;

    let mut natural = vec![0usize; columns];
    let mut minimum = vec![1usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for col in 0..columns {
            let text = cell(row, col);
            natural[col] = natural[col].max(visible_width(text));
            minimum[col] = minimum[col].max(longest_word(text).min(MAX_UNBROKEN_WORD));
        }
    }
    let widths = column_widths(&natural, &minimum, available);

    let rule = |left: &str, mid: &str, right: &str| {
        let runs: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        (style.border)(&format!("{left}─{}─{right}", runs.join(&format!("─{mid}─"))))
    };

    let mut lines = vec![rule("┌", "┬", "┐")];
    lines.extend(render_row(header, &widths, aligns, Some(style.header), style.border));
    lines.push(rule("├", "┼", "┤"));
    for row in rows {
        lines.extend(render_row(row, &widths, aligns, None, style.border));
    }
    lines.push(rule("└", "┴", "┘"));
    Some(lines)
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

fn longest_word(text: &str) -> usize {
    text.split_whitespace().map(visible_width).max().unwrap_or(0)
}

fn column_widths(natural: &[usize], minimum: &[usize], available: usize) -> Vec<usize> {
    let fitted: Vec<usize> = natural.iter().map(|w| (*w).max(1)).collect();
    if fitted.iter().sum::<usize>() <= available {
        return fitted;
    }

    let minimum_total: usize = minimum.iter().sum();
    if minimum_total >= available {
        let mut widths = vec![1usize; minimum.len()];
        let weights: Vec<usize> = minimum.iter().map(|m| m - 1).collect();
        distribute(&mut widths, available - minimum.len(), &weights);
        return widths;
    }

    let mut widths = minimum.to_vec();
    let growth: Vec<usize> = natural
        .iter()
        .zip(minimum)
        .map(|(natural, min)| natural.saturating_sub(*min))
        .collect();
    distribute(&mut widths, available - minimum_total, &growth);
    widths
}

/// Adds `extra` columns across `widths` proportionally to `weights`.
fn distribute(widths: &mut [usize], extra: usize, weights: &[usize]) {
    let total: usize = weights.iter().sum();
    if total == 0 {
        let count = widths.len();
        for idx in 0..extra {
            widths[idx % count] += 1;
        }
        return;
    }

    let mut given = 0;
    for (width, weight) in widths.iter_mut().zip(weights) {
        let share = extra * weight / total;
        *width += share;
        given += share;
    }
    let mut leftover = extra - given;
    for (width, weight) in widths.iter_mut().zip(weights) {
        if leftover == 0 {
            break;
        }
        if *weight > 0 {
            *width += 1;
            leftover -= 1;
        }
    }
}

fn render_row(
    row: &[String],
    widths: &[usize],
    aligns: &[Align],
    header: Option<&dyn Fn(&str) -> String>,
    border: &dyn Fn(&str) -> String,
) -> Vec<String> {
    let wrapped: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(col, width)| {
            wrap_text_with_ansi(cell(row, col), *width)
                .iter()
                .flat_map(|piece| hard_break(piece, *width))
                .collect()
        })
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

    let bar = border("│");
    (0..height)
        .map(|line| {
            let parts: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(col, width)| {
                    let mut text = wrapped[col].get(line).cloned().unwrap_or_default();
                    if contains_escape(&text) {
                        text.push_str(RESET);
                    }
                    if let Some(header) = header {
                        text = header(&text);
                    }
                    align_to_width(&text, *width, aligns.get(col).copied().unwrap_or_default())
                })
                .collect();
            format!("{bar} {} {bar}", parts.join(&format!(" {bar} ")))
        })
        .collect()
}
