use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{self, Write};

use encoding_rs::Encoding;
use log::warn;

use crate::{aggregate::AggregateResult, data::Row, decimal::looks_numeric, io_utils};

pub const EMPTY_RESULT_MESSAGE: &str = "[csvtool] Result is empty.";
const EMPTY_RESULT_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Renders a pipe table, right-aligning columns whose cells all look numeric.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let alignments = infer_alignments(headers.len(), rows);
    render_aligned_table(headers, rows, &alignments)
}

pub fn render_aligned_table(
    headers: &[String],
    rows: &[Vec<String>],
    alignments: &[Alignment],
) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();

    // Header
    let header_line = format_row(headers, &widths, alignments);
    let _ = writeln!(output, "{header_line}");

    // Separator
    let mut separator_line = String::from("|");
    for width in &widths {
        separator_line.push_str(&"-".repeat(width + 2));
        separator_line.push('|');
    }
    let _ = writeln!(output, "{separator_line}");

    // Rows
    for row in rows {
        let row_line = format_row(row, &widths, alignments);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

/// Renders rows with one column per key of the first row, in that row's order.
/// Rows sharing that header are laid out by position, so repeated column
/// names each keep their own cell.
pub fn render_rows(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return render_empty();
    };
    let headers = first.columns().to_vec();
    let cells = rows
        .iter()
        .map(|row| {
            if row.columns() == headers.as_slice() {
                return row.values().to_vec();
            }
            headers
                .iter()
                .map(|header| row.get(header).unwrap_or_default().to_string())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_table(&headers, &cells)
}

pub fn render_aggregate(result: &AggregateResult) -> String {
    let headers = ["column", "function", "value"].map(String::from);
    let row = vec![
        result.column.clone(),
        result.function.clone(),
        result.value.clone(),
    ];
    render_aligned_table(
        &headers,
        &[row],
        &[Alignment::Left, Alignment::Left, Alignment::Right],
    )
}

pub fn render_empty() -> String {
    let mut line = center(EMPTY_RESULT_MESSAGE, EMPTY_RESULT_WIDTH, '-');
    line.push('\n');
    line
}

/// Writes `text` encoded with `encoding`. Unrepresentable characters are
/// substituted and write failures are logged rather than propagated.
pub fn write_output<W: Write>(out: &mut W, text: &str, encoding: &'static Encoding) {
    let (bytes, substituted) = io_utils::encode_lossy(text, encoding);
    if substituted {
        warn!(
            "Output contains characters not representable in {}; replaced with '{}'",
            encoding.name(),
            io_utils::SUBSTITUTE_CHAR
        );
    }
    if let Err(err) = out.write_all(&bytes).and_then(|()| out.flush()) {
        warn!("Failed to write output: {err}");
    }
}

pub fn print_output(text: &str, encoding: &'static Encoding) {
    let mut stdout = io::stdout().lock();
    write_output(&mut stdout, text, encoding);
}

fn infer_alignments(column_count: usize, rows: &[Vec<String>]) -> Vec<Alignment> {
    (0..column_count)
        .map(|idx| {
            let mut cells = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .filter(|cell| !cell.trim().is_empty())
                .peekable();
            if cells.peek().is_some() && cells.all(|cell| looks_numeric(cell)) {
                Alignment::Right
            } else {
                Alignment::Left
            }
        })
        .collect()
}

fn format_row(values: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let mut line = String::from("|");
    for (idx, width) in widths.iter().enumerate() {
        let sanitized = sanitize_cell(values.get(idx).map(String::as_str).unwrap_or_default());
        let padding = " ".repeat(width.saturating_sub(display_width(&sanitized)));
        line.push(' ');
        match alignments.get(idx).copied().unwrap_or(Alignment::Left) {
            Alignment::Left => {
                line.push_str(&sanitized);
                line.push_str(&padding);
            }
            Alignment::Right => {
                line.push_str(&padding);
                line.push_str(&sanitized);
            }
        }
        line.push_str(" |");
    }
    line
}

/// Centers `text` in `width` characters of `fill`; odd padding goes right
/// unless both the padding and the width are odd.
fn center(text: &str, width: usize, fill: char) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let margin = width - len;
    let left = margin / 2 + (margin & width & 1);
    let right = margin - left;
    let mut line = String::with_capacity(width);
    line.extend(std::iter::repeat_n(fill, left));
    line.push_str(text);
    line.extend(std::iter::repeat_n(fill, right));
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
