//! Markdown rendering.
//!
//! Escaping for text placed in Markdown and GitHub Flavored Markdown pipe
//! tables with padded columns. Columns whose cells are all numeric are
//! right-aligned.

/// Characters that have special meaning in Markdown and need escaping.
const MARKDOWN_SPECIAL_CHARS: &[char] = &['\\', '*', '_', '[', ']', '<', '>', '|', '`'];

/// Escape Markdown special characters in text content.
///
/// Newlines are replaced by spaces, since a table cell cannot span lines.
///
/// # Examples
///
/// ```
/// use page_inspector::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("*not italic*"), r"\*not italic\*");
/// assert_eq!(escape_markdown("a | b"), r"a \| b");
/// ```
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 4);

    for ch in text.chars() {
        match ch {
            '\r' => {}
            '\n' => result.push(' '),
            c if MARKDOWN_SPECIAL_CHARS.contains(&c) => {
                result.push('\\');
                result.push(c);
            }
            c => result.push(c),
        }
    }

    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Left,
    Right,
}

fn is_numeric(cell: &str) -> bool {
    let trimmed = cell.trim().trim_end_matches('%').replace(',', "");
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
}

fn column_alignment(rows: &[Vec<String>], col: usize) -> Alignment {
    let mut cells = rows.iter().filter_map(|r| r.get(col)).filter(|c| !c.trim().is_empty()).peekable();
    if cells.peek().is_some() && cells.all(|c| is_numeric(c)) {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

/// Render a GitHub Flavored Markdown table.
///
/// ```text
/// | Header A | Header B |
/// | -------- | -------: |
/// | Cell 1   |        2 |
/// ```
#[must_use]
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let col_count = headers.len();
    let escaped_headers: Vec<String> = headers.iter().map(|h| escape_markdown(h)).collect();
    let escaped_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| (0..col_count).map(|i| row.get(i).map(|c| escape_markdown(c)).unwrap_or_default()).collect())
        .collect();

    // Minimum width for ---
    let mut col_widths: Vec<usize> = escaped_headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &escaped_rows {
        for (i, cell) in row.iter().enumerate() {
            col_widths[i] = col_widths[i].max(cell.chars().count());
        }
    }
    let alignments: Vec<Alignment> = (0..col_count).map(|i| column_alignment(rows, i)).collect();

    let mut output = String::new();
    push_row(&mut output, &escaped_headers, &col_widths, &[]);

    output.push('|');
    for (width, align) in col_widths.iter().zip(&alignments) {
        output.push_str(&format_separator(*width, *align));
        output.push('|');
    }
    output.push('\n');

    for row in &escaped_rows {
        push_row(&mut output, row, &col_widths, &alignments);
    }

    output
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize], alignments: &[Alignment]) {
    output.push('|');
    for (i, cell) in cells.iter().enumerate() {
        let align = alignments.get(i).copied().unwrap_or(Alignment::Left);
        output.push(' ');
        output.push_str(&pad_cell(cell, widths[i], align));
        output.push_str(" |");
    }
    output.push('\n');
}

fn format_separator(width: usize, align: Alignment) -> String {
    let dashes = width.max(3);
    match align {
        Alignment::Right => format!(" {}: ", "-".repeat(dashes - 1)),
        Alignment::Left => format!(" {} ", "-".repeat(dashes)),
    }
}

fn pad_cell(text: &str, width: usize, align: Alignment) -> String {
    let text_len = text.chars().count();
    if text_len >= width {
        return text.to_string();
    }

    let padding = " ".repeat(width - text_len);
    match align {
        Alignment::Right => format!("{padding}{text}"),
        Alignment::Left => format!("{text}{padding}"),
    }
}
