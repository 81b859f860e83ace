//! Markdown rendering of the block model.
//!
//! Rendering is a pure fold: each block becomes a fragment, fragments are joined
//! with a blank line, and consecutive list items are joined with a single newline
//! so they form one tight list. Fragments that render empty are dropped.

use crate::types::{Block, InlineRun, Table};

/// Render blocks to a Markdown string.
pub fn render_markdown(blocks: &[Block]) -> String {
    let mut output = String::new();
    let mut previous_was_list = false;

    for block in blocks {
        let fragment = render_block(block);
        if fragment.is_empty() {
            continue;
        }

        let is_list = matches!(block, Block::ListItem { .. });
        if !output.is_empty() {
            output.push_str(if is_list && previous_was_list { "\n" } else { "\n\n" });
        }
        output.push_str(&fragment);
        previous_was_list = is_list;
    }

    output
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, runs } => {
            let text = render_runs(runs).replace(['\r', '\n'], " ");
            let text = text.trim();
            if text.is_empty() {
                return String::new();
            }
            format!("{} {}", "#".repeat(usize::from((*level).clamp(1, 6))), text)
        }
        Block::Paragraph { runs } => {
            let text = render_runs(runs);
            if text.trim().is_empty() { String::new() } else { text }
        }
        Block::ListItem { depth, ordered, runs } => {
            let text = render_runs(runs).replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return String::new();
            }
            let marker = if *ordered { "1." } else { "-" };
            format!("{}{} {}", "  ".repeat(usize::from(*depth)), marker, text)
        }
        Block::Table(table) => render_table(table),
        Block::Image { image, alt } => format!("![{}]({})", escape_alt(alt), image.data_uri()),
        Block::PageBreak => "---".to_string(),
        Block::Raw { markdown } => markdown.clone(),
    }
}

/// Render a run sequence, merging neighbours that share a style first.
pub fn render_runs(runs: &[InlineRun]) -> String {
    let mut merged: Vec<InlineRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.same_style(run) => last.text.push_str(&run.text),
            _ => merged.push(run.clone()),
        }
    }

    let mut output = String::new();
    for run in &merged {
        push_run(&mut output, run);
    }
    output
}

fn push_run(output: &mut String, run: &InlineRun) {
    if !run.bold && !run.italic {
        output.push_str(&run.text);
        return;
    }

    let core = run.text.trim();
    if core.is_empty() {
        output.push_str(&run.text);
        return;
    }

    let leading = &run.text[..run.text.len() - run.text.trim_start().len()];
    let trailing = &run.text[run.text.trim_end().len()..];

    output.push_str(leading);
    if run.bold {
        output.push_str("**");
    }
    if run.italic {
        output.push('*');
    }
    output.push_str(core);
    if run.italic {
        output.push('*');
    }
    if run.bold {
        output.push_str("**");
    }
    output.push_str(trailing);
}

fn render_table(table: &Table) -> String {
    let columns = table.column_count();
    if table.rows.is_empty() || columns == 0 {
        return String::new();
    }

    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    let mut rows = table.rows.iter();

    if table.header {
        if let Some(header) = rows.next() {
            lines.push(render_row(header, columns));
        }
    } else {
        lines.push(render_row(&[], columns));
    }
    lines.push(format!("|{}", " --- |".repeat(columns)));

    for row in rows {
        lines.push(render_row(row, columns));
    }

    lines.join("\n")
}

fn render_row(cells: &[Vec<InlineRun>], columns: usize) -> String {
    let mut line = String::from("|");
    for index in 0..columns {
        let text = cells.get(index).map(|cell| render_cell(cell)).unwrap_or_default();
        line.push(' ');
        line.push_str(&text);
        line.push_str(" |");
    }
    line
}

fn render_cell(runs: &[InlineRun]) -> String {
    let text = render_runs(runs);
    let mut escaped = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        match ch {
            '|' => escaped.push_str("\\|"),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("<br>"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_alt(alt: &str) -> String {
    alt.replace(['\r', '\n'], " ").replace('[', "\\[").replace(']', "\\]")
}
