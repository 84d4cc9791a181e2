//! Text rendering of the tally table.
//!
//! The output is a plain text block, one `\n` per line. The terminal shell is
//! responsible for translating line breaks for raw mode.

use std::fmt::Write as _;

use super::model::{Mode, TallyModel};
use crate::core::config::RenderConfig;
use crate::store::Record;

/// Footer shown under every table.
pub const HELP_HINT: &str = "Press the '?' key for help.";

const ENTRY_SEPARATOR: &str = "- - -";

/// Render the full display block for the current model.
#[must_use]
pub fn render(model: &TallyModel, config: &RenderConfig) -> String {
    let mut out = String::new();

    if let Some(header) = entry_header(model) {
        out.push_str(&header);
        out.push('\n');
        out.push_str(ENTRY_SEPARATOR);
        out.push('\n');
    }

    let rows = model.store.ordered_view();
    let width = column_width(&rows, config);
    for record in rows {
        let cell = label_cell(record);
        let pad = width.saturating_sub(cell.chars().count());
        let _ = writeln!(out, "{cell}{:pad$}{}", "", record.count, pad = pad);
    }

    out.push('\n');
    out.push_str(HELP_HINT);
    out.push('\n');
    out
}

/// Header line for relabel or number entry; `None` in normal mode.
#[must_use]
pub fn entry_header(model: &TallyModel) -> Option<String> {
    let key = model.selected?;
    let (label, count) = model
        .store
        .get(key)
        .map_or_else(|| (key.to_string(), 0), |r| (r.label.clone(), r.count));

    match &model.mode {
        Mode::Normal => None,
        Mode::RelabelEntry { buffer } => Some(format!("relabel {label} ({key}) as: {buffer}")),
        Mode::NumberEntry { buffer, sign } => Some(format!(
            "{label} ({key}) = {count} {} {buffer}",
            sign.symbol()
        )),
    }
}

fn label_cell(record: &Record) -> String {
    format!("{} ({}):", record.label, record.key)
}

fn column_width(rows: &[&Record], config: &RenderConfig) -> usize {
    let widest = rows
        .iter()
        .map(|r| label_cell(r).chars().count())
        .max()
        .unwrap_or(0);
    config
        .min_column_width
        .max(widest.saturating_add(config.column_padding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::update::update_all;

    fn rendered(input: &str) -> String {
        let mut model = TallyModel::default();
        update_all(&mut model, input);
        render(&model, &RenderConfig::default())
    }

    fn body_lines(out: &str) -> Vec<&str> {
        out.lines()
            .take_while(|line| !line.is_empty())
            .filter(|line| *line != ENTRY_SEPARATOR && line.contains("):"))
            .collect()
    }

    #[test]
    fn empty_store_renders_only_footer() {
        assert_eq!(rendered(""), format!("\n{HELP_HINT}\n"));
    }

    #[test]
    fn single_key_counts() {
        let out = rendered("aaa");
        assert_eq!(body_lines(&out), vec![format!("{:<20}3", "a (a):")]);
        assert!(out.ends_with(&format!("\n\n{HELP_HINT}\n")));
    }

    #[test]
    fn rows_sorted_by_count_then_label() {
        let out = rendered("bccca");
        let rows: Vec<String> = body_lines(&out)
            .iter()
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        assert_eq!(rows, vec!["c (c): 3", "a (a): 1", "b (b): 1"]);
    }

    #[test]
    fn long_labels_widen_the_column() {
        let out = rendered("a=a really quite long label\rbb");
        let lines = body_lines(&out);
        let cell = "a really quite long label (a):";
        let width = cell.chars().count() + 4;
        assert_eq!(lines[0], format!("{:<width$}2", "b (b):"));
        assert_eq!(lines[1], format!("{cell}    0"));
    }

    #[test]
    fn relabel_header_shows_buffer() {
        let out = rendered("a=app");
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("relabel a (a) as: app"));
        assert_eq!(lines.next(), Some(ENTRY_SEPARATOR));
    }

    #[test]
    fn number_header_shows_sign_and_current_count() {
        let out = rendered("aa-4");
        assert_eq!(out.lines().next(), Some("a (a) = 2 - 4"));
        let out = rendered("aa+");
        assert_eq!(out.lines().next(), Some("a (a) = 2 + "));
    }

    #[test]
    fn normal_mode_has_no_header() {
        let mut model = TallyModel::default();
        update_all(&mut model, "a+3\r");
        assert!(entry_header(&model).is_none());
    }

    #[test]
    fn render_is_stable_and_pure() {
        let mut model = TallyModel::default();
        update_all(&mut model, "zyxzy");
        let before: Vec<char> = model.store.iter().map(|r| r.key).collect();
        let first = render(&model, &RenderConfig::default());
        let second = render(&model, &RenderConfig::default());
        assert_eq!(first, second);
        let after: Vec<char> = model.store.iter().map(|r| r.key).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn custom_column_settings_apply() {
        let mut model = TallyModel::default();
        update_all(&mut model, "a");
        let config = RenderConfig {
            min_column_width: 1,
            column_padding: 1,
        };
        assert!(render(&model, &config).starts_with("a (a): 1\n"));
    }
}
