use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate};
use std::cmp::Ordering;
use tui_input::Input;

use crate::data::value::CellValue;
use crate::data::value_compare::compare_values;
use crate::grid::column::{ColumnSpec, ColumnType, SelectOption};
use crate::grid::view_state::CellRef;

/// Editor widget state for the one cell being edited
#[derive(Debug, Clone)]
pub enum CellEditor {
    /// Free text; commits on Enter/blur, cancels on Escape
    Text { input: Input, column_type: ColumnType },

    /// Commits the negated value on the first toggle
    Checkbox { checked: bool },

    /// Commits on the first choice and closes
    Select {
        options: Vec<SelectOption>,
        cursor: usize,
    },

    /// Commits on every toggle and stays open until closed explicitly
    MultiSelect {
        options: Vec<SelectOption>,
        cursor: usize,
        chosen: Vec<CellValue>,
    },
}

impl CellEditor {
    /// Pick the editor for a column type, seeded from the current value
    pub fn open(column: &ColumnSpec, value: &CellValue) -> Self {
        match column.column_type {
            ColumnType::Boolean => CellEditor::Checkbox {
                checked: value.as_bool(),
            },
            ColumnType::Dropdown => {
                let cursor = column
                    .dropdown_options
                    .iter()
                    .position(|opt| opt.value.matches(value))
                    .unwrap_or(0);
                CellEditor::Select {
                    options: column.dropdown_options.clone(),
                    cursor,
                }
            }
            ColumnType::Multidropdown => CellEditor::MultiSelect {
                options: column.dropdown_options.clone(),
                cursor: 0,
                chosen: match value {
                    CellValue::List(items) => items.clone(),
                    _ => Vec::new(),
                },
            },
            column_type => {
                let text = value.to_string();
                let cursor = text.chars().count();
                CellEditor::Text {
                    input: Input::new(text).with_cursor(cursor),
                    column_type,
                }
            }
        }
    }

    /// Whether a commit from this editor closes it
    pub fn closes_on_commit(&self) -> bool {
        !matches!(self, CellEditor::MultiSelect { .. })
    }

    pub fn input(&self) -> Option<&Input> {
        match self {
            CellEditor::Text { input, .. } => Some(input),
            _ => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut Input> {
        match self {
            CellEditor::Text { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Move the option cursor of a select editor, clamped to the list
    pub fn move_cursor(&mut self, delta: isize) {
        if let CellEditor::Select { options, cursor } | CellEditor::MultiSelect { options, cursor, .. } = self {
            if options.is_empty() {
                return;
            }
            let max = options.len() as isize - 1;
            *cursor = (*cursor as isize + delta).clamp(0, max) as usize;
        }
    }

    pub fn highlighted(&self) -> Option<&SelectOption> {
        match self {
            CellEditor::Select { options, cursor } | CellEditor::MultiSelect { options, cursor, .. } => {
                options.get(*cursor)
            }
            _ => None,
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        match self {
            CellEditor::Select { options, .. } | CellEditor::MultiSelect { options, .. } => {
                options.as_slice()
            }
            _ => &[],
        }
    }

    pub fn is_chosen(&self, option: &SelectOption) -> bool {
        match self {
            CellEditor::MultiSelect { chosen, .. } => chosen.iter().any(|v| option.value.matches(v)),
            _ => false,
        }
    }

    /// Flip one option of a multi-select and return the new list value.
    /// `2` and `2.0` count as the same option.
    pub fn toggle_chosen(&mut self, value: &CellValue) -> Option<CellValue> {
        match self {
            CellEditor::MultiSelect { chosen, .. } => {
                let before = chosen.len();
                chosen.retain(|v| compare_values(v, value) != Ordering::Equal);
                if chosen.len() == before {
                    chosen.push(value.clone());
                }
                Some(CellValue::List(chosen.clone()))
            }
            _ => None,
        }
    }

    /// Re-seed an open multi-select after its cell changed underneath it
    pub fn resync(&mut self, value: &CellValue) {
        if let CellEditor::MultiSelect { chosen, .. } = self {
            *chosen = match value {
                CellValue::List(items) => items.clone(),
                _ => Vec::new(),
            };
        }
    }
}

/// Convert typed text into a value for the given column type
pub fn parse_text_value(text: &str, column_type: ColumnType) -> Result<CellValue> {
    match column_type {
        ColumnType::Number => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(CellValue::Null);
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(CellValue::Integer(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(CellValue::Float(f)),
                _ => bail!("'{}' is not a number", trimmed),
            }
        }
        ColumnType::Date => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(CellValue::Null);
            }
            if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
                || DateTime::parse_from_rfc3339(trimmed).is_ok()
            {
                Ok(CellValue::Date(trimmed.to_string()))
            } else {
                bail!("'{}' is not a date (expected YYYY-MM-DD)", trimmed)
            }
        }
        _ => Ok(CellValue::Text(text.to_string())),
    }
}

/// The open editor and the cell it targets
#[derive(Debug, Clone)]
pub struct EditSession {
    pub target: CellRef,
    pub editor: CellEditor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::column::SelectOption;

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_text_value("42", ColumnType::Number).unwrap(), CellValue::Integer(42));
        assert_eq!(parse_text_value(" 2.5 ", ColumnType::Number).unwrap(), CellValue::Float(2.5));
        assert_eq!(parse_text_value("", ColumnType::Number).unwrap(), CellValue::Null);
        assert!(parse_text_value("abc", ColumnType::Number).is_err());
        assert!(parse_text_value("NaN", ColumnType::Number).is_err());
    }

    #[test]
    fn test_text_keeps_empty_string() {
        assert_eq!(parse_text_value("", ColumnType::Text).unwrap(), CellValue::text(""));
    }

    #[test]
    fn test_date_parsing() {
        assert!(parse_text_value("2024-02-30", ColumnType::Date).is_err());
        assert_eq!(
            parse_text_value("2024-02-29", ColumnType::Date).unwrap(),
            CellValue::Date("2024-02-29".to_string())
        );
    }

    #[test]
    fn test_select_cursor_starts_at_current_value() {
        let column = ColumnSpec::new("status", "Status")
            .with_type(ColumnType::Dropdown)
            .with_dropdown_options(vec![
                SelectOption::new("todo", "To do"),
                SelectOption::new("done", "Done"),
            ]);
        let mut editor = CellEditor::open(&column, &CellValue::text("done"));
        assert_eq!(editor.highlighted().map(|o| o.label.as_str()), Some("Done"));
        editor.move_cursor(5);
        assert_eq!(editor.highlighted().map(|o| o.label.as_str()), Some("Done"));
        editor.move_cursor(-3);
        assert_eq!(editor.highlighted().map(|o| o.label.as_str()), Some("To do"));
    }

    #[test]
    fn test_multi_select_toggles() {
        let column = ColumnSpec::new("tags", "Tags").with_type(ColumnType::Multidropdown);
        let mut editor = CellEditor::open(&column, &CellValue::List(vec![CellValue::text("a")]));
        assert!(!editor.closes_on_commit());
        assert_eq!(
            editor.toggle_chosen(&CellValue::text("b")),
            Some(CellValue::List(vec![CellValue::text("a"), CellValue::text("b")]))
        );
        assert_eq!(
            editor.toggle_chosen(&CellValue::text("a")),
            Some(CellValue::List(vec![CellValue::text("b")]))
        );
    }

    #[test]
    fn test_toggle_treats_float_as_integer_option() {
        let column = ColumnSpec::new("ids", "Ids").with_type(ColumnType::Multidropdown);
        let mut editor = CellEditor::open(&column, &CellValue::List(vec![CellValue::Float(2.0)]));
        assert_eq!(editor.toggle_chosen(&CellValue::Integer(2)), Some(CellValue::List(vec![])));
    }

    #[test]
    fn test_resync_replaces_chosen() {
        let column = ColumnSpec::new("tags", "Tags").with_type(ColumnType::Multidropdown);
        let mut editor = CellEditor::open(&column, &CellValue::Null);
        editor.toggle_chosen(&CellValue::text("a"));
        editor.resync(&CellValue::List(vec![]));
        assert_eq!(
            editor.toggle_chosen(&CellValue::text("b")),
            Some(CellValue::List(vec![CellValue::text("b")]))
        );
    }

    #[test]
    fn test_text_editor_seeded_with_value() {
        let column = ColumnSpec::new("age", "Age").with_type(ColumnType::Number);
        let editor = CellEditor::open(&column, &CellValue::Integer(30));
        assert_eq!(editor.input().map(|i| i.value()), Some("30"));
    }
}
