use std::cmp::Ordering;

use crate::data::record::Record;
use crate::data::value::CellValue;
use crate::data::value_compare::compare_values;
use crate::grid::column::{ColumnSpec, ColumnType, FooterAggregate};

pub const PLACEHOLDER: &str = "Select...";

/// Text shown for a cell that is not being edited
pub fn display_cell(column: &ColumnSpec, row: &Record, position: usize, use_glyphs: bool) -> String {
    let value = row.value(&column.key);

    if let Some(renderer) = &column.renderer {
        return renderer.render(value, row, position);
    }

    match column.column_type {
        ColumnType::Dropdown => match column.find_option(value) {
            Some(option) => option.label.clone(),
            None if value.is_empty() => PLACEHOLDER.to_string(),
            None => value.to_string(),
        },
        ColumnType::Multidropdown => {
            let labels: Vec<&str> = match value {
                CellValue::List(items) => column
                    .dropdown_options
                    .iter()
                    .filter(|opt| items.iter().any(|v| opt.value.matches(v)))
                    .map(|opt| opt.label.as_str())
                    .collect(),
                _ => Vec::new(),
            };
            match labels.len() {
                0 => PLACEHOLDER.to_string(),
                1 | 2 => labels.join(", "),
                n => format!("{} selected", n),
            }
        }
        ColumnType::Boolean => checkbox(value.as_bool(), use_glyphs).to_string(),
        _ => value.to_string(),
    }
}

pub fn checkbox(checked: bool, use_glyphs: bool) -> &'static str {
    match (checked, use_glyphs) {
        (true, true) => "☑",
        (false, true) => "☐",
        (true, false) => "[x]",
        (false, false) => "[ ]",
    }
}

/// Footer text for one column over the rows of the current view
pub fn footer_value(column: &ColumnSpec, rows: &[&Record]) -> String {
    if let Some(renderer) = &column.footer_renderer {
        return renderer.render(rows);
    }
    match column.footer {
        Some(aggregate) => aggregate_value(aggregate, &column.key, rows).to_string(),
        None => String::new(),
    }
}

/// Compute a builtin aggregate. Non-numeric values are ignored by sum and
/// average; nulls are ignored by min and max.
pub fn aggregate_value(aggregate: FooterAggregate, field: &str, rows: &[&Record]) -> CellValue {
    let values = rows.iter().map(|r| r.value(field));

    match aggregate {
        FooterAggregate::Count => CellValue::Integer(rows.len() as i64),
        FooterAggregate::Sum => sum(values),
        FooterAggregate::Average => {
            let numbers: Vec<f64> = values.filter_map(CellValue::as_f64).collect();
            if numbers.is_empty() {
                CellValue::Null
            } else {
                CellValue::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
        FooterAggregate::Min => extreme(values, Ordering::Less),
        FooterAggregate::Max => extreme(values, Ordering::Greater),
    }
}

fn sum<'a>(values: impl Iterator<Item = &'a CellValue>) -> CellValue {
    let mut int_total: i64 = 0;
    let mut float_total: f64 = 0.0;
    let mut saw_float = false;

    for value in values {
        match value {
            CellValue::Integer(i) => {
                int_total = int_total.saturating_add(*i);
                float_total += *i as f64;
            }
            CellValue::Float(f) => {
                saw_float = true;
                float_total += f;
            }
            _ => {}
        }
    }

    if saw_float {
        CellValue::Float(float_total)
    } else {
        CellValue::Integer(int_total)
    }
}

fn extreme<'a>(values: impl Iterator<Item = &'a CellValue>, wanted: Ordering) -> CellValue {
    values
        .filter(|v| !v.is_null())
        .fold(None::<&CellValue>, |best, v| match best {
            Some(b) if compare_values(v, b) != wanted => Some(b),
            _ => Some(v),
        })
        .cloned()
        .unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::column::SelectOption;

    fn status_column() -> ColumnSpec {
        ColumnSpec::new("status", "Status")
            .with_type(ColumnType::Dropdown)
            .with_dropdown_options(vec![
                SelectOption::new("todo", "To do"),
                SelectOption::new("done", "Done"),
            ])
    }

    fn tags_column() -> ColumnSpec {
        ColumnSpec::new("tags", "Tags")
            .with_type(ColumnType::Multidropdown)
            .with_dropdown_options(vec![
                SelectOption::new("a", "Alpha"),
                SelectOption::new("b", "Beta"),
                SelectOption::new("c", "Gamma"),
            ])
    }

    #[test]
    fn test_dropdown_label_and_fallbacks() {
        let column = status_column();
        let done = Record::new("1").with("status", "done");
        let odd = Record::new("2").with("status", "archived");
        let empty = Record::new("3");

        assert_eq!(display_cell(&column, &done, 0, true), "Done");
        assert_eq!(display_cell(&column, &odd, 0, true), "archived");
        assert_eq!(display_cell(&column, &empty, 0, true), PLACEHOLDER);
    }

    #[test]
    fn test_multidropdown_summary() {
        let column = tags_column();
        let two = Record::new("1").with(
            "tags",
            CellValue::List(vec![CellValue::text("a"), CellValue::text("c")]),
        );
        let three = Record::new("2").with(
            "tags",
            CellValue::List(vec![CellValue::text("a"), CellValue::text("b"), CellValue::text("c")]),
        );
        let scalar = Record::new("3").with("tags", "a");

        assert_eq!(display_cell(&column, &two, 0, true), "Alpha, Gamma");
        assert_eq!(display_cell(&column, &three, 0, true), "3 selected");
        assert_eq!(display_cell(&column, &scalar, 0, true), PLACEHOLDER);
    }

    #[test]
    fn test_custom_renderer_wins() {
        let column = ColumnSpec::new("age", "Age")
            .with_type(ColumnType::Custom)
            .with_renderer(|value, _row, position| format!("{}:{}", position, value));
        let row = Record::new("1").with("age", 30);
        assert_eq!(display_cell(&column, &row, 4, true), "4:30");
    }

    #[test]
    fn test_boolean_checkbox() {
        let column = ColumnSpec::new("done", "Done").with_type(ColumnType::Boolean);
        let row = Record::new("1").with("done", true);
        assert_eq!(display_cell(&column, &row, 0, false), "[x]");
    }

    #[test]
    fn test_aggregates() {
        let rows = vec![
            Record::new("1").with("n", 2),
            Record::new("2").with("n", 4.5),
            Record::new("3").with("n", CellValue::Null),
        ];
        let refs: Vec<&Record> = rows.iter().collect();

        assert_eq!(aggregate_value(FooterAggregate::Count, "n", &refs), CellValue::Integer(3));
        assert_eq!(aggregate_value(FooterAggregate::Sum, "n", &refs), CellValue::Float(6.5));
        assert_eq!(aggregate_value(FooterAggregate::Average, "n", &refs), CellValue::Float(3.25));
        assert_eq!(aggregate_value(FooterAggregate::Min, "n", &refs), CellValue::Integer(2));
        assert_eq!(aggregate_value(FooterAggregate::Max, "n", &refs), CellValue::Float(4.5));
    }

    #[test]
    fn test_footer_renderer_overrides_aggregate() {
        let column = ColumnSpec::new("n", "N")
            .with_footer(FooterAggregate::Sum)
            .with_footer_renderer(|rows| format!("{} rows", rows.len()));
        let rows = vec![Record::new("1").with("n", 2), Record::new("2").with("n", 3)];
        let refs: Vec<&Record> = rows.iter().collect();
        assert_eq!(footer_value(&column, &refs), "2 rows");
    }

    #[test]
    fn test_integer_sum_stays_integer() {
        let rows = vec![Record::new("1").with("n", 2), Record::new("2").with("n", 3)];
        let refs: Vec<&Record> = rows.iter().collect();
        assert_eq!(footer_value(&ColumnSpec::new("n", "N").with_footer(FooterAggregate::Sum), &refs), "5");
    }
}
