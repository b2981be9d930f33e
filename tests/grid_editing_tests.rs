use anyhow::{bail, Result};
use s42_grid::data::record::Record;
use s42_grid::data::value::CellValue;
use s42_grid::grid::column::{ColumnSpec, ColumnType, SelectOption};
use s42_grid::grid::editor::CellEditor;
use s42_grid::grid::{CellEdit, DataGrid, GridEvent, GridHandler};

fn tasks() -> Vec<Record> {
    vec![
        Record::new("t1")
            .with("title", "Wire up grid")
            .with("budget", 100)
            .with("done", false)
            .with("status", "todo"),
        Record::new("t2")
            .with("title", "Paint")
            .with("budget", 40)
            .with("done", true)
            .with("status", "done"),
    ]
}

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("title", "Title").sortable().editable(),
        ColumnSpec::new("budget", "Budget")
            .with_type(ColumnType::Number)
            .sortable()
            .editable(),
        ColumnSpec::new("done", "Done").with_type(ColumnType::Boolean).editable(),
        ColumnSpec::new("status", "Status")
            .with_type(ColumnType::Dropdown)
            .editable()
            .with_dropdown_options(vec![
                SelectOption::new("todo", "To do"),
                SelectOption::new("doing", "Doing"),
                SelectOption::new("done", "Done"),
            ]),
        ColumnSpec::new("tags", "Tags")
            .with_type(ColumnType::Multidropdown)
            .editable()
            .with_dropdown_options(vec![
                SelectOption::new("ui", "UI"),
                SelectOption::new("api", "API"),
                SelectOption::new("ops", "Ops"),
            ]),
    ]
}

fn type_text(grid: &mut DataGrid, text: &str) {
    if let Some(input) = grid.editor_mut().and_then(|e| e.input_mut()) {
        *input = input.clone().with_value(text.to_string());
    }
}

fn edits(grid: &mut DataGrid) -> Vec<CellEdit> {
    grid.drain_events()
        .into_iter()
        .filter_map(|e| match e {
            GridEvent::CellEdited(edit) => Some(edit),
            _ => None,
        })
        .collect()
}

/// Keeps every accepted edit, refuses budgets over a limit
#[derive(Default)]
struct BudgetKeeper {
    accepted: Vec<(String, String, CellValue)>,
}

impl GridHandler for BudgetKeeper {
    fn on_cell_edit(&mut self, edit: &CellEdit) -> Result<()> {
        if edit.column == "budget" {
            if let Some(v) = edit.new_value.as_f64() {
                if v > 1000.0 {
                    bail!("budget {} over limit", v);
                }
            }
        }
        self.accepted
            .push((edit.row.key().to_string(), edit.column.clone(), edit.new_value.clone()));
        Ok(())
    }
}

#[test]
fn test_empty_commit_then_cancel() {
    let mut grid = DataGrid::new(columns(), tasks());

    assert!(grid.begin_edit("t1", "title"));
    type_text(&mut grid, "");
    grid.commit_edit().unwrap();

    assert!(grid.begin_edit("t1", "title"));
    type_text(&mut grid, "typed then abandoned");
    grid.cancel_edit();

    let committed = edits(&mut grid);
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].new_value, CellValue::text(""));
    assert_eq!(grid.record("t1").unwrap().value("title"), &CellValue::text(""));
}

#[test]
fn test_edit_event_carries_row_before_edit() {
    let mut grid = DataGrid::new(columns(), tasks());
    grid.begin_edit("t2", "budget");
    type_text(&mut grid, "55.5");
    grid.commit_edit().unwrap();

    let committed = edits(&mut grid);
    assert_eq!(committed[0].row.value("budget"), &CellValue::Integer(40));
    assert_eq!(committed[0].column, "budget");
    assert_eq!(committed[0].new_value, CellValue::Float(55.5));
}

#[test]
fn test_empty_number_commits_null() {
    let mut grid = DataGrid::new(columns(), tasks());
    grid.begin_edit("t1", "budget");
    type_text(&mut grid, "  ");
    grid.commit_edit().unwrap();
    assert!(grid.record("t1").unwrap().value("budget").is_null());
}

#[test]
fn test_only_one_cell_edits_at_a_time() {
    let mut grid = DataGrid::new(columns(), tasks());
    assert!(grid.begin_edit("t1", "title"));
    assert!(!grid.begin_edit("t2", "title"));
    assert!(grid.is_editing_cell("t1", "title"));
    grid.cancel_edit();
    assert!(grid.begin_edit("t2", "title"));
}

#[test]
fn test_checkbox_commits_negation() {
    let mut grid = DataGrid::new(columns(), tasks());
    grid.begin_edit("t2", "done");
    assert!(matches!(grid.editing().map(|s| &s.editor), Some(CellEditor::Checkbox { checked: true })));
    grid.toggle_checkbox();

    assert!(grid.editing().is_none());
    assert_eq!(grid.record("t2").unwrap().value("done"), &CellValue::Boolean(false));
    assert_eq!(grid.display_cell("t2", "done").unwrap(), "☐");
}

#[test]
fn test_dropdown_choice_commits_and_closes() {
    let mut grid = DataGrid::new(columns(), tasks());
    grid.begin_edit("t1", "status");
    grid.choose_option(CellValue::text("doing"));

    assert!(grid.editing().is_none());
    assert_eq!(grid.display_cell("t1", "status").unwrap(), "Doing");
    assert_eq!(edits(&mut grid).len(), 1);
}

#[test]
fn test_multi_select_commits_each_toggle() {
    let mut grid = DataGrid::new(columns(), tasks());
    assert_eq!(grid.display_cell("t1", "tags").unwrap(), "Select...");

    grid.begin_edit("t1", "tags");
    grid.toggle_option(&CellValue::text("ui"));
    grid.toggle_option(&CellValue::text("api"));
    grid.toggle_option(&CellValue::text("ops"));
    assert!(grid.is_editing_cell("t1", "tags"));
    assert_eq!(grid.display_cell("t1", "tags").unwrap(), "3 selected");

    grid.toggle_option(&CellValue::text("api"));
    assert_eq!(grid.display_cell("t1", "tags").unwrap(), "UI, Ops");

    let committed = edits(&mut grid);
    assert_eq!(committed.len(), 4);
    assert_eq!(
        committed[3].new_value,
        CellValue::List(vec![CellValue::text("ui"), CellValue::text("ops")])
    );

    grid.close_editor();
    assert!(grid.editing().is_none());
}

#[test]
fn test_dispatch_delivers_and_rolls_back() {
    let mut grid = DataGrid::new(columns(), tasks());
    let mut keeper = BudgetKeeper::default();

    grid.begin_edit("t1", "budget");
    type_text(&mut grid, "5000");
    grid.commit_edit().unwrap();
    grid.begin_edit("t1", "title");
    type_text(&mut grid, "Wire up grid v2");
    grid.commit_edit().unwrap();

    let rejected = grid.dispatch(&mut keeper);
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].1.to_string().contains("over limit"));

    assert_eq!(keeper.accepted.len(), 1);
    assert_eq!(grid.record("t1").unwrap().value("budget"), &CellValue::Integer(100));
    assert_eq!(grid.record("t1").unwrap().value("title"), &CellValue::text("Wire up grid v2"));
}

#[test]
fn test_rejected_edit_resorts_view() {
    let mut grid = DataGrid::new(columns(), tasks());
    grid.click_header("budget");
    grid.drain_events();

    grid.begin_edit("t1", "budget");
    type_text(&mut grid, "1");
    let id = grid.commit_edit().unwrap().unwrap();
    assert_eq!(grid.row_at(0).map(|r| r.key()), Some("t1"));

    assert!(grid.reject_edit(id));
    assert_eq!(grid.row_at(0).map(|r| r.key()), Some("t2"));
}

#[test]
fn test_confirmed_edit_cannot_be_rejected() {
    let mut grid = DataGrid::new(columns(), tasks());
    grid.begin_edit("t1", "title");
    type_text(&mut grid, "Done");
    let id = grid.commit_edit().unwrap().unwrap();

    assert!(grid.confirm_edit(id));
    assert!(!grid.reject_edit(id));
    assert_eq!(grid.record("t1").unwrap().value("title"), &CellValue::text("Done"));
}

#[test]
fn test_edit_row_filtered_out_by_fresh_data_closes_editor() {
    let mut grid = DataGrid::new(columns(), tasks());
    grid.begin_edit("t1", "title");
    grid.set_data(tasks().into_iter().filter(|r| r.key() != "t1").collect());
    assert!(grid.editing().is_none());
}
