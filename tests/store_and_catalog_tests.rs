use s42_grid::access::{PageCatalog, UNLISTED_SORT_ORDER};
use s42_grid::data::loaders::load_records;
use s42_grid::data::value::CellValue;
use s42_grid::grid::column::{infer_columns, ColumnSpec, ColumnType};
use s42_grid::grid::DataGrid;
use s42_grid::projects::load_and_nest;
use s42_grid::ui::RecordStore;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_store_keeps_accepted_edits_and_saves() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("budget.csv");
    fs::write(&source, "id,item,amount\n1,Paint,40\n2,Brushes,12\n").unwrap();

    let set = load_records(&source, "id").unwrap();
    let columns = infer_columns(&set.fields, &set.records, "id");
    let mut grid = DataGrid::new(columns.clone(), set.records.clone());
    let mut store = RecordStore::new(set, columns, Some(source.clone()));

    grid.begin_edit("2", "amount");
    if let Some(input) = grid.editor_mut().and_then(|e| e.input_mut()) {
        *input = input.clone().with_value("15".to_string());
    }
    grid.commit_edit().unwrap();
    grid.set_row_selected("1", true);

    assert!(grid.dispatch(&mut store).is_empty());
    assert!(store.is_dirty());
    assert_eq!(store.selected_count(), 1);
    assert_eq!(grid.pending_edits(), 0);

    let saved = store.save().unwrap();
    assert_eq!(saved, source.with_extension("json"));
    assert!(!store.is_dirty());

    let reloaded = load_records(&saved, "id").unwrap();
    assert_eq!(reloaded.find("2").unwrap().value("amount"), &CellValue::Integer(15));
}

#[test]
fn test_store_refuses_text_in_number_column() {
    let set = s42_grid::RecordSet::new(
        vec!["id".to_string(), "qty".to_string()],
        vec![s42_grid::Record::new("1").with("qty", 3)],
    );
    // A text-typed grid column over a number-typed store column
    let grid_columns = vec![ColumnSpec::new("qty", "Qty").editable()];
    let store_columns = vec![ColumnSpec::new("qty", "Qty").with_type(ColumnType::Number)];
    let mut grid = DataGrid::new(grid_columns, set.records.clone());
    let mut store = RecordStore::new(set, store_columns, None);

    grid.begin_edit("1", "qty");
    if let Some(input) = grid.editor_mut().and_then(|e| e.input_mut()) {
        *input = input.clone().with_value("three".to_string());
    }
    grid.commit_edit().unwrap();

    let rejected = grid.dispatch(&mut store);
    assert_eq!(rejected.len(), 1);
    assert_eq!(grid.record("1").unwrap().value("qty"), &CellValue::Integer(3));
    assert!(!store.is_dirty());
    assert!(store.save().is_err());
}

#[test]
fn test_catalog_file_visibility() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pages.json");
    fs::write(
        &path,
        r#"{
            "pages": [
                {"id": "reports", "title": "Reports", "created_at": "2024-03-01T00:00:00Z"},
                {"id": "admin", "title": "Admin", "created_at": "2024-01-01T00:00:00Z"},
                {"id": "home", "title": "Home", "created_at": "2024-02-01T00:00:00Z", "icon": "house"},
                {"id": "finance", "title": "Finance"}
            ],
            "page_groups": [
                {"page_id": "admin", "group_id": "admins"},
                {"page_id": "finance", "group_id": "finance"},
                {"page_id": "finance", "group_id": "admins"}
            ],
            "menu_items": [
                {"page_id": "home", "sort_order": 1},
                {"page_id": "admin", "sort_order": 2}
            ]
        }"#,
    )
    .unwrap();

    let catalog = PageCatalog::load(&path).unwrap();

    let guest: Vec<String> = catalog.visible_to(&[]).into_iter().map(|p| p.id).collect();
    assert_eq!(guest, vec!["home", "reports"]);

    let admin: Vec<String> = catalog
        .visible_to(&["admins".to_string()])
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(admin, vec!["home", "admin", "reports", "finance"]);

    let home = catalog.pages.iter().find(|p| p.id == "home").unwrap();
    assert_eq!(home.extra.get("icon").and_then(|v| v.as_str()), Some("house"));
    assert!(UNLISTED_SORT_ORDER > 2);
}

#[test]
fn test_nest_tasks_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"[
            {"id": 1, "title": "Spec columns", "s42_projects": {"id": 10, "name": "Grid"}},
            {"id": 2, "title": "Order menu", "s42_projects": {"id": 20, "name": "Portal"}},
            {"id": 3, "title": "Footer sums", "s42_projects": {"id": 10, "name": "Grid"}}
        ]"#,
    )
    .unwrap();

    let nested = load_and_nest(&path).unwrap();
    assert_eq!(nested.len(), 2);
    assert_eq!(nested[0]["name"], "Grid");
    let titles: Vec<&str> = nested[0]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Spec columns", "Footer sums"]);
    assert!(nested[1]["tasks"][0].get("s42_projects").is_none());
}

#[test]
fn test_nest_tasks_rejects_orphan() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, r#"[{"id": 1, "title": "No project"}]"#).unwrap();
    assert!(load_and_nest(&path).is_err());
}
