use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::config::config::IconConfig;
use crate::grid::display::display_cell;
use crate::grid::DataGrid;

/// Build a printable table of the grid's current view
pub fn build_table(grid: &DataGrid, max_rows: usize, icons: &IconConfig) -> Table {
    let columns = grid.visible_columns();
    let use_glyphs = grid.options().use_glyphs;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(columns.iter().map(|c| {
        let indicator = grid
            .state()
            .sort
            .direction_for(&c.key)
            .map(|d| format!(" {}", icons.sort_icon(d)))
            .unwrap_or_default();
        Cell::new(format!("{}{}", c.title(), indicator)).add_attribute(Attribute::Bold)
    }));

    for (position, record) in grid.view_rows().into_iter().enumerate().take(max_rows) {
        table.add_row(
            columns
                .iter()
                .map(|c| display_cell(c, record, position, use_glyphs))
                .collect::<Vec<_>>(),
        );
    }

    if grid.has_footer() {
        table.add_row(
            grid.footer_values()
                .into_iter()
                .map(|v| Cell::new(v).add_attribute(Attribute::Italic))
                .collect::<Vec<_>>(),
        );
    }

    table
}

pub fn display_grid(grid: &DataGrid, max_rows: usize, icons: &IconConfig) {
    if grid.view_len() == 0 {
        println!("{}", "No data available.".yellow());
        return;
    }

    println!("{}", build_table(grid, max_rows, icons));

    let shown = grid.view_len().min(max_rows);
    let summary = if shown < grid.view_len() {
        format!("{} of {} rows shown ({} total)", shown, grid.view_len(), grid.rows().len())
    } else {
        format!("{} of {} rows", grid.view_len(), grid.rows().len())
    };
    println!("\n{}", summary.green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Record;
    use crate::grid::column::{ColumnSpec, FooterAggregate};

    #[test]
    fn test_table_shows_view_and_footer() {
        let mut grid = DataGrid::new(
            vec![
                ColumnSpec::new("name", "Name").sortable(),
                ColumnSpec::new("age", "Age").with_footer(FooterAggregate::Sum),
            ],
            vec![
                Record::new("1").with("name", "Bob").with("age", 30),
                Record::new("2").with("name", "Ann").with("age", 25),
            ],
        );
        grid.click_header("name");
        let rendered = build_table(&grid, 10, &IconConfig::default()).to_string();

        assert!(rendered.contains("Name ↑"));
        assert!(rendered.find("Ann").unwrap() < rendered.find("Bob").unwrap());
        assert!(rendered.contains("55"));
    }

    #[test]
    fn test_row_limit() {
        let rows = (0..5).map(|i| Record::new(i.to_string()).with("n", format!("row{}", i))).collect();
        let grid = DataGrid::new(vec![ColumnSpec::new("n", "N")], rows);
        let rendered = build_table(&grid, 2, &IconConfig::simple()).to_string();
        assert!(rendered.contains("row1"));
        assert!(!rendered.contains("row2"));
    }
}
