use anyhow::{anyhow, bail, Context, Result};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use tracing::info;

use s42_grid::access::PageCatalog;
use s42_grid::config::Config;
use s42_grid::data::exporter::{DataExporter, ExportColumn};
use s42_grid::data::loaders::load_records;
use s42_grid::grid::column::{infer_columns, GridSpec};
use s42_grid::grid::view_state::SortDirection;
use s42_grid::grid::{DataGrid, GridOptions};
use s42_grid::logging::init_tracing;
use s42_grid::projects::load_and_nest;
use s42_grid::table_display::display_grid;
use s42_grid::ui::{run_grid_tui, RecordStore};

/// Flags that consume the following argument
const VALUE_FLAGS: &[&str] = &[
    "--columns",
    "--key",
    "--search",
    "--sort",
    "--filter",
    "--export-csv",
    "--pages",
    "--groups",
    "--nest-tasks",
    "--max-rows",
];

fn print_help() {
    println!("{}", "S42 Grid - searchable, sortable, editable data grid".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  s42-grid [OPTIONS] FILE.json|FILE.csv");
    println!();
    println!("{}", "Data options:".yellow());
    println!("  {} - Column definitions (TOML [[columns]])", "--columns <spec.toml>".green());
    println!("  {}        - Field holding the row key", "--key <field>".green());
    println!("  {}     - Search all columns", "--search <term>".green());
    println!("  {}   - Sort by a column", "--sort <col[:desc]>".green());
    println!("  {} - Filter a column (repeatable)", "--filter <col=v1,v2>".green());
    println!();
    println!("{}", "Output:".yellow());
    println!("  {}                 - Print the view instead of opening the grid", "--print".green());
    println!("  {}           - Rows printed by --print", "--max-rows <n>".green());
    println!("  {}    - Write the view to CSV", "--export-csv <file>".green());
    println!();
    println!("{}", "Other commands:".yellow());
    println!("  {} - Pages visible to the groups", "--pages <pages.json> --groups <g1,g2>".green());
    println!("  {}          - Group tasks under their projects", "--nest-tasks <tasks.json>".green());
    println!("  {}               - Initialize configuration with wizard", "--init-config".green());
    println!("  {}           - Generate config file with defaults", "--generate-config".green());
    println!();
    println!("Inside the grid press {} for key bindings.", "?".green());
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .map(String::as_str)
}

fn flag_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
        .collect()
}

/// First argument that is neither a flag nor a flag's value
fn positional(args: &[String]) -> Option<&str> {
    args.iter()
        .enumerate()
        .skip(1)
        .find(|(i, arg)| {
            !arg.starts_with("--") && !VALUE_FLAGS.contains(&args[i - 1].as_str())
        })
        .map(|(_, arg)| arg.as_str())
}

fn parse_sort(value: &str) -> (String, SortDirection) {
    match value.rsplit_once(':') {
        Some((column, dir)) if dir.eq_ignore_ascii_case("desc") => (column.to_string(), SortDirection::Descending),
        Some((column, dir)) if dir.eq_ignore_ascii_case("asc") => (column.to_string(), SortDirection::Ascending),
        _ => (value.to_string(), SortDirection::Ascending),
    }
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Error creating config directory")?;
    }
    std::fs::write(&path, Config::create_default_with_comments()).context("Error writing config file")?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize the grid.");
    Ok(())
}

fn print_pages(pages_file: &Path, groups: &[String]) -> Result<()> {
    let catalog = PageCatalog::load(pages_file)?;
    let pages = catalog.visible_to(groups);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Title", "Slug", "Category", "Groups"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for page in &pages {
        let groups = if page.is_public() {
            "public".to_string()
        } else {
            page.group_ids.join(", ")
        };
        table.add_row(vec![
            page.title.clone(),
            page.slug.clone(),
            page.category.clone().unwrap_or_default(),
            groups,
        ]);
    }

    println!("{table}");
    println!("\n{}", format!("{} of {} pages visible", pages.len(), catalog.pages.len()).green());
    Ok(())
}

fn build_grid(args: &[String], config: &Config, data_file: &Path) -> Result<(DataGrid, RecordStore)> {
    let spec = match flag_value(args, "--columns") {
        Some(path) => Some(GridSpec::load(path)?),
        None => None,
    };

    let key_field = flag_value(args, "--key")
        .map(str::to_string)
        .or_else(|| spec.as_ref().and_then(|s| s.key_field.clone()))
        .unwrap_or_else(|| config.behavior.key_field.clone());

    let records = load_records(data_file, &key_field)?;
    let columns = match &spec {
        Some(spec) if !spec.columns.is_empty() => spec.columns.clone(),
        _ => infer_columns(&records.fields, &records.records, &key_field),
    };
    info!(target: "store", "Loaded {} records with {} columns", records.len(), columns.len());

    let options = GridOptions {
        default_sort: spec
            .as_ref()
            .and_then(|s| s.default_sort.as_ref())
            .map(|d| (d.column.clone(), d.direction)),
        ..config.grid_options()
    };

    let mut grid = DataGrid::with_options(columns.clone(), records.records.clone(), options);

    if let Some(term) = flag_value(args, "--search") {
        grid.set_search(term);
    }

    if let Some(sort) = flag_value(args, "--sort") {
        let (column, direction) = parse_sort(sort);
        // At most three clicks reach any state of the cycle
        for _ in 0..3 {
            if grid.sort().map(|k| (k.column.as_str(), k.direction)) == Some((column.as_str(), direction)) {
                break;
            }
            if !grid.click_header(&column) {
                bail!("Column '{}' is not sortable", column);
            }
        }
    }

    for filter in flag_values(args, "--filter") {
        let (column, values) = filter
            .split_once('=')
            .ok_or_else(|| anyhow!("Filter '{}' must look like column=value1,value2", filter))?;
        if !grid.set_filter(column, values.split(',').map(str::trim).filter(|v| !v.is_empty())) {
            bail!("Column '{}' is not filterable", column);
        }
    }

    let store = RecordStore::new(records, columns, Some(data_file.to_path_buf()));
    Ok((grid, store))
}

fn export_view(grid: &DataGrid, path: &str) -> Result<()> {
    let columns: Vec<ExportColumn> = grid
        .visible_columns()
        .iter()
        .map(|c| ExportColumn::new(c.key.clone(), c.title()))
        .collect();
    let message = DataExporter::export_csv(path, &columns, &grid.view_rows())?;
    println!("{}", message.green());
    Ok(())
}

fn run(args: Vec<String>) -> Result<()> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--init-config".to_string()) {
        let config = Config::init_wizard()?;
        println!("\nConfiguration initialized successfully!");
        if !config.display.use_glyphs {
            println!("Note: Simple mode enabled (ASCII icons)");
        }
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        return generate_config();
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{} {:#}, using defaults", "Config:".yellow(), e);
        Config::default()
    });

    if let Some(pages_file) = flag_value(&args, "--pages") {
        let groups: Vec<String> = flag_value(&args, "--groups")
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return print_pages(Path::new(pages_file), &groups);
    }

    if let Some(tasks_file) = flag_value(&args, "--nest-tasks") {
        let nested = load_and_nest(tasks_file)?;
        println!("{}", serde_json::to_string_pretty(&nested)?);
        return Ok(());
    }

    let Some(data_file) = positional(&args).map(PathBuf::from) else {
        print_help();
        bail!("No data file given");
    };

    let (grid, store) = build_grid(&args, &config, &data_file)?;

    let export = flag_value(&args, "--export-csv");
    if let Some(path) = export {
        export_view(&grid, path)?;
    }

    if args.contains(&"--print".to_string()) {
        let max_rows = match flag_value(&args, "--max-rows") {
            Some(n) => n.parse().with_context(|| format!("Invalid --max-rows '{}'", n))?,
            None => config.behavior.max_display_rows,
        };
        display_grid(&grid, max_rows, &config.display.icons);
        return Ok(());
    }

    if export.is_some() {
        return Ok(());
    }

    run_grid_tui(grid, store, config)
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(args) {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}
