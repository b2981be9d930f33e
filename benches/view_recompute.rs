use criterion::{black_box, criterion_group, criterion_main, Criterion};
use s42_grid::data::record::Record;
use s42_grid::grid::column::{ColumnSpec, ColumnType, FilterOption};
use s42_grid::grid::search::derive_view;
use s42_grid::grid::view_state::SortState;
use s42_grid::grid::{DataGrid, SortDirection, SortKey, ViewState};

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("book", "Book").sortable().filterable(Vec::<FilterOption>::new()),
        ColumnSpec::new("value", "Value").with_type(ColumnType::Number).sortable(),
        ColumnSpec::new("status", "Status").sortable().filterable(Vec::new()),
    ]
}

fn create_test_rows(rows: usize) -> Vec<Record> {
    let book_values = [
        "Commodities Trading",
        "Equity Trading",
        "FX Trading",
        "Bond Trading",
        "Derivatives",
        "Options",
        "Futures",
        "ETF Trading",
        "Structured Products",
        "Money Markets",
    ];

    (0..rows)
        .map(|i| {
            Record::new(i.to_string())
                .with("book", book_values[i % book_values.len()])
                .with("value", ((i * 7919) % 10_007) as i64)
                .with("status", format!("STATUS_{}", i % 5))
        })
        .collect()
}

fn benchmark_search(c: &mut Criterion) {
    let columns = columns();
    let rows_10k = create_test_rows(10_000);
    let rows_50k = create_test_rows(50_000);

    let state = ViewState {
        search: "comm".to_string(),
        ..ViewState::default()
    };

    let mut group = c.benchmark_group("view_search");

    group.bench_function("10k_rows", |b| {
        b.iter(|| {
            let view = derive_view(black_box(&rows_10k), &columns, &state);
            assert!(!view.is_empty());
        });
    });

    group.bench_function("50k_rows", |b| {
        b.iter(|| {
            let view = derive_view(black_box(&rows_50k), &columns, &state);
            assert!(!view.is_empty());
        });
    });

    group.finish();
}

fn benchmark_filter_and_sort(c: &mut Criterion) {
    let columns = columns();
    let rows_50k = create_test_rows(50_000);

    let mut state = ViewState::default();
    state
        .filters
        .entry("status".to_string())
        .or_default()
        .extend(["STATUS_1".to_string(), "STATUS_3".to_string()]);
    state.sort.cycle("value");

    let mut group = c.benchmark_group("view_filter_sort");

    group.bench_function("filter_only_50k", |b| {
        let mut unsorted = state.clone();
        unsorted.sort = SortState::default();
        b.iter(|| derive_view(black_box(&rows_50k), &columns, &unsorted));
    });

    group.bench_function("filter_then_sort_50k", |b| {
        b.iter(|| derive_view(black_box(&rows_50k), &columns, &state));
    });

    group.bench_function("sort_desc_50k", |b| {
        let mut desc = ViewState::default();
        desc.sort.cycle("value");
        desc.sort.cycle("value");
        assert_eq!(
            desc.sort.active(),
            Some(&SortKey::new("value", SortDirection::Descending))
        );
        b.iter(|| derive_view(black_box(&rows_50k), &columns, &desc));
    });

    group.finish();
}

fn benchmark_grid_keystrokes(c: &mut Criterion) {
    let mut grid = DataGrid::new(columns(), create_test_rows(10_000));
    grid.click_header("value");
    grid.set_search("trading");

    c.bench_function("grid_search_keystroke_10k", |b| {
        let terms = ["t", "tr", "tra", "trad", "tradi", "tradin", "trading"];
        b.iter(|| {
            for term in terms {
                grid.set_search(black_box(term));
            }
            grid.view_len()
        });
    });
}

criterion_group!(
    benches,
    benchmark_search,
    benchmark_filter_and_sort,
    benchmark_grid_keystrokes
);
criterion_main!(benches);
