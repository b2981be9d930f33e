// Actions the terminal front end can perform on the grid.
// Keys are translated to actions by the key mapper; panels that take
// free text (search, cell editor) read raw keys instead.

/// Which part of the screen owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppMode {
    Grid,
    Search,
    Edit,
    FilterPanel,
    ColumnPanel,
    Help,
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(NavigateAction),

    // Grid operations
    StartSearch,
    ClearSearch,
    SortColumn,
    OpenFilterPanel,
    OpenColumnPanel,
    BeginEdit,
    ToggleRowSelection,
    ToggleSelectAll,
    ActivateRow,

    // Data
    ExportSelection,
    SaveData,

    // Views
    ShowHelp,
    ShowLog,
    ExitCurrentMode,

    Quit,
    ForceQuit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigateAction {
    Up(usize),
    Down(usize),
    Left(usize),
    Right(usize),
    PageUp,
    PageDown,
    Home,
    End,
}

/// Cursor position after a navigation, clamped to the grid bounds
pub fn apply_navigation(
    action: &NavigateAction,
    row: usize,
    col: usize,
    row_count: usize,
    col_count: usize,
    page: usize,
) -> (usize, usize) {
    let last_row = row_count.saturating_sub(1);
    let last_col = col_count.saturating_sub(1);
    let page = page.max(1);

    match action {
        NavigateAction::Up(n) => (row.saturating_sub(*n), col),
        NavigateAction::Down(n) => ((row + n).min(last_row), col),
        NavigateAction::Left(n) => (row, col.saturating_sub(*n)),
        NavigateAction::Right(n) => (row, (col + n).min(last_col)),
        NavigateAction::PageUp => (row.saturating_sub(page), col),
        NavigateAction::PageDown => ((row + page).min(last_row), col),
        NavigateAction::Home => (0, col),
        NavigateAction::End => (last_row, col),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_clamps() {
        assert_eq!(apply_navigation(&NavigateAction::Up(3), 1, 0, 10, 4, 5), (0, 0));
        assert_eq!(apply_navigation(&NavigateAction::Right(9), 0, 2, 10, 4, 5), (0, 3));
        assert_eq!(apply_navigation(&NavigateAction::PageDown, 8, 0, 10, 4, 5), (9, 0));
        assert_eq!(apply_navigation(&NavigateAction::End, 0, 1, 0, 4, 5), (0, 1));
    }
}
