use anyhow::{anyhow, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use crate::data::record::{Record, RowKey};
use crate::data::value::CellValue;
use crate::grid::column::ColumnSpec;
use crate::grid::display;
use crate::grid::editor::{parse_text_value, CellEditor, EditSession};
use crate::grid::events::{CellEdit, EditId, GridEvent, GridHandler};
use crate::grid::patch::{PatchSet, Rejection};
use crate::grid::search::derive_view;
use crate::grid::view_state::{CellRef, SortDirection, SortKey, SortState, ViewState};

/// Behaviour flags supplied with the columns
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub selectable: bool,
    pub searchable: bool,
    pub use_glyphs: bool,
    pub default_sort: Option<(String, SortDirection)>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            selectable: false,
            searchable: true,
            use_glyphs: true,
            default_sort: None,
        }
    }
}

/// A headless data grid over caller-owned records.
///
/// The grid derives a searched, filtered and sorted view of the rows it was
/// given, tracks selection and the edited cell by stable row key, and reports
/// edits and selection changes as [`GridEvent`]s. It never persists anything:
/// committed edits are applied as optimistic patches until the owner either
/// supplies fresh data, confirms, or rejects them.
pub struct DataGrid {
    columns: Vec<ColumnSpec>,
    rows: Vec<Record>,
    key_index: HashMap<RowKey, usize>,

    /// Positions into `rows` after search, filters and sort
    view: Vec<usize>,

    state: ViewState,
    editing: Option<EditSession>,
    patches: PatchSet,
    options: GridOptions,
    events: Vec<GridEvent>,
}

impl DataGrid {
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<Record>) -> Self {
        Self::with_options(columns, rows, GridOptions::default())
    }

    pub fn with_options(columns: Vec<ColumnSpec>, rows: Vec<Record>, options: GridOptions) -> Self {
        let mut state = ViewState::default();
        state.hidden_columns = columns
            .iter()
            .filter(|c| c.hidden)
            .map(|c| c.key.clone())
            .collect();

        if let Some((column, direction)) = &options.default_sort {
            if columns.iter().any(|c| &c.key == column) {
                state.sort = SortState::new(column.clone(), *direction);
            } else {
                warn!(target: "grid", "Default sort names unknown column '{}'", column);
            }
        }

        let mut grid = Self {
            columns,
            rows: Vec::new(),
            key_index: HashMap::new(),
            view: Vec::new(),
            state,
            editing: None,
            patches: PatchSet::new(),
            options,
            events: Vec::new(),
        };
        grid.set_data(rows);
        grid
    }

    // ---- data ----------------------------------------------------------

    /// Replace the rows with fresh data from the owner. Pending patches are
    /// dropped: the new data is authoritative.
    pub fn set_data(&mut self, rows: Vec<Record>) {
        self.key_index.clear();
        for (idx, row) in rows.iter().enumerate() {
            if self.key_index.insert(row.key().to_string(), idx).is_some() {
                warn!(target: "grid", "Duplicate row key '{}', later row shadows earlier", row.key());
            }
        }
        self.rows = rows;

        let dropped = self.patches.clear();
        if dropped > 0 {
            debug!(target: "edit", "Fresh data superseded {} pending edits", dropped);
        }

        if let Some(session) = &self.editing {
            if !self.key_index.contains_key(&session.target.row) {
                debug!(target: "edit", "Edited row '{}' vanished, closing editor", session.target.row);
                self.editing = None;
            }
        }

        self.refresh();
    }

    fn refresh(&mut self) {
        self.view = derive_view(&self.rows, &self.columns, &self.state);
        debug!(target: "grid", "View refreshed: {} of {} rows", self.view.len(), self.rows.len());
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// All rows, including pending patches, in source order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn record(&self, key: &str) -> Option<&Record> {
        self.key_index.get(key).map(|&idx| &self.rows[idx])
    }

    /// Rows of the derived view, in display order
    pub fn view_rows(&self) -> Vec<&Record> {
        self.view.iter().map(|&idx| &self.rows[idx]).collect()
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn row_at(&self, position: usize) -> Option<&Record> {
        self.view.get(position).map(|&idx| &self.rows[idx])
    }

    /// Where a row currently sits in the view
    pub fn position_of(&self, key: &str) -> Option<usize> {
        let idx = *self.key_index.get(key)?;
        self.view.iter().position(|&v| v == idx)
    }

    // ---- search & filters ----------------------------------------------

    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.state.search {
            return;
        }
        debug!(target: "grid", "Search term set to '{}'", term);
        self.state.search = term;
        self.refresh();
    }

    pub fn search_term(&self) -> &str {
        &self.state.search
    }

    fn filterable(&self, column: &str) -> bool {
        self.column(column).map(|c| c.filterable).unwrap_or(false)
    }

    /// Add or remove one accepted value of a column filter
    pub fn toggle_filter_value(&mut self, column: &str, value: &str) -> bool {
        if !self.filterable(column) {
            return false;
        }
        let values = self.state.filters.entry(column.to_string()).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        debug!(target: "grid", "Filter on '{}' now {:?}", column, values);
        self.refresh();
        true
    }

    /// Replace a column filter's accepted values
    pub fn set_filter<I, S>(&mut self, column: &str, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.filterable(column) {
            return false;
        }
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        self.state.filters.insert(column.to_string(), values);
        self.refresh();
        true
    }

    pub fn clear_filter(&mut self, column: &str) -> bool {
        if self.state.filters.remove(column).is_some() {
            self.refresh();
            true
        } else {
            false
        }
    }

    pub fn clear_all_filters(&mut self) {
        if !self.state.filters.is_empty() {
            self.state.filters.clear();
            self.refresh();
        }
    }

    pub fn filter_values(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.state.filter_values(column)
    }

    // ---- sort ----------------------------------------------------------

    /// Header click: cycle the sort of a sortable column
    pub fn click_header(&mut self, column: &str) -> bool {
        let sortable = self.column(column).map(|c| c.sortable).unwrap_or(false);
        if !sortable {
            return false;
        }
        self.state.sort.cycle(column);
        debug!(target: "grid", "Sort is now {:?}", self.state.sort.active());
        self.refresh();
        self.events.push(GridEvent::SortChanged {
            sort: self.state.sort.active().cloned(),
        });
        true
    }

    pub fn sort(&self) -> Option<&SortKey> {
        self.state.sort.active()
    }

    // ---- column visibility ----------------------------------------------

    pub fn visible_columns(&self) -> Vec<&ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| !self.state.hidden_columns.contains(&c.key))
            .collect()
    }

    pub fn is_column_visible(&self, key: &str) -> bool {
        self.column(key).is_some() && !self.state.hidden_columns.contains(key)
    }

    pub fn set_column_visible(&mut self, key: &str, visible: bool) -> bool {
        if self.column(key).is_none() {
            return false;
        }
        if visible {
            self.state.hidden_columns.remove(key);
        } else {
            self.state.hidden_columns.insert(key.to_string());
        }
        true
    }

    pub fn toggle_column(&mut self, key: &str) -> bool {
        let visible = self.is_column_visible(key);
        self.set_column_visible(key, !visible)
    }

    pub fn show_all_columns(&mut self) {
        self.state.hidden_columns.clear();
    }

    // ---- selection -----------------------------------------------------

    pub fn set_row_selected(&mut self, key: &str, checked: bool) -> bool {
        if !self.key_index.contains_key(key) {
            return false;
        }
        let changed = if checked {
            self.state.selected.insert(key.to_string())
        } else {
            self.state.selected.remove(key)
        };
        if changed {
            self.emit_selection();
        }
        true
    }

    pub fn toggle_row_selected(&mut self, key: &str) -> bool {
        let checked = self.is_selected(key);
        self.set_row_selected(key, !checked)
    }

    /// Header checkbox: select every row of the current view, or none
    pub fn select_all(&mut self, checked: bool) {
        if checked {
            let keys: Vec<RowKey> = self.view_rows().iter().map(|r| r.key().to_string()).collect();
            self.state.selected.extend(keys);
        } else {
            self.state.selected.clear();
        }
        self.emit_selection();
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.state.selected.contains(key)
    }

    /// Selected rows resolved against the current view, in view order
    pub fn selected_rows(&self) -> Vec<&Record> {
        self.view_rows()
            .into_iter()
            .filter(|r| self.state.selected.contains(r.key()))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected_rows().len()
    }

    /// Header checkbox state
    pub fn all_selected(&self) -> bool {
        !self.view.is_empty() && self.selected_count() == self.view.len()
    }

    pub fn selection_summary(&self) -> Option<String> {
        let count = self.selected_count();
        (count > 0).then(|| format!("{} of {} rows selected", count, self.view.len()))
    }

    fn emit_selection(&mut self) {
        let rows: Vec<Record> = self.selected_rows().into_iter().cloned().collect();
        debug!(target: "grid", "Selection changed: {} rows", rows.len());
        self.events.push(GridEvent::SelectionChanged { rows });
    }

    // ---- row click -----------------------------------------------------

    pub fn click_row(&mut self, key: &str) -> bool {
        let Some(position) = self.position_of(key) else {
            return false;
        };
        let row = self.rows[self.view[position]].clone();
        self.events.push(GridEvent::RowClicked { row, position });
        true
    }

    // ---- inline editing --------------------------------------------------

    /// Open an editor on a cell. Refused when the column is not editable,
    /// the row is not in the view, or another cell is already being edited.
    pub fn begin_edit(&mut self, key: &str, column: &str) -> bool {
        if self.editing.is_some() {
            return false;
        }
        let Some(spec) = self.column(column).filter(|c| c.editable) else {
            return false;
        };
        if self.position_of(key).is_none() {
            return false;
        }
        let Some(row) = self.record(key) else {
            return false;
        };

        let editor = CellEditor::open(spec, row.value(column));
        debug!(target: "edit", "Editing cell ({}, {})", key, column);
        self.editing = Some(EditSession {
            target: CellRef::new(key, column),
            editor,
        });
        true
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut CellEditor> {
        self.editing.as_mut().map(|s| &mut s.editor)
    }

    pub fn is_editing_cell(&self, key: &str, column: &str) -> bool {
        self.editing
            .as_ref()
            .map(|s| s.target.row == key && s.target.column == column)
            .unwrap_or(false)
    }

    /// Commit a text/number editor (Enter or blur). A number that does not
    /// parse is an error and leaves the editor open.
    pub fn commit_edit(&mut self) -> Result<Option<EditId>> {
        let Some(session) = &self.editing else {
            return Ok(None);
        };
        let CellEditor::Text { input, column_type } = &session.editor else {
            return Ok(None);
        };

        let value = parse_text_value(input.value(), *column_type)?;
        let target = session.target.clone();
        self.editing = None;
        Ok(self.apply_edit(target, value))
    }

    /// Close the editor without committing (Escape)
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.editing.take() {
            debug!(target: "edit", "Cancelled edit of ({}, {})", session.target.row, session.target.column);
        }
    }

    /// Close an editor that stays open after commits (multi-select)
    pub fn close_editor(&mut self) {
        self.editing = None;
    }

    /// Checkbox editor: commit the negated value and close
    pub fn toggle_checkbox(&mut self) -> Option<EditId> {
        let session = self.editing.as_ref()?;
        let CellEditor::Checkbox { checked } = session.editor else {
            return None;
        };
        let target = session.target.clone();
        self.editing = None;
        self.apply_edit(target, CellValue::Boolean(!checked))
    }

    /// Single select: commit the chosen value and close
    pub fn choose_option(&mut self, value: CellValue) -> Option<EditId> {
        let session = self.editing.as_ref()?;
        if !matches!(session.editor, CellEditor::Select { .. }) {
            return None;
        }
        let target = session.target.clone();
        self.editing = None;
        self.apply_edit(target, value)
    }

    /// Multi select: flip one option, commit the new list, stay open
    pub fn toggle_option(&mut self, value: &CellValue) -> Option<EditId> {
        let session = self.editing.as_mut()?;
        let new_value = session.editor.toggle_chosen(value)?;
        let target = session.target.clone();
        self.apply_edit(target, new_value)
    }

    /// Act on the highlighted option of whichever select editor is open
    pub fn choose_highlighted(&mut self) -> Option<EditId> {
        let session = self.editing.as_ref()?;
        let value = session.editor.highlighted()?.value.to_cell_value();
        if session.editor.closes_on_commit() {
            self.choose_option(value)
        } else {
            self.toggle_option(&value)
        }
    }

    fn apply_edit(&mut self, target: CellRef, new_value: CellValue) -> Option<EditId> {
        let idx = *self.key_index.get(&target.row)?;
        let row = &mut self.rows[idx];
        let snapshot = row.clone();
        let previous = row.set(target.column.clone(), new_value.clone());

        let column = target.column.clone();
        let id = self.patches.record(target, previous, new_value.clone());
        info!(target: "edit", "Committed edit {:?} on ({}, {}) = {}", id, snapshot.key(), column, new_value);

        self.events.push(GridEvent::CellEdited(CellEdit {
            id,
            row: snapshot,
            column,
            new_value,
        }));
        self.refresh();
        Some(id)
    }

    /// The owner accepted an edit
    pub fn confirm_edit(&mut self, id: EditId) -> bool {
        self.patches.confirm(id).is_some()
    }

    /// The owner refused an edit: roll the optimistic patch back
    pub fn reject_edit(&mut self, id: EditId) -> bool {
        match self.patches.reject(id) {
            Rejection::Unknown => false,
            Rejection::Superseded => {
                debug!(target: "edit", "Rejected {:?}, a later edit keeps the cell", id);
                true
            }
            Rejection::Restore { cell, previous } => {
                if let Some(&idx) = self.key_index.get(&cell.row) {
                    let row = &mut self.rows[idx];
                    match previous {
                        Some(value) => {
                            row.set(cell.column.clone(), value);
                        }
                        None => {
                            row.remove(&cell.column);
                        }
                    }
                    // An open multi-select on this cell must not re-commit the rejected list
                    if let Some(session) = self.editing.as_mut().filter(|s| s.target == cell) {
                        session.editor.resync(self.rows[idx].value(&cell.column));
                    }
                }
                warn!(target: "edit", "Rolled back {:?} on ({}, {})", id, cell.row, cell.column);
                self.refresh();
                true
            }
        }
    }

    pub fn pending_edits(&self) -> usize {
        self.patches.len()
    }

    // ---- events --------------------------------------------------------

    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deliver queued events to a handler. Accepted edits are confirmed;
    /// refused ones are rolled back and returned with the handler's error.
    pub fn dispatch(&mut self, handler: &mut dyn GridHandler) -> Vec<(EditId, anyhow::Error)> {
        let mut rejected = Vec::new();

        for event in self.drain_events() {
            match &event {
                GridEvent::CellEdited(edit) => match handler.on_cell_edit(edit) {
                    Ok(()) => {
                        self.confirm_edit(edit.id);
                    }
                    Err(e) => {
                        warn!(target: "edit", "{} rejected {:?}: {}", handler.name(), edit.id, e);
                        self.reject_edit(edit.id);
                        rejected.push((edit.id, e));
                    }
                },
                GridEvent::SelectionChanged { rows } => handler.on_selection_change(rows),
                GridEvent::SortChanged { sort } => handler.on_sort_change(sort.as_ref()),
                GridEvent::RowClicked { row, position } => handler.on_row_click(row, *position),
            }
        }

        rejected
    }

    // ---- rendering helpers ---------------------------------------------

    /// Display text of a cell in the current view
    pub fn display_cell(&self, key: &str, column: &str) -> Result<String> {
        let spec = self
            .column(column)
            .ok_or_else(|| anyhow!("Unknown column '{}'", column))?;
        let row = self
            .record(key)
            .ok_or_else(|| anyhow!("Unknown row '{}'", key))?;
        let position = self.position_of(key).unwrap_or(0);
        Ok(display::display_cell(spec, row, position, self.options.use_glyphs))
    }

    pub fn has_footer(&self) -> bool {
        self.visible_columns().iter().any(|c| c.has_footer())
    }

    /// Footer text for each visible column
    pub fn footer_values(&self) -> Vec<String> {
        let rows = self.view_rows();
        self.visible_columns()
            .iter()
            .map(|c| display::footer_value(c, &rows))
            .collect()
    }
}
