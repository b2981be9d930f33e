use std::collections::BTreeMap;

use crate::data::value::CellValue;
use crate::grid::events::EditId;
use crate::grid::view_state::CellRef;

/// An optimistic cell override awaiting confirmation from the data owner
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub cell: CellRef,
    /// Value before the edit; `None` when the field was absent
    pub previous: Option<CellValue>,
    pub applied: CellValue,
}

/// What a rejected edit requires of the grid's row copy
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// No such pending edit
    Unknown,
    /// A later edit to the same cell is still pending and keeps its value
    Superseded,
    /// Put the previous value back
    Restore {
        cell: CellRef,
        previous: Option<CellValue>,
    },
}

/// Pending optimistic edits, ordered by commit
#[derive(Debug, Default)]
pub struct PatchSet {
    next_id: u64,
    pending: BTreeMap<EditId, Patch>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cell: CellRef, previous: Option<CellValue>, applied: CellValue) -> EditId {
        self.next_id += 1;
        let id = EditId(self.next_id);
        self.pending.insert(
            id,
            Patch {
                cell,
                previous,
                applied,
            },
        );
        id
    }

    pub fn get(&self, id: EditId) -> Option<&Patch> {
        self.pending.get(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The owner accepted the edit; forget it
    pub fn confirm(&mut self, id: EditId) -> Option<Patch> {
        self.pending.remove(&id)
    }

    /// The owner refused the edit. When a later edit to the same cell is
    /// still pending, that edit inherits this one's previous value instead.
    pub fn reject(&mut self, id: EditId) -> Rejection {
        let Some(patch) = self.pending.remove(&id) else {
            return Rejection::Unknown;
        };

        let later = self
            .pending
            .range(id..)
            .find(|(_, p)| p.cell == patch.cell)
            .map(|(later_id, _)| *later_id);

        match later {
            Some(later_id) => {
                if let Some(next) = self.pending.get_mut(&later_id) {
                    next.previous = patch.previous;
                }
                Rejection::Superseded
            }
            None => Rejection::Restore {
                cell: patch.cell,
                previous: patch.previous,
            },
        }
    }

    /// Fresh data from the owner supersedes every pending patch
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}
