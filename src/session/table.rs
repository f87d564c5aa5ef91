use crate::geometry::CoordinateRing;

/// Maximum number of characters kept when a coordinate enters the table.
pub const MAX_COORD_LEN: usize = 12;

/// Cuts a coordinate's decimal representation to [`MAX_COORD_LEN`]
/// characters and re-parses it.
///
/// This truncates rather than rounds, and the same cut value is stored
/// wherever the trimmed coordinate is written back into the ring. The
/// policy is lossy (repeated truncation can bias a value over many
/// edits) but is kept for compatibility with existing data.
#[must_use]
pub fn trim_coord(value: f64) -> f64 {
    let s = value.to_string();
    if s.len() > MAX_COORD_LEN {
        s[..MAX_COORD_LEN].parse().unwrap_or(value)
    } else {
        value
    }
}

/// One row of the vertex table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRow {
    /// 1-based display ordinal, recomputed after every structural
    /// change. Never independently authoritative.
    pub ordinal: usize,
    pub x: f64,
    pub y: f64,
}

/// A single-field coordinate edit on a row.
///
/// The table-edit path only fires when exactly one coordinate field
/// changed; encoding the edit as one field makes that true by
/// construction and keeps gesture-driven double-field writes off this
/// path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEdit {
    X(f64),
    Y(f64),
}

/// Direction for keyboard row navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
}

/// Ordered, 1-indexed projection of a [`CoordinateRing`] into rows.
///
/// Rows reference ring entries by position: row `ordinal` maps to ring
/// offset `ordinal - 1`, so every structural change must patch both in
/// the same logical step.
#[derive(Debug, Clone, Default)]
pub struct VertexTable {
    rows: Vec<VertexRow>,
    selected: Option<usize>,
}

impl VertexTable {
    /// Builds the table from an open ring, trimming coordinates for
    /// display.
    #[must_use]
    pub fn from_ring(ring: &CoordinateRing) -> Self {
        let rows = ring
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| VertexRow {
                ordinal: i + 1,
                x: trim_coord(p.x),
                y: trim_coord(p.y),
            })
            .collect();
        Self {
            rows,
            selected: None,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[VertexRow] {
        &self.rows
    }

    /// Returns the row at `index`, if any.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&VertexRow> {
        self.rows.get(index)
    }

    /// Index of the currently selected row, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Selects the row at `index`, returning it; out-of-range indices
    /// leave the selection untouched and return `None`.
    pub fn select(&mut self, index: usize) -> Option<&VertexRow> {
        if index < self.rows.len() {
            self.selected = Some(index);
            self.rows.get(index)
        } else {
            None
        }
    }

    /// Drops the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Moves the selection one row up or down, wrapping at either end.
    /// Returns the newly selected index, or `None` without a selection.
    pub fn step_selection(&mut self, direction: NavDirection) -> Option<usize> {
        let len = self.rows.len();
        let current = self.selected?;
        let next = match direction {
            NavDirection::Up => {
                if current == 0 {
                    len - 1
                } else {
                    current - 1
                }
            }
            NavDirection::Down => {
                if current + 1 == len {
                    0
                } else {
                    current + 1
                }
            }
        };
        self.selected = Some(next);
        Some(next)
    }

    /// Inserts a row at `index` and renumbers.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_row(&mut self, index: usize, x: f64, y: f64) {
        self.rows.insert(
            index,
            VertexRow {
                ordinal: index + 1,
                x,
                y,
            },
        );
        self.renumber();
    }

    /// Removes the row at `index` and renumbers. The selection moves to
    /// the row now occupying the same offset, or to the new last row
    /// when the removed row was last. Returns the newly selected index,
    /// or `None` when the table emptied.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn remove_row(&mut self, index: usize) -> Option<usize> {
        self.rows.remove(index);
        self.renumber();
        if self.rows.is_empty() {
            self.selected = None;
            return None;
        }
        let next = index.min(self.rows.len() - 1);
        self.selected = Some(next);
        Some(next)
    }

    /// Writes both coordinate fields of the row at `index`. Out-of-range
    /// indices are ignored.
    pub fn set_row_coord(&mut self, index: usize, x: f64, y: f64) {
        if let Some(row) = self.rows.get_mut(index) {
            row.x = x;
            row.y = y;
        }
    }

    /// Recomputes every ordinal as `position + 1`. Unconditional and
    /// idempotent.
    pub fn renumber(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.ordinal = i + 1;
        }
    }
}
