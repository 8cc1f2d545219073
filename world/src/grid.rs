//! Dense ice field backing the level terrain.

use iceman_core::{CellCoord, FIELD_SIZE, FOOTPRINT, ICE_ROWS, MAX_ANCHOR};

const CELL_COUNT: usize = (FIELD_SIZE as usize) * (FIELD_SIZE as usize);

/// First column of the starting shaft carved down the middle of the field.
pub(crate) const SHAFT_FIRST_COLUMN: u32 = 30;
/// Last column of the starting shaft.
pub(crate) const SHAFT_LAST_COLUMN: u32 = 33;
/// Lowest row of the starting shaft; rows beneath it keep their ice.
pub(crate) const SHAFT_BOTTOM_ROW: u32 = 4;

/// Square grid where each cell either holds one unit of ice or is open.
#[derive(Clone, Debug)]
pub(crate) struct IceField {
    size: u32,
    cells: Vec<bool>,
}

impl IceField {
    /// Creates a field with no ice at all.
    pub(crate) fn empty() -> Self {
        Self {
            size: FIELD_SIZE,
            cells: vec![false; CELL_COUNT],
        }
    }

    /// Creates the starting layout: ice below the surface rows, minus the shaft.
    pub(crate) fn level_layout() -> Self {
        let mut field = Self::empty();
        for y in 0..ICE_ROWS {
            for x in 0..field.size {
                let in_shaft = (SHAFT_FIRST_COLUMN..=SHAFT_LAST_COLUMN).contains(&x)
                    && y >= SHAFT_BOTTOM_ROW;
                if in_shaft {
                    continue;
                }
                if let Some(index) = field.index(CellCoord::new(x, y)) {
                    field.cells[index] = true;
                }
            }
        }
        field
    }

    /// Reports whether the cell holds ice. Out-of-bounds cells hold none.
    pub(crate) fn has_ice(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether the cell lies inside the field and holds no ice.
    pub(crate) fn is_open(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .is_some_and(|ice| !ice)
    }

    /// Removes the ice at the cell, returning whether any was present.
    pub(crate) fn clear(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) else {
            return false;
        };
        let had_ice = *slot;
        *slot = false;
        had_ice
    }

    /// Removes every unit of ice under the footprint anchored at `anchor`.
    pub(crate) fn clear_footprint(&mut self, anchor: CellCoord) -> usize {
        footprint_cells(anchor)
            .filter(|cell| self.clear(*cell))
            .count()
    }

    /// Reports whether the whole footprint is inside the field and ice-free.
    pub(crate) fn footprint_is_open(&self, anchor: CellCoord) -> bool {
        anchor_in_bounds(anchor) && footprint_cells(anchor).all(|cell| self.is_open(cell))
    }

    /// Reports whether any ice sits in the row directly below the footprint.
    pub(crate) fn has_ice_below(&self, anchor: CellCoord) -> bool {
        let Some(row) = anchor.y().checked_sub(1) else {
            return false;
        };
        (anchor.x()..anchor.x().saturating_add(FOOTPRINT)).any(|x| self.has_ice(CellCoord::new(x, row)))
    }

    /// Number of cells that still hold ice.
    pub(crate) fn ice_count(&self) -> usize {
        self.cells.iter().filter(|ice| **ice).count()
    }

    /// Removes all ice from the field.
    pub(crate) fn clear_all(&mut self) {
        self.cells.fill(false);
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.size && cell.y() < self.size {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Reports whether a footprint anchored at `anchor` fits inside the field.
pub(crate) fn anchor_in_bounds(anchor: CellCoord) -> bool {
    anchor.x() <= MAX_ANCHOR && anchor.y() <= MAX_ANCHOR
}

/// Reports whether a footprint anchored at `anchor` overlaps the starting shaft.
///
/// Anchors outside the field never overlap it.
pub(crate) fn overlaps_shaft(anchor: CellCoord) -> bool {
    if !anchor_in_bounds(anchor) {
        return false;
    }
    let reaches_columns = anchor.x() + FOOTPRINT > SHAFT_FIRST_COLUMN && anchor.x() <= SHAFT_LAST_COLUMN;
    let reaches_rows = anchor.y() + FOOTPRINT > SHAFT_BOTTOM_ROW;
    reaches_columns && reaches_rows
}

/// Cells covered by the footprint anchored at `anchor`, row by row.
pub(crate) fn footprint_cells(anchor: CellCoord) -> impl Iterator<Item = CellCoord> {
    (0..FOOTPRINT).flat_map(move |dy| {
        (0..FOOTPRINT).map(move |dx| {
            CellCoord::new(anchor.x().saturating_add(dx), anchor.y().saturating_add(dy))
        })
    })
}
