//! Directional damage ledger between session participants.

/// Square matrix of accumulated resource deltas, indexed by participant slot.
///
/// Cell `[row, col]` holds the net change the participant in slot `row` has
/// applied to the participant in slot `col` (damage negative, healing
/// positive). Slots are assigned on first admission and never move, so
/// growing the ledger copies the old sub-rectangle into the top-left of the
/// new buffer and zero-fills the new rows and columns.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageLedger {
    size: usize,
    cells: Vec<f32>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    /// Number of rows (equal to the number of columns).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.size && col < self.size).then(|| self.cells[row * self.size + col])
    }

    /// Everything slot `row` has dealt, indexed by target slot.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        (row < self.size).then(|| &self.cells[row * self.size..(row + 1) * self.size])
    }

    /// Everything slot `col` has received, indexed by source slot.
    pub fn column(&self, col: usize) -> Option<impl Iterator<Item = f32> + '_> {
        (col < self.size).then(|| (0..self.size).map(move |row| self.cells[row * self.size + col]))
    }

    /// Grows the matrix to `new_size`, preserving every existing `[i, j]`.
    ///
    /// Shrinking is never needed since participants keep their slot for the
    /// session's lifetime; a smaller `new_size` is ignored.
    pub(crate) fn grow(&mut self, new_size: usize) {
        if new_size <= self.size {
            return;
        }

        let mut cells = vec![0.0; new_size * new_size];
        for row in 0..self.size {
            let old = &self.cells[row * self.size..(row + 1) * self.size];
            cells[row * new_size..row * new_size + self.size].copy_from_slice(old);
        }

        self.size = new_size;
        self.cells = cells;
    }

    /// Adds `value` to cell `[row, col]`. Returns false if either slot is out of range.
    pub(crate) fn accumulate(&mut self, row: usize, col: usize, value: f32) -> bool {
        if row >= self.size || col >= self.size {
            return false;
        }
        self.cells[row * self.size + col] += value;
        true
    }
}
