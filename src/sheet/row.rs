//! Row accumulation buffer.

/// Reusable buffer for the row currently being accumulated.
///
/// One buffer lives for the whole sheet read. Sheets can run to tens of
/// thousands of rows, so the slots are cleared in place between rows
/// instead of reallocated. Width only ever grows: once a cell lands past
/// the current width, the wider buffer persists for every later row.
#[derive(Debug, Default)]
pub(crate) struct RowBuffer {
    values: Vec<String>,
    allocated: bool,
}

impl RowBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Prepare for a new row.
    ///
    /// The first call allocates the buffer at the hinted width (possibly
    /// 0); later calls clear each existing slot in place.
    pub(crate) fn start_row(&mut self, width_hint: usize) {
        if !self.allocated {
            self.values = vec![String::new(); width_hint];
            self.allocated = true;
        } else {
            for slot in &mut self.values {
                slot.clear();
            }
        }
    }

    /// Write a cell value at the given column index, growing the buffer
    /// when the index is past the current width.
    ///
    /// Growth happens when the dimension hint under-counted columns or
    /// was absent; new slots are empty strings.
    pub(crate) fn set(&mut self, col: usize, value: String) {
        if col >= self.values.len() {
            self.values.resize_with(col + 1, String::new);
        }
        self.values[col] = value;
    }

    /// Take an immutable snapshot of the current row.
    ///
    /// Always a deep copy: the live buffer is reused for the next row,
    /// and callers may hold on to earlier rows.
    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.values.clone()
    }
}
