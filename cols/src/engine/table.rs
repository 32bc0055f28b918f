//! In-memory table mutated by the executor.

/// One data row
pub type Row = Vec<String>;

/// Header plus rows, every row exactly as wide as the header.
///
/// Column mutations go through methods that keep the width invariant. Indices
/// passed to them must already be resolved against [`Table::header`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, padding short rows with empty fields and cutting long
    /// rows to the header width.
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Self {
        let width = header.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.header, self.rows)
    }

    /// Replace the row set with a filtered version of itself.
    pub(crate) fn retain_rows(&mut self, filter: impl FnOnce(Vec<Row>) -> Vec<Row>) {
        let rows = std::mem::take(&mut self.rows);
        self.rows = filter(rows);
    }

    pub(crate) fn rename(&mut self, idx: usize, name: &str) {
        self.header[idx] = name.to_string();
    }

    /// Insert an empty column named `name` before `idx`.
    pub(crate) fn insert_column(&mut self, idx: usize, name: &str) {
        self.header.insert(idx, name.to_string());
        for row in &mut self.rows {
            row.insert(idx, String::new());
        }
    }

    pub(crate) fn fill_column(&mut self, idx: usize, value: &str) {
        for row in &mut self.rows {
            row[idx] = value.to_string();
        }
    }

    pub(crate) fn replace_in_header(&mut self, find: &str, replace: &str) {
        for name in &mut self.header {
            replace_in_place(name, find, replace);
        }
    }

    pub(crate) fn replace_in_cells(&mut self, find: &str, replace: &str) {
        for field in self.rows.iter_mut().flatten() {
            replace_in_place(field, find, replace);
        }
    }

    pub(crate) fn replace_in_column(&mut self, idx: usize, find: &str, replace: &str) {
        for row in &mut self.rows {
            replace_in_place(&mut row[idx], find, replace);
        }
    }

    /// Remove the column at `from` and re-insert it at `to`.
    ///
    /// `to` is an index into the list after removal, so the moved column
    /// always ends up at `to`.
    pub(crate) fn move_column(&mut self, from: usize, to: usize) {
        move_entry(&mut self.header, from, to);
        for row in &mut self.rows {
            move_entry(row, from, to);
        }
    }

    pub(crate) fn swap_columns(&mut self, a: usize, b: usize) {
        self.header.swap(a, b);
        for row in &mut self.rows {
            row.swap(a, b);
        }
    }
}

fn replace_in_place(value: &mut String, find: &str, replace: &str) {
    if value.contains(find) {
        *value = value.replace(find, replace);
    }
}

fn move_entry(list: &mut Vec<String>, from: usize, to: usize) {
    let entry = list.remove(from);
    list.insert(to, entry);
}
