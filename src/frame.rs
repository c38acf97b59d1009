//! In-memory rectangular table used by every pipeline stage.
//!
//! A `Frame` owns its column names, one row identity per row and the row
//! cells. Stages take a `Frame` by value and hand back the transformed one;
//! nothing keeps a view of a previous version alive.
//!
//! Row identities are assigned by [`Frame::reindex`] (dense, zero-based) and
//! survive row removal, so rows dropped by deduplication leave gaps.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    error::{PipelineError, Result, Stage},
    value::{Cell, CellKind, Value},
};

/// One loaded record: field name and cell, in the order the fields were read.
pub type Record = Vec<(String, Cell)>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<String>,
    row_ids: Vec<usize>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Frame {
            columns,
            row_ids: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds a frame from complete rows. Row identities are `0..rows.len()`.
    ///
    /// # Panics
    ///
    /// Panics if a row's width differs from the number of columns.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let row_ids = (0..rows.len()).collect();
        Self::with_row_ids(columns, row_ids, rows)
    }

    /// # Panics
    ///
    /// Panics if the identity count or a row's width does not line up.
    pub fn with_row_ids(columns: Vec<String>, row_ids: Vec<usize>, rows: Vec<Vec<Cell>>) -> Self {
        assert_eq!(row_ids.len(), rows.len(), "one identity per row");
        for row in &rows {
            assert_eq!(row.len(), columns.len(), "row width matches column count");
        }
        Frame {
            columns,
            row_ids,
            rows,
        }
    }

    /// Converts a batch of records in one pass. The column set is the union
    /// of all record fields in first-seen order; fields a record lacks
    /// become nulls.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for (name, _) in record {
                if !positions.contains_key(name) {
                    positions.insert(name.clone(), columns.len());
                    columns.push(name.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![None; columns.len()];
                for (name, cell) in record {
                    row[positions[&name]] = cell;
                }
                row
            })
            .collect();
        Self::from_rows(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_set(&self) -> BTreeSet<String> {
        self.columns.iter().cloned().collect()
    }

    /// Kind of each column, taken from its first non-null cell. A column
    /// with no values at all is reported as float so that its empty
    /// fields read back as nulls.
    pub fn column_kinds(&self) -> BTreeMap<String, CellKind> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let kind = self
                    .column_cells(idx)
                    .find_map(|cell| cell.as_ref().map(CellKind::of))
                    .unwrap_or(CellKind::Float);
                (name.clone(), kind)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, position: usize) -> &[Cell] {
        &self.rows[position]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str, stage: Stage) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                stage,
                column: name.to_string(),
            })
    }

    /// Position of the row carrying `row_id`, if it is still present.
    pub fn position_of(&self, row_id: usize) -> Option<usize> {
        self.row_ids.iter().position(|id| *id == row_id)
    }

    pub fn get(&self, position: usize, column: usize) -> Option<&Value> {
        self.rows[position][column].as_ref()
    }

    pub fn set(&mut self, position: usize, column: usize, cell: Cell) {
        self.rows[position][column] = cell;
    }

    pub fn column_cells(&self, column: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[column])
    }

    /// Positions of rows whose cell in `column` is null.
    pub fn null_positions(&self, column: usize) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[column].is_none())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn null_count(&self, column: usize) -> usize {
        self.rows.iter().filter(|row| row[column].is_none()).count()
    }

    pub fn rename_column(&mut self, column: usize, name: String) {
        self.columns[column] = name;
    }

    /// Appends a column at the right-hand edge.
    ///
    /// # Panics
    ///
    /// Panics if `cells` does not hold exactly one cell per row.
    pub fn push_column(&mut self, name: String, cells: Vec<Cell>) {
        assert_eq!(cells.len(), self.rows.len(), "one cell per row");
        self.columns.push(name);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
    }

    /// Removes a column and returns its cells.
    pub fn drop_column(&mut self, column: usize) -> Vec<Cell> {
        self.columns.remove(column);
        self.rows.iter_mut().map(|row| row.remove(column)).collect()
    }

    /// Keeps rows whose flag is `true`, preserving order and identities.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        let rows = std::mem::take(&mut self.rows);
        let ids = std::mem::take(&mut self.row_ids);
        for ((row, id), keep) in rows.into_iter().zip(ids).zip(keep) {
            if *keep {
                self.rows.push(row);
                self.row_ids.push(id);
            }
        }
    }

    /// Reorders the columns to `order`, which must name exactly the frame's
    /// columns.
    pub fn reorder_columns(self, order: &[String], stage: Stage) -> Result<Frame> {
        let mapping = order
            .iter()
            .map(|name| self.require_column(name, stage))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                mapping
                    .iter()
                    .map(|idx| row[*idx].take())
                    .collect::<Vec<_>>()
            })
            .collect();
        Ok(Frame {
            columns: order.to_vec(),
            row_ids: self.row_ids,
            rows,
        })
    }

    /// Appends `other`'s rows below this frame's rows. Both frames must
    /// share the same column order.
    pub fn append(&mut self, other: Frame) {
        debug_assert_eq!(self.columns, other.columns);
        self.row_ids.extend(other.row_ids);
        self.rows.extend(other.rows);
    }

    /// Replaces every row identity with its dense zero-based position.
    pub fn reindex(&mut self) {
        self.row_ids = (0..self.rows.len()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Cell {
        Some(Value::Text(value.to_string()))
    }

    #[test]
    fn from_records_fills_missing_fields_with_null() {
        let frame = Frame::from_records(vec![
            vec![("a".to_string(), text("x")), ("b".to_string(), text("y"))],
            vec![("c".to_string(), Some(Value::Integer(3)))],
        ]);
        assert_eq!(frame.columns(), ["a", "b", "c"]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.row(0), [text("x"), text("y"), None]);
        assert_eq!(frame.row(1), [None, None, Some(Value::Integer(3))]);
        assert_eq!(frame.row_ids(), [0, 1]);
    }

    #[test]
    fn retain_rows_keeps_identities() {
        let mut frame = Frame::from_rows(
            vec!["a".to_string()],
            vec![vec![text("1")], vec![text("2")], vec![text("3")]],
        );
        frame.retain_rows(&[true, false, true]);
        assert_eq!(frame.row_ids(), [0, 2]);
        assert_eq!(frame.position_of(2), Some(1));
        assert_eq!(frame.position_of(1), None);
        frame.reindex();
        assert_eq!(frame.row_ids(), [0, 1]);
    }

    #[test]
    fn reorder_columns_moves_cells() {
        let frame = Frame::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![text("1"), text("2")]],
        );
        let reordered = frame
            .reorder_columns(&["b".to_string(), "a".to_string()], Stage::Merge)
            .unwrap();
        assert_eq!(reordered.columns(), ["b", "a"]);
        assert_eq!(reordered.row(0), [text("2"), text("1")]);
    }

    #[test]
    fn push_and_drop_column() {
        let mut frame = Frame::from_rows(vec!["a".to_string()], vec![vec![text("1")]]);
        frame.push_column("b".to_string(), vec![Some(Value::Float(2.0))]);
        assert_eq!(frame.columns(), ["a", "b"]);
        let dropped = frame.drop_column(0);
        assert_eq!(dropped, vec![text("1")]);
        assert_eq!(frame.columns(), ["b"]);
        assert_eq!(frame.null_count(0), 0);
    }

    #[test]
    fn column_kinds_follow_first_value() {
        let frame = Frame::from_rows(
            vec!["id".to_string(), "price".to_string(), "blank".to_string()],
            vec![
                vec![text("10260"), None, None],
                vec![text("10261"), Some(Value::Float(9.5)), None],
            ],
        );
        let kinds = frame.column_kinds();
        assert_eq!(kinds["id"], CellKind::Text);
        assert_eq!(kinds["price"], CellKind::Float);
        assert_eq!(kinds["blank"], CellKind::Float);
    }
}
