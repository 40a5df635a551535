//! Offset-aware traversal over one employee's rows.
//!
//! The [`RowCursor`] owns the rows of a single timeline while it is being
//! evaluated. Rules read the current row and its neighbors through it and
//! store derived columns with [`RowCursor::calculate_column`], which computes
//! each column at most once per row and pulls dependencies on demand.

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, Coercion, Column, DerivedRow, TimesheetEvent};

/// A cursor over the rows of one employee timeline.
///
/// The cursor starts before the first row; call [`advance`](Self::advance) to
/// move onto it. When `advance` runs past the last row the cursor is no longer
/// positioned, but keeps the rows so a second pass can [`rewind`](Self::rewind).
///
/// # Example
///
/// ```
/// use supplement_engine::calculation::RowCursor;
///
/// let mut cursor = RowCursor::new(vec![]);
/// assert!(!cursor.advance());
/// assert_eq!(cursor.position(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RowCursor {
    rows: Vec<DerivedRow>,
    position: Option<usize>,
    exhausted: bool,
    in_progress: Vec<(usize, Column)>,
}

impl RowCursor {
    /// Creates a cursor bound to the given rows.
    pub fn new(rows: Vec<DerivedRow>) -> Self {
        let mut cursor = Self::default();
        cursor.bind(rows);
        cursor
    }

    /// Attaches a timeline, replacing any previous one.
    ///
    /// The position starts before the first row.
    pub fn bind(&mut self, rows: Vec<DerivedRow>) {
        self.rows = rows;
        self.position = None;
        self.exhausted = false;
        self.in_progress.clear();
    }

    /// Moves to the next row.
    ///
    /// Returns false, leaving the cursor unpositioned, once every row has been
    /// visited; it keeps returning false until [`rewind`](Self::rewind).
    /// The rows stay bound after exhaustion so a rewind can revisit them with
    /// their cached columns; [`bind`](Self::bind) or
    /// [`into_rows`](Self::into_rows) release them.
    pub fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = None;
            self.exhausted = true;
            false
        }
    }

    /// Moves back to before the first row, keeping all cached columns.
    pub fn rewind(&mut self) {
        self.position = None;
        self.exhausted = false;
    }

    /// Returns the zero-based index of the current row.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns the number of bound rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when no rows are bound.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn index(&self) -> EngineResult<usize> {
        self.position.ok_or(EngineError::CursorNotPositioned)
    }

    fn offset_index(&self, offset: isize) -> EngineResult<Option<usize>> {
        let index = self.index()?;
        Ok(index
            .checked_add_signed(offset)
            .filter(|i| *i < self.rows.len()))
    }

    /// Returns the event of the current row.
    pub fn event(&self) -> EngineResult<&TimesheetEvent> {
        let index = self.index()?;
        Ok(&self.rows[index].event)
    }

    /// Returns the event `offset` rows away, or `None` outside the timeline.
    pub fn neighbor_event(&self, offset: isize) -> Option<&TimesheetEvent> {
        self.offset_index(offset)
            .ok()
            .flatten()
            .map(|i| &self.rows[i].event)
    }

    /// Returns the value of a column on the current row.
    ///
    /// An unset column is `MissingColumn` when `require_existing` is true and
    /// `Empty` otherwise.
    pub fn current(&self, column: Column, require_existing: bool) -> EngineResult<CellValue> {
        let index = self.index()?;
        match self.rows[index].get(column) {
            Some(value) => Ok(value.clone()),
            None if require_existing => Err(EngineError::MissingColumn {
                column: column.to_string(),
                row: index,
            }),
            None => Ok(CellValue::Empty),
        }
    }

    /// Returns the value of a column `offset` rows away.
    ///
    /// Offsets past either end of the timeline yield `Empty`. A row inside the
    /// timeline whose column was never computed is `MissingColumn`.
    pub fn neighbor(&self, column: Column, offset: isize) -> EngineResult<CellValue> {
        match self.offset_index(offset)? {
            None => Ok(CellValue::Empty),
            Some(row) => self.rows[row]
                .get(column)
                .cloned()
                .ok_or_else(|| EngineError::MissingColumn {
                    column: column.to_string(),
                    row,
                }),
        }
    }

    /// Returns true if the column is set on the current row.
    pub fn is_set(&self, column: Column) -> EngineResult<bool> {
        let index = self.index()?;
        Ok(self.rows[index].is_set(column))
    }

    /// Stores a column on the current row; a second write is `ColumnAlreadySet`.
    pub fn set(&mut self, column: Column, value: CellValue) -> EngineResult<()> {
        let index = self.index()?;
        if self.rows[index].insert(column, value) {
            Ok(())
        } else {
            Err(EngineError::ColumnAlreadySet {
                column: column.to_string(),
                row: index,
            })
        }
    }

    /// Returns the column, computing and storing it first if it is not set.
    ///
    /// `producer` receives the cursor and may itself request other columns of
    /// the current row. Requesting a column that is still being computed is a
    /// `CyclicDependency`.
    pub fn calculate_column<F>(
        &mut self,
        column: Column,
        coercion: Coercion,
        producer: F,
    ) -> EngineResult<CellValue>
    where
        F: FnOnce(&mut Self) -> EngineResult<CellValue>,
    {
        let index = self.index()?;
        if let Some(value) = self.rows[index].get(column) {
            return Ok(value.clone());
        }
        if self.in_progress.contains(&(index, column)) {
            return Err(EngineError::CyclicDependency {
                column: column.to_string(),
                row: index,
            });
        }

        self.in_progress.push((index, column));
        let produced = producer(self);
        self.in_progress.pop();

        let value = coercion.apply(produced?);
        self.set(column, value.clone())?;
        Ok(value)
    }

    /// Returns the bound rows.
    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    /// Releases the rows.
    pub fn into_rows(self) -> Vec<DerivedRow> {
        self.rows
    }
}
