//! 关联矩阵封装：行为库所（或条件），列为迁移（或事件），始终保持矩形。
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::index_vec::{Idx, IndexVec};

pub type SmallRow<T> = SmallVec<[T; 4]>;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct Incidence<R: Idx, C: Idx, T> {
    rows: IndexVec<R, SmallRow<T>>,
    cols: usize,
    #[serde(skip)]
    _cols: PhantomData<C>,
}

impl<R, C, T> Incidence<R, C, T>
where
    R: Idx,
    C: Idx,
    T: Clone,
{
    pub fn new(rows: usize, cols: usize, default: T) -> Self {
        let mut data = IndexVec::new();
        for _ in 0..rows {
            data.push(SmallRow::from_elem(default.clone(), cols));
        }
        Self::with_rows(data, cols)
    }

    fn with_rows(rows: IndexVec<R, SmallRow<T>>, cols: usize) -> Self {
        Self {
            rows,
            cols,
            _cols: PhantomData,
        }
    }

    /// Builds a matrix from rows that are already known to share one length.
    pub fn from_rows(rows: IndexVec<R, SmallRow<T>>) -> Self {
        let cols = rows.iter().map(|row| row.len()).next().unwrap_or_default();
        debug_assert!(rows.iter().all(|row| row.len() == cols));
        Self::with_rows(rows, cols)
    }

    pub fn rows_len(&self) -> usize {
        self.rows.len()
    }

    pub fn cols_len(&self) -> usize {
        self.cols
    }

    /// Appends one row filled with `default`; the column count is unchanged.
    pub fn push_row_with_default(&mut self, default: T) -> R {
        let row = SmallRow::from_elem(default, self.cols);
        self.rows.push(row)
    }

    /// Appends one column filled with `default` to every existing row.
    pub fn push_column_with_default(&mut self, default: T) -> C {
        let next = self.cols;
        for row in self.rows.iter_mut() {
            row.push(default.clone());
        }
        self.cols += 1;
        C::from_usize(next)
    }

    pub fn set(&mut self, row: R, col: C, value: T) {
        self.rows[row][col.index()] = value;
    }

    pub fn get(&self, row: R, col: C) -> &T {
        &self.rows[row][col.index()]
    }

    pub fn row(&self, row: R) -> &[T] {
        &self.rows[row]
    }

    pub fn rows(&self) -> &IndexVec<R, SmallRow<T>> {
        &self.rows
    }

    /// Copies one column out, indexed by row identifier.
    pub fn column(&self, col: C) -> IndexVec<R, T> {
        self.rows
            .iter()
            .map(|row| row[col.index()].clone())
            .collect()
    }

    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.cols)
    }

    pub fn to_nested_vec(&self) -> Vec<Vec<T>> {
        self.rows.iter().map(|row| row.to_vec()).collect()
    }
}

impl<R, C, T> fmt::Debug for Incidence<R, C, T>
where
    R: Idx,
    C: Idx,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incidence")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ids::{ConditionId, EventId};

    #[test]
    fn appending_keeps_matrix_rectangular() {
        let mut matrix: Incidence<ConditionId, EventId, i64> = Incidence::new(2, 1, 0);
        let event = matrix.push_column_with_default(0);
        let condition = matrix.push_row_with_default(0);
        matrix.set(condition, event, 3);

        assert_eq!(matrix.rows_len(), 3);
        assert_eq!(matrix.cols_len(), 2);
        assert!(matrix.is_rectangular());
        assert_eq!(matrix.row(condition), &[0, 3]);
        assert_eq!(matrix.column(event).into_vec(), vec![0, 0, 3]);
    }

    #[test]
    fn push_row_on_columnless_matrix_is_empty_row() {
        let mut matrix: Incidence<ConditionId, EventId, i64> = Incidence::new(0, 0, 0);
        let condition = matrix.push_row_with_default(0);
        assert!(matrix.row(condition).is_empty());
        let event = matrix.push_column_with_default(0);
        assert_eq!(*matrix.get(condition, event), 0);
    }
}
