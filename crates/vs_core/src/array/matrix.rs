use super::{Array, Extent, key_indices};
use crate::append::Appendable;
use crate::errors::{StoreError, StoreResult, messages};
use crate::value::Value;

fn index_key(row: u32, col: u32) -> String {
    let mut key = String::new();
    key.append_u64(row as u64);
    key.push(',');
    key.append_u64(col as u64);
    key
}

/// A dense two-dimensional array flattened row-major.
struct Grid {
    rows: Extent,
    cols: Extent,
    cells: Vec<f64>,
}

impl Grid {
    fn at(&self, row: u64, col: u64) -> f64 {
        self.cells[(row * self.cols.size() + col) as usize]
    }
}

impl Array {
    fn matrix_shape(&self) -> StoreResult<(Extent, Extent)> {
        let extents = self
            .extents()
            .filter(|e| e.len() == 2)
            .ok_or(StoreError::DimensionMismatch(messages::NOT_TWO_DIMENSIONAL))?;
        if self.has_missing_elements() {
            return Err(StoreError::DimensionMismatch(messages::HAS_MISSING_ELEMENTS));
        }
        Ok((extents[0], extents[1]))
    }

    fn grid(&self) -> StoreResult<Grid> {
        let (rows, cols) = self.matrix_shape()?;
        let mut cells = vec![None; self.count];
        for (key, value) in self.iter() {
            let ix = key_indices(key.as_str())
                .ok_or(StoreError::DimensionMismatch(messages::NOT_TWO_DIMENSIONAL))?;
            let slot = (ix[0] - rows.min) as u64 * cols.size() + (ix[1] - cols.min) as u64;
            // "01,1" and "1,1" land on the same cell and leave another empty.
            if cells[slot as usize].replace(value.to_double()?).is_some() {
                return Err(StoreError::DimensionMismatch(messages::HAS_MISSING_ELEMENTS));
            }
        }
        let cells = cells.into_iter().map(|c| c.unwrap_or_default()).collect();
        Ok(Grid { rows, cols, cells })
    }

    /// Swaps rows and columns of a dense two-dimensional array.
    pub fn transpose(&self) -> StoreResult<Array> {
        self.matrix_shape()?;
        let mut out = Array::with_table_size(self.table_size());
        for (key, value) in self.iter() {
            let ix = key_indices(key.as_str())
                .ok_or(StoreError::DimensionMismatch(messages::NOT_TWO_DIMENSIONAL))?;
            out.insert(index_key(ix[1], ix[0]), value.snapshot());
        }
        Ok(out)
    }

    /// Matrix product of two dense two-dimensional arrays. The result takes
    /// its row indices from `a` and its column indices from `b`.
    pub fn matrix_multiply(a: &Array, b: &Array) -> StoreResult<Array> {
        let lhs = a.grid()?;
        let rhs = b.grid()?;
        if lhs.cols.size() != rhs.rows.size() {
            return Err(StoreError::DimensionMismatch(messages::INNER_EXTENTS_DIFFER));
        }
        let inner = lhs.cols.size();
        let mut out = Array::new();
        for r in 0..lhs.rows.size() {
            for c in 0..rhs.cols.size() {
                let sum: f64 = (0..inner).map(|k| lhs.at(r, k) * rhs.at(k, c)).sum();
                let key = index_key(lhs.rows.min + r as u32, rhs.cols.min + c as u32);
                out.insert(key, Value::Double(sum));
            }
        }
        Ok(out)
    }
}
