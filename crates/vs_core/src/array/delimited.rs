//! Conversions between flat arrays and delimited byte streams.

use super::{Array, key_indices};
use crate::append::Appendable;
use crate::errors::{StoreError, StoreResult, messages};
use crate::text::Text;
use crate::value::Value;

const MAX_COLUMNS: u32 = 32767;

fn native_value(bytes: &[u8]) -> Value {
    Value::String(Text::from_native(bytes))
}

fn strip_trailing(bytes: &[u8], delimiter: u8) -> &[u8] {
    bytes.strip_suffix(&[delimiter]).unwrap_or(bytes)
}

impl Array {
    /// Joins entries in key order. With a key delimiter each element is
    /// `key <delim> value`; without one only values are written.
    pub fn combine(&self, element: u8, key: Option<u8>) -> StoreResult<Vec<u8>> {
        let mut out = Vec::new();
        for (i, (name, value)) in self.sorted_entries().into_iter().enumerate() {
            if i > 0 {
                out.push(element);
            }
            if let Some(key_delimiter) = key {
                out.append_str(name.as_str());
                out.push(key_delimiter);
            }
            out.extend(value.to_native_bytes()?);
        }
        Ok(out)
    }

    /// Inverse of [`Array::combine`]. Without a key delimiter elements are
    /// keyed `1..=n`; an element missing its key delimiter becomes a key with
    /// an empty value.
    pub fn split(bytes: &[u8], element: u8, key: Option<u8>) -> Array {
        let mut out = Array::new();
        if bytes.is_empty() {
            return out;
        }
        let mut index = 0u64;
        for part in strip_trailing(bytes, element).split(|&b| b == element) {
            match key {
                None => {
                    index += 1;
                    let mut name = String::new();
                    name.append_u64(index);
                    out.insert(name, native_value(part));
                }
                Some(key_delimiter) => {
                    let (name, value) = match part.iter().position(|&b| b == key_delimiter) {
                        Some(at) => (&part[..at], &part[at + 1..]),
                        None => (part, &[][..]),
                    };
                    out.insert(Text::from_native(name).as_str(), native_value(value));
                }
            }
        }
        out
    }

    /// All keys in key order; values are ignored.
    pub fn combine_as_set(&self, element: u8) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, (name, _)) in self.sorted_entries().into_iter().enumerate() {
            if i > 0 {
                out.push(element);
            }
            out.append_str(name.as_str());
        }
        out
    }

    /// Each element becomes a key holding `true`.
    pub fn split_as_set(bytes: &[u8], element: u8) -> Array {
        let mut out = Array::new();
        if bytes.is_empty() {
            return out;
        }
        for part in strip_trailing(bytes, element).split(|&b| b == element) {
            out.insert(Text::from_native(part).as_str(), Value::Boolean(true));
        }
        out
    }

    /// Interleaves column arrays row by row. Keys must be column numbers in
    /// `1..=32767`; each value holds that column's cells separated by `row`.
    /// Absent columns are skipped; a column that runs out of rows keeps
    /// contributing empty cells until every column is exhausted.
    pub fn combine_columns(&self, row: u8, col: u8) -> StoreResult<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let extents = self
            .extents()
            .filter(|e| e.len() == 1 && e[0].min >= 1 && e[0].max <= MAX_COLUMNS)
            .ok_or(StoreError::DimensionMismatch(messages::NOT_COLUMN_KEYED))?;
        let width = extents[0].max as usize;

        let mut columns: Vec<Option<Vec<u8>>> = vec![None; width];
        let mut live = 0usize;
        for (key, value) in self.iter() {
            if value.is_none() {
                continue;
            }
            let Some(ix) = key_indices(key.as_str()) else {
                continue;
            };
            let slot = &mut columns[ix[0] as usize - 1];
            if slot.is_some() {
                return Err(StoreError::DimensionMismatch(messages::DUPLICATE_COLUMN));
            }
            *slot = Some(value.to_native_bytes()?);
            live += 1;
        }
        let width = columns.iter().rposition(Option::is_some).map_or(0, |p| p + 1);

        let mut cursors = vec![0usize; width];
        let mut dead = vec![false; width];
        let mut out = Vec::new();
        while live > 0 {
            for c in 0..width {
                let Some(column) = &columns[c] else {
                    continue;
                };
                let rest = &column[cursors[c]..];
                let cell = rest.iter().position(|&b| b == row).unwrap_or(rest.len());
                if cell == rest.len() && !dead[c] {
                    dead[c] = true;
                    live -= 1;
                }
                out.extend_from_slice(&rest[..cell]);
                cursors[c] += cell;
                if cursors[c] < column.len() {
                    cursors[c] += 1;
                }
                if c + 1 < width {
                    out.push(col);
                } else if live > 0 {
                    out.push(row);
                }
            }
        }
        Ok(out)
    }

    /// Inverse of [`Array::combine_columns`]: splits rows, then cells, and
    /// gathers each column's cells under keys `1..=n`. Short rows pad the
    /// missing columns with empty cells.
    pub fn split_columns(bytes: &[u8], row: u8, col: u8) -> Array {
        let limit = bytes.len();
        let mut columns: Vec<Vec<u8>> = Vec::new();
        let mut row_index = 0usize;
        let mut frontier = 0usize;
        while frontier < limit {
            row_index += 1;
            let row_limit = bytes[frontier..]
                .iter()
                .position(|&b| b == row)
                .map_or(limit, |p| frontier + p);
            let mut col_index = 0usize;
            while frontier <= row_limit {
                col_index += 1;
                let cell_limit = bytes[frontier..row_limit]
                    .iter()
                    .position(|&b| b == col)
                    .map_or(row_limit, |p| frontier + p);
                if frontier == row_limit && columns.len() < col_index {
                    // Trailing column delimiter opens no new column.
                    frontier += 1;
                    break;
                }
                if columns.len() < col_index {
                    columns.push(vec![row; row_index - 1]);
                }
                let column = &mut columns[col_index - 1];
                column.extend_from_slice(&bytes[frontier..cell_limit]);
                if row_limit != limit {
                    column.push(row);
                }
                frontier = cell_limit + 1;
            }
            if row_limit != limit {
                for column in columns.iter_mut().skip(col_index) {
                    column.push(row);
                }
            }
        }

        let mut out = Array::new();
        for (i, column) in columns.iter().enumerate() {
            let mut key = String::new();
            key.append_u64(i as u64 + 1);
            out.insert(key, native_value(column));
        }
        out
    }
}
