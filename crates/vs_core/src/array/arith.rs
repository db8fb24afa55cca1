//! Element-wise arithmetic and reductions over flat arrays.

use super::Array;
use crate::errors::{StoreError, StoreResult, messages};
use crate::name::Name;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Plus,
    Minus,
    Times,
    /// Real division.
    Over,
    /// Division truncated toward zero.
    Div,
    Mod,
    /// Like `Mod` but maps into `1..=|divisor|` for positive operands.
    Wrap,
}

pub enum Operand<'a> {
    Scalar(f64),
    Array(&'a Array),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Min,
    Max,
    Average,
}

impl ArithOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> StoreResult<f64> {
        let divides = matches!(self, ArithOp::Over | ArithOp::Div | ArithOp::Mod | ArithOp::Wrap);
        if divides && rhs == 0.0 {
            return Err(StoreError::DivideByZero);
        }
        let result = match self {
            ArithOp::Plus => lhs + rhs,
            ArithOp::Minus => lhs - rhs,
            ArithOp::Times => lhs * rhs,
            ArithOp::Over => lhs / rhs,
            ArithOp::Div => (lhs / rhs).trunc(),
            ArithOp::Mod => lhs % rhs,
            ArithOp::Wrap => {
                let m = rhs.abs();
                if lhs >= 0.0 {
                    (lhs - 1.0) % m + 1.0
                } else {
                    -((-lhs - 1.0) % m + 1.0)
                }
            }
        };
        if result.is_finite() {
            Ok(result)
        } else {
            Err(StoreError::Range)
        }
    }
}

impl Array {
    /// Applies `op` to every element in place. With an array operand, each of
    /// its keys must exist here; keys it lacks are left untouched. Nothing is
    /// written unless every element succeeds.
    pub fn apply_arithmetic(&mut self, op: ArithOp, operand: Operand<'_>) -> StoreResult<()> {
        let updates: Vec<(Name, f64)> = match operand {
            Operand::Scalar(rhs) => self
                .iter()
                .map(|(k, v)| -> StoreResult<(Name, f64)> {
                    Ok((k.clone(), op.apply(v.to_double()?, rhs)?))
                })
                .collect::<StoreResult<_>>()?,
            Operand::Array(other) => other
                .iter()
                .map(|(k, theirs)| -> StoreResult<(Name, f64)> {
                    let ours = self
                        .get(k.as_str())
                        .ok_or(StoreError::DimensionMismatch(messages::KEYS_DIFFER))?;
                    Ok((k.clone(), op.apply(ours.to_double()?, theirs.to_double()?)?))
                })
                .collect::<StoreResult<_>>()?,
        };
        for (key, result) in updates {
            if let Some(slot) = self.get_mut(key.as_str()) {
                *slot = Value::Double(result);
            }
        }
        Ok(())
    }

    /// Folds element values as numbers. Empty arrays reduce to zero.
    pub fn reduce(&self, reduction: Reduction) -> StoreResult<f64> {
        if self.is_empty() {
            return Ok(0.0);
        }
        let mut values = Vec::with_capacity(self.len());
        for (_, v) in self.iter() {
            if v.is_array() {
                return Err(StoreError::DimensionMismatch(messages::NESTED_ELEMENT));
            }
            values.push(v.to_double()?);
        }
        let sum: f64 = values.iter().sum();
        Ok(match reduction {
            Reduction::Sum => sum,
            Reduction::Average => sum / values.len() as f64,
            Reduction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reduction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
