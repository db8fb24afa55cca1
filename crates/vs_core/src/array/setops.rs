use std::rc::Rc;

use super::Array;
use crate::value::Value;

impl Array {
    /// Copies in every entry of `other` whose key is absent here. With
    /// `recursive`, keys holding arrays on both sides are merged instead.
    pub fn union(&mut self, other: &Array, recursive: bool) {
        for (key, theirs) in other.iter() {
            match self.get_mut(key.as_str()) {
                None => {
                    self.insert(key.clone(), theirs.snapshot());
                }
                Some(Value::Array(ours)) if recursive => {
                    if let Value::Array(theirs) = theirs {
                        if !Rc::ptr_eq(ours, theirs) {
                            Rc::make_mut(ours).union(theirs, true);
                        }
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Removes every key absent from `other`. With `recursive`, keys holding
    /// arrays on both sides are intersected instead of kept whole.
    pub fn intersect(&mut self, other: &Array, recursive: bool) {
        for key in self.keys() {
            match other.get(key.as_str()) {
                None => {
                    self.remove(key.as_str());
                }
                Some(Value::Array(theirs)) if recursive => {
                    if let Some(Value::Array(ours)) = self.get_mut(key.as_str()) {
                        if !Rc::ptr_eq(ours, theirs) {
                            Rc::make_mut(ours).intersect(theirs, true);
                        }
                    }
                }
                Some(_) => {}
            }
        }
    }
}
