mod common;

use common::{Harness, text};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vs_runtime::{Array, Container, Name, PATH_INLINE, Path, SetStyle, StoreError, Value, Variable, push_index};

fn sequence<S: AsRef<str>>(items: &[S]) -> Value {
    let mut a = Array::new();
    for (i, item) in items.iter().enumerate() {
        a.insert((i + 1).to_string(), Value::str(item.as_ref()));
    }
    Value::array(a)
}

#[test]
fn sequence_index_addresses_nested_element() {
    let mut h = Harness::new();
    let mut v = Variable::new("grid");
    Container::new(&mut v)
        .resolve(&sequence(&["a", "b"]))
        .unwrap()
        .set(&mut h.ctx(), Value::str("cell"), SetStyle::Into)
        .unwrap();
    let direct = v.eval(&[Name::from("a"), Name::from("b")]).unwrap();
    assert_eq!(text(&direct), "cell");
}

#[test]
fn scalar_indices_use_their_text() {
    let mut path = Path::new();
    push_index(&mut path, &Value::Int(3)).unwrap();
    push_index(&mut path, &Value::Double(2.5)).unwrap();
    push_index(&mut path, &Value::str("Key")).unwrap();
    let keys: Vec<&str> = path.iter().map(Name::as_str).collect();
    assert_eq!(keys, ["3", "2.5", "Key"]);
}

#[test]
fn non_sequence_arrays_are_rejected_whole() {
    let mut path = Path::new();
    push_index(&mut path, &Value::str("first")).unwrap();
    let keyed = Value::array([("x", "1")].into_iter().collect());
    assert!(matches!(push_index(&mut path, &keyed), Err(StoreError::BadIndex(_))));
    let mut nested = Array::new();
    nested.insert("1", Value::str("ok"));
    nested.insert("2", Value::array(Array::new()));
    assert!(matches!(
        push_index(&mut path, &Value::array(nested)),
        Err(StoreError::BadIndex(_))
    ));
    assert_eq!(path.len(), 1);
}

#[test]
fn zero_padded_keys_are_not_a_sequence() {
    let mut path = Path::new();
    let padded = Value::array([("01", "a"), ("2", "b")].into_iter().collect());
    assert!(matches!(push_index(&mut path, &padded), Err(StoreError::BadIndex(_))));
    assert!(path.is_empty());
}

#[test]
fn empty_array_is_not_an_index() {
    let mut path = Path::new();
    assert!(matches!(
        push_index(&mut path, &Value::array(Array::new())),
        Err(StoreError::BadIndex(_))
    ));
}

#[test]
fn container_edits_one_element() {
    let mut h = Harness::new();
    let mut v = Variable::new("v");
    let mut c = Container::new(&mut v);
    c.push_key("name");
    c.set(&mut h.ctx(), Value::str("world"), SetStyle::Into).unwrap();
    c.set(&mut h.ctx(), Value::str("hello "), SetStyle::Before).unwrap();
    c.replace(&mut h.ctx(), Value::str("W"), 6..7).unwrap();
    assert_eq!(text(&c.eval().unwrap()), "hello World");
    c.delete_range(&mut h.ctx(), 0..6).unwrap();
    assert_eq!(text(&c.eval().unwrap()), "World");
    assert!(c.can_become_byte_buffer().unwrap());
    c.remove(&mut h.ctx()).unwrap();
    assert!(c.variable().is_array().unwrap());
    assert_eq!(c.eval().unwrap(), Value::empty_string());
}

proptest! {
    #[test]
    fn sequence_paths_match_literal_keys(keys in proptest::collection::vec("[a-z]{1,4}", 1..12)) {
        let mut h = Harness::new();
        let mut via_sequence = Variable::new("a");
        Container::new(&mut via_sequence)
            .resolve(&sequence(&keys))
            .unwrap()
            .set(&mut h.ctx(), Value::Int(7), SetStyle::Into)
            .unwrap();

        let literal: Vec<Name> = keys.iter().map(|k| Name::from(k.as_str())).collect();
        let mut path = Path::new();
        push_index(&mut path, &sequence(&keys)).unwrap();
        prop_assert_eq!(path.len(), keys.len());
        prop_assert_eq!(path.spilled(), keys.len() > PATH_INLINE);

        let mut via_keys = Variable::new("b");
        via_keys.set(&mut h.ctx(), Value::Int(7), &literal, SetStyle::Into).unwrap();
        prop_assert_eq!(via_sequence.eval(&[]).unwrap(), via_keys.eval(&[]).unwrap());
        prop_assert_eq!(via_sequence.eval(&literal).unwrap(), Value::Int(7));
    }
}
