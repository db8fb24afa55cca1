mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{Harness, text};
use pretty_assertions::assert_eq;
use vs_core::{Bytes, ConversionError};
use vs_runtime::{Array, Name, SetStyle, StoreError, Value, VarFlags, Variable};

fn data(bytes: &[u8]) -> Value {
    Value::Data(Bytes::from(bytes.to_vec()))
}

fn path(keys: &[&str]) -> Vec<Name> {
    keys.iter().map(|k| Name::from(*k)).collect()
}

#[test]
fn appending_does_not_disturb_earlier_reads() {
    let mut h = Harness::new();
    let mut x = Variable::new("x");
    x.set(&mut h.ctx(), Value::str("hi"), &[], SetStyle::Into).unwrap();
    let reader = x.eval(&[]).unwrap();
    x.set(&mut h.ctx(), Value::str("!"), &[], SetStyle::After).unwrap();
    assert_eq!(text(&reader), "hi");
    assert_eq!(text(&x.eval(&[]).unwrap()), "hi!");
}

#[test]
fn prepending_text() {
    let mut h = Harness::new();
    let mut x = Variable::new("x");
    x.set(&mut h.ctx(), Value::str("world"), &[], SetStyle::Into).unwrap();
    x.set(&mut h.ctx(), Value::str("hello "), &[], SetStyle::Before).unwrap();
    assert_eq!(text(&x.eval(&[]).unwrap()), "hello world");
}

#[test]
fn deferred_value_is_computed_once() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let mut v = Variable::deferred("lazy", move |var| {
        seen.set(seen.get() + 1);
        var.assign(Value::Int(42));
        Ok(())
    });
    assert!(v.is_deferred());
    assert!(!v.is_clear());
    assert_eq!(v.eval(&[]).unwrap(), Value::Int(42));
    assert_eq!(v.eval(&[]).unwrap(), Value::Int(42));
    assert_eq!(calls.get(), 1);
    assert!(!v.is_deferred());
}

#[test]
fn failed_compute_propagates() {
    let mut v = Variable::deferred("lazy", |_| Err(StoreError::Range));
    assert_eq!(v.eval(&[]), Err(StoreError::Range));
    assert!(v.eval(&[]).unwrap().is_empty());
    assert!(!v.is_deferred());
}

#[test]
fn unquoted_literal_reads_its_name_until_written() {
    let mut h = Harness::new();
    let mut v = Variable::unquoted("Foo");
    assert!(v.is_uql());
    assert_eq!(text(&v.eval(&[]).unwrap()), "Foo");
    v.set(&mut h.ctx(), Value::str("bar"), &[], SetStyle::After).unwrap();
    assert!(!v.is_uql());
    assert_eq!(text(&v.eval(&[]).unwrap()), "bar");
}

#[test]
fn path_writes_create_nested_arrays() {
    let mut h = Harness::new();
    let mut v = Variable::new("tree");
    v.set(&mut h.ctx(), Value::str("leaf"), &path(&["a", "b"]), SetStyle::Into).unwrap();
    assert!(v.is_array().unwrap());
    assert_eq!(text(&v.eval(&path(&["A", "B"])).unwrap()), "leaf");
    assert_eq!(v.eval(&path(&["a", "missing"])).unwrap(), Value::empty_string());
    let top = v.eval(&path(&["a"])).unwrap();
    assert_eq!(top.as_array().map(Array::len), Some(1));
}

#[test]
fn path_writes_replace_scalars_on_the_way() {
    let mut h = Harness::new();
    let mut v = Variable::new("v");
    v.set(&mut h.ctx(), Value::str("flat"), &[], SetStyle::Into).unwrap();
    v.set(&mut h.ctx(), Value::Int(1), &path(&["k"]), SetStyle::Into).unwrap();
    assert_eq!(v.eval(&path(&["k"])).unwrap(), Value::Int(1));
}

#[test]
fn element_copies_are_independent() {
    let mut h = Harness::new();
    let mut v = Variable::new("v");
    v.set(&mut h.ctx(), Value::str("one"), &path(&["k"]), SetStyle::Into).unwrap();
    let before = v.eval(&[]).unwrap();
    v.set(&mut h.ctx(), Value::str("two"), &path(&["k"]), SetStyle::Into).unwrap();
    assert_eq!(text(&before.as_array().unwrap().get("k").unwrap()), "one");
}

#[test]
fn data_appends_stay_binary() {
    let mut h = Harness::new();
    let mut v = Variable::new("buf");
    v.set(&mut h.ctx(), data(b"ab"), &[], SetStyle::After).unwrap();
    v.set(&mut h.ctx(), data(b"cd"), &[], SetStyle::After).unwrap();
    v.set(&mut h.ctx(), data(b"x"), &[], SetStyle::Before).unwrap();
    assert_eq!(v.eval(&[]).unwrap(), data(b"xabcd"));
    assert!(matches!(v.eval(&[]).unwrap(), Value::Data(_)));
}

#[test]
fn text_appends_to_data_become_text() {
    let mut h = Harness::new();
    let mut v = Variable::new("buf");
    v.set(&mut h.ctx(), data(b"ab"), &[], SetStyle::Into).unwrap();
    v.set(&mut h.ctx(), Value::str("c"), &[], SetStyle::After).unwrap();
    assert!(matches!(v.eval(&[]).unwrap(), Value::String(_)));
    assert_eq!(text(&v.eval(&[]).unwrap()), "abc");
}

#[test]
fn data_appends_to_wide_text_stay_text() {
    let mut h = Harness::new();
    let mut v = Variable::new("t");
    v.set(&mut h.ctx(), Value::str("€"), &[], SetStyle::Into).unwrap();
    assert!(!v.can_become_byte_buffer(&[]).unwrap());
    v.set(&mut h.ctx(), data(b"1"), &[], SetStyle::After).unwrap();
    assert_eq!(text(&v.eval(&[]).unwrap()), "€1");
}

#[test]
fn editing_an_array_fails_without_writing() {
    let mut h = Harness::new();
    let mut v = Variable::new("v");
    v.set(&mut h.ctx(), Value::Int(1), &path(&["k"]), SetStyle::Into).unwrap();
    let before = v.eval(&[]).unwrap();
    assert_eq!(
        v.set(&mut h.ctx(), Value::str("x"), &[], SetStyle::After),
        Err(StoreError::Conversion(ConversionError::ArrayNotScalar))
    );
    assert_eq!(
        v.replace(&mut h.ctx(), Value::str("x"), 0..1, &[]),
        Err(StoreError::NotMutable)
    );
    assert_eq!(v.eval(&[]).unwrap(), before);
}

#[test]
fn arrays_cannot_be_appended() {
    let mut h = Harness::new();
    let mut v = Variable::new("v");
    v.set(&mut h.ctx(), Value::str("a"), &[], SetStyle::Into).unwrap();
    let arr = Value::array([("k", "v")].into_iter().collect());
    assert_eq!(
        v.set(&mut h.ctx(), arr, &[], SetStyle::Before),
        Err(StoreError::Conversion(ConversionError::ArrayNotScalar))
    );
    assert_eq!(text(&v.eval(&[]).unwrap()), "a");
}

#[test]
fn replace_and_delete_ranges() {
    let mut h = Harness::new();
    let mut v = Variable::new("s");
    v.set(&mut h.ctx(), Value::str("hello"), &[], SetStyle::Into).unwrap();
    v.replace(&mut h.ctx(), Value::str("J"), 0..1, &[]).unwrap();
    assert_eq!(text(&v.eval(&[]).unwrap()), "Jello");
    v.delete_range(&mut h.ctx(), 1..3, &[]).unwrap();
    assert_eq!(text(&v.eval(&[]).unwrap()), "Jlo");
    v.replace(&mut h.ctx(), Value::str("!"), 10..12, &[]).unwrap();
    assert_eq!(text(&v.eval(&[]).unwrap()), "Jlo!");
}

#[test]
fn replace_inside_data_splices_bytes() {
    let mut h = Harness::new();
    let mut v = Variable::new("b");
    v.set(&mut h.ctx(), data(b"abcdef"), &[], SetStyle::Into).unwrap();
    v.replace(&mut h.ctx(), data(b"XY"), 2..4, &[]).unwrap();
    assert_eq!(v.eval(&[]).unwrap(), data(b"abXYef"));
}

#[test]
fn remove_element_and_whole_variable() {
    let mut h = Harness::new();
    let mut v = Variable::new("v");
    v.set(&mut h.ctx(), Value::Int(1), &path(&["a"]), SetStyle::Into).unwrap();
    v.set(&mut h.ctx(), Value::Int(2), &path(&["b"]), SetStyle::Into).unwrap();
    v.remove(&mut h.ctx(), &path(&["A"])).unwrap();
    let remaining = v.eval(&[]).unwrap();
    assert_eq!(remaining.as_array().map(Array::len), Some(1));
    v.remove(&mut h.ctx(), &path(&["nothing", "here"])).unwrap();
    v.remove(&mut h.ctx(), &[]).unwrap();
    assert!(v.is_clear());
}

#[test]
fn removing_a_deferred_variable_skips_its_compute() {
    let mut h = Harness::new();
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    let mut v = Variable::deferred("lazy", move |_| {
        flag.set(true);
        Ok(())
    });
    v.remove(&mut h.ctx(), &[]).unwrap();
    assert!(!ran.get());
    assert!(v.is_clear());
}

#[test]
fn mutable_conversions() {
    let mut v = Variable::new("v");
    v.assign(Value::Int(5));
    v.convert_to_mutable_string().unwrap();
    assert!(matches!(v.value().unwrap(), Value::String(t) if t.is_mutable()));
    v.convert_to_mutable_data().unwrap();
    assert!(matches!(v.value().unwrap(), Value::Data(b) if b.is_mutable()));
    assert_eq!(
        v.convert_to_mutable_array(),
        Err(StoreError::Conversion(ConversionError::NotAnArray))
    );
    v.clear();
    v.convert_to_mutable_array().unwrap();
    assert!(v.is_array().unwrap());
}

#[test]
fn encode_then_decode_restores_value() {
    let mut h = Harness::new();
    let mut v = Variable::new("v");
    v.set(&mut h.ctx(), Value::str("x"), &path(&["k"]), SetStyle::Into).unwrap();
    let bytes = v.encode().unwrap();
    let mut w = Variable::unquoted("w");
    w.decode(&mut h.ctx(), &bytes).unwrap();
    assert!(!w.is_uql());
    assert_eq!(w.eval(&[]).unwrap(), v.eval(&[]).unwrap());
    assert!(w.decode(&mut h.ctx(), &[42]).is_err());
    assert_eq!(w.eval(&[]).unwrap(), v.eval(&[]).unwrap());
}

#[test]
fn message_box_variables_mirror_their_text() {
    use std::cell::RefCell;
    use vs_runtime::MessageBox;

    struct Recorder(Rc<RefCell<Vec<String>>>);
    impl MessageBox for Recorder {
        fn put(&mut self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    let mut h = Harness::new();
    let shown = Rc::new(RefCell::new(Vec::new()));
    h.caps.message_box = Box::new(Recorder(Rc::clone(&shown)));
    let mut msg = Variable::with_flags("msg", VarFlags::MESSAGE_BOX);
    msg.set(&mut h.ctx(), Value::str("hello"), &[], SetStyle::Into).unwrap();
    msg.set(&mut h.ctx(), Value::Int(2), &[], SetStyle::After).unwrap();
    assert_eq!(*shown.borrow(), vec!["hello".to_string(), "hello2".to_string()]);
}
