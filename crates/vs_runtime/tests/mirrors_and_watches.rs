mod common;

use common::{Harness, Notification, text};
use pretty_assertions::assert_eq;
use vs_runtime::{Frame, Scope, ScopeKind, SetStyle, StoreError, Value, VarFlags, Variable, Watch};

#[test]
fn environment_variables_start_from_the_process_value() {
    let h = Harness::with_env(&[("HOME", "/home/user")]);
    let mut globals = Scope::new(ScopeKind::Global);
    let var = globals.ensure("$HOME", h.caps.env.as_ref(), &h.config);
    assert!(var.is_environment());
    assert!(var.is_global());
    assert_eq!(text(&var.eval(&[]).unwrap()), "/home/user");
}

#[test]
fn writes_and_removal_mirror_to_the_environment() {
    let mut h = Harness::with_env(&[("EDITOR", "vi")]);
    let mut globals = Scope::new(ScopeKind::Global);
    globals.ensure("$EDITOR", h.caps.env.as_ref(), &h.config);

    let var = globals.lookup("$editor").unwrap();
    var.set(&mut h.ctx(), Value::str("ed"), &[], SetStyle::Into).unwrap();
    assert_eq!(h.env("EDITOR").as_deref(), Some("ed"));
    var.set(&mut h.ctx(), Value::str("!"), &[], SetStyle::After).unwrap();
    assert_eq!(h.env("EDITOR").as_deref(), Some("ed!"));
    var.remove(&mut h.ctx(), &[]).unwrap();
    assert_eq!(h.env("EDITOR"), None);
}

#[test]
fn positional_parameters_are_not_mirrored() {
    let mut h = Harness::new();
    let mut var = Variable::with_flags("$1", VarFlags::ENVIRONMENT);
    var.set(&mut h.ctx(), Value::str("arg"), &[], SetStyle::Into).unwrap();
    assert_eq!(h.env("1"), None);
    assert_eq!(text(&var.eval(&[]).unwrap()), "arg");
}

#[test]
fn mirroring_can_be_disabled() {
    let mut h = Harness::new();
    h.config.mirror_environment = false;
    let mut var = Variable::with_flags("$LANG", VarFlags::ENVIRONMENT);
    var.set(&mut h.ctx(), Value::str("C"), &[], SetStyle::Into).unwrap();
    assert_eq!(h.env("LANG"), None);
}

#[test]
fn global_watch_reports_each_write() {
    let mut h = Harness::new();
    let log = h.hook(Ok(Value::Boolean(true)));
    h.watches.add(Watch::new("count"));
    let mut count = Variable::with_flags("Count", VarFlags::GLOBAL);
    count.set(&mut h.ctx(), Value::Int(1), &[], SetStyle::Into).unwrap();
    count.set(&mut h.ctx(), Value::Int(2), &[], SetStyle::After).unwrap();
    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[1],
        Notification {
            variable: "Count".to_string(),
            handler: None,
            object: None,
            value: Value::str("12"),
        }
    );
}

#[test]
fn handler_watch_reports_the_frame() {
    let mut h = Harness::new();
    let log = h.hook(Ok(Value::Boolean(true)));
    h.watches.add(Watch::new("tmp").in_handler("mouseUp").on_object("button 1"));
    h.frame = Frame::new("MOUSEUP", Some("button 1"));
    let mut tmp = Variable::new("tmp");
    tmp.set(&mut h.ctx(), Value::str("x"), &[], SetStyle::Into).unwrap();
    h.frame = Frame::new("mouseUp", Some("button 2"));
    tmp.set(&mut h.ctx(), Value::str("y"), &[], SetStyle::Into).unwrap();
    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].handler.as_deref(), Some("MOUSEUP"));
    assert_eq!(log[0].object.as_deref(), Some("button 1"));
}

#[test]
fn false_guard_suppresses_notification() {
    let mut h = Harness::new();
    let log = h.hook(Ok(Value::str("false")));
    h.watches.add(Watch::new("g").when("g > 10"));
    let mut g = Variable::with_flags("g", VarFlags::GLOBAL);
    g.set(&mut h.ctx(), Value::Int(5), &[], SetStyle::Into).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn failing_guard_is_swallowed() {
    let mut h = Harness::new();
    let log = h.hook(Err(StoreError::BadIndex("guard".to_string())));
    h.watches.add(Watch::new("g").when("nonsense"));
    let mut g = Variable::with_flags("g", VarFlags::GLOBAL);
    assert_eq!(g.set(&mut h.ctx(), Value::Int(5), &[], SetStyle::Into), Ok(()));
    assert_eq!(g.eval(&[]).unwrap(), Value::Int(5));
    assert!(log.borrow().is_empty());
}

#[test]
fn non_boolean_guard_is_swallowed() {
    let mut h = Harness::new();
    let log = h.hook(Ok(Value::Int(1)));
    h.watches.add(Watch::new("g").when("1"));
    let mut g = Variable::with_flags("g", VarFlags::GLOBAL);
    g.set(&mut h.ctx(), Value::Int(5), &[], SetStyle::Into).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn watches_can_be_switched_off() {
    let mut h = Harness::new();
    let log = h.hook(Ok(Value::Boolean(true)));
    h.watches.add(Watch::new("g"));
    h.config.notify_watches = false;
    let mut g = Variable::with_flags("g", VarFlags::GLOBAL);
    g.set(&mut h.ctx(), Value::Int(5), &[], SetStyle::Into).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn clearing_a_watched_variable_notifies() {
    let mut h = Harness::new();
    let log = h.hook(Ok(Value::Boolean(true)));
    h.watches.add(Watch::new("g"));
    let mut g = Variable::with_flags("g", VarFlags::GLOBAL);
    g.set(&mut h.ctx(), Value::Int(5), &[], SetStyle::Into).unwrap();
    g.remove(&mut h.ctx(), &[]).unwrap();
    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].value, Value::None);
}
