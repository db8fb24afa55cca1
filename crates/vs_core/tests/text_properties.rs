use proptest::prelude::*;
use vs_core::text::{INLINE_CAP, Text};
use vs_core::{Appendable, Value};

proptest! {
    #[test]
    fn text_from_str_respects_inline_boundary(s in ".*") {
        let t = Text::from_str(&s);
        prop_assert_eq!(t.len(), s.len());
        if s.len() <= INLINE_CAP {
            match t {
                Text::Inline { .. } => {},
                _ => prop_assert!(false, "expected Inline for len<=INLINE_CAP"),
            }
        } else {
            match t {
                Text::Shared(_) => {},
                _ => prop_assert!(false, "expected Shared for len>INLINE_CAP"),
            }
        }
    }
}

proptest! {
    #[test]
    fn text_edit_leaves_clones_alone(s in ".{0,60}", suffix in ".{1,8}") {
        let original = Text::from_str(&s);
        let mut edited = original.clone();
        edited.push_str(&suffix);
        prop_assert_eq!(original.as_str(), s.as_str());
        let expected = format!("{s}{suffix}");
        prop_assert_eq!(edited.as_str(), expected.as_str());
        prop_assert!(edited.is_mutable());
        edited.freeze();
        prop_assert!(!edited.is_mutable());
        prop_assert_eq!(edited.as_str(), expected.as_str());
    }
}

proptest! {
    #[test]
    fn replace_chars_matches_char_splice(s in ".{0,30}", start in 0usize..40, count in 0usize..40, with in ".{0,5}") {
        let mut t = Text::from_str(&s);
        t.replace_chars(start, count, &with);
        let chars: Vec<char> = s.chars().collect();
        let from = start.min(chars.len());
        let to = (from + count).min(chars.len());
        let mut expected: String = chars[..from].iter().collect();
        expected.push_str(&with);
        expected.extend(&chars[to..]);
        prop_assert_eq!(t.as_str(), expected.as_str());
    }
}

proptest! {
    #[test]
    fn native_text_round_trips_through_bytes(s in "[\\x00-\\xff]{0,40}") {
        let t = Text::from_str(&s);
        prop_assert!(t.is_native());
        let back = Text::from_native(&t.to_native_bytes());
        prop_assert_eq!(back.as_str(), s.as_str());
    }
}

proptest! {
    #[test]
    fn text_append_i64_matches_std_to_string(i in any::<i64>()) {
        let mut t = Text::new();
        t.append_i64(i);
        let expected = i.to_string();
        prop_assert_eq!(t.as_str(), expected.as_str());
    }
}

proptest! {
    #[test]
    fn integral_doubles_format_as_integers(i in -(1i64 << 52)..(1i64 << 52)) {
        let text = Value::Double(i as f64).to_text().unwrap();
        let expected = i.to_string();
        prop_assert_eq!(text.as_str(), expected.as_str());
    }
}

proptest! {
    #[test]
    fn formatted_doubles_parse_back(d in -1.0e15f64..1.0e15) {
        let text = Value::Double(d).to_text().unwrap();
        prop_assert_eq!(Value::String(text).to_double().unwrap(), d);
    }
}
