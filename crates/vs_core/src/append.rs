//! Locale-independent formatting of scalars into text and byte sinks.

use crate::Text;

/// Doubles below this magnitude print as integers when they have no
/// fractional part.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

pub trait Appendable {
    fn append_str(&mut self, s: &str);

    fn append_i64(&mut self, i: i64) {
        let mut buf = itoa::Buffer::new();
        self.append_str(buf.format(i));
    }

    fn append_u64(&mut self, u: u64) {
        let mut buf = itoa::Buffer::new();
        self.append_str(buf.format(u));
    }

    fn append_f64(&mut self, f: f64) {
        if f.fract() == 0.0 && f.abs() < EXACT_INT_LIMIT {
            self.append_i64(f as i64);
        } else {
            let mut buf = ryu::Buffer::new();
            self.append_str(buf.format(f));
        }
    }

    fn append_f32(&mut self, f: f32) {
        if f.fract() == 0.0 && (f as f64).abs() < EXACT_INT_LIMIT {
            self.append_i64(f as i64);
        } else {
            let mut buf = ryu::Buffer::new();
            self.append_str(buf.format(f));
        }
    }

    fn append_bool(&mut self, b: bool) {
        self.append_str(if b { "true" } else { "false" });
    }
}

impl Appendable for String {
    fn append_str(&mut self, s: &str) {
        self.push_str(s);
    }
}

impl Appendable for Text {
    fn append_str(&mut self, s: &str) {
        self.push_str(s);
    }
}

/// Byte sinks receive the native form; formatted numbers are always ASCII.
impl Appendable for Vec<u8> {
    fn append_str(&mut self, s: &str) {
        if s.is_ascii() {
            self.extend_from_slice(s.as_bytes());
        } else {
            self.extend(Text::from_str(s).to_native_bytes());
        }
    }
}

pub fn format_f64(f: f64) -> String {
    let mut out = String::new();
    out.append_f64(f);
    out
}
