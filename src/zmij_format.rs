//! Float text for `type="float"` elements.

use num_traits::float::FloatCore;
use zmij::Float;

/// Shortest round-trip form, always with a fraction (`4e-6` becomes `4.0e-6`).
/// Non-finite values use the xs:double spellings `NaN`, `INF` and `-INF`.
pub(crate) fn push_float_string<F: Float + FloatCore>(target: &mut String, f: F) {
    if f.is_nan() {
        target.push_str("NaN");
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            target.push_str("INF");
        } else {
            target.push_str("-INF");
        }
    } else {
        let mut buf = zmij::Buffer::new();
        let s = buf.format_finite(f);
        if !s.as_bytes().contains(&b'.') {
            if let Some(exp_pos) = s.find('e').or_else(|| s.find('E')) {
                // "4e-6" -> "4.0e-6"
                target.push_str(&s[..exp_pos]);
                target.push_str(".0");
                target.push_str(&s[exp_pos..]);
            } else {
                target.push_str(s);
                target.push_str(".0");
            }
        } else {
            target.push_str(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(f: f64) -> String {
        let mut s = String::new();
        push_float_string(&mut s, f);
        s
    }

    #[test]
    fn whole_numbers_keep_a_fraction() {
        assert_eq!(fmt(135.0), "135.0");
        assert_eq!(fmt(0.5), "0.5");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(fmt(f64::NAN), "NaN");
        assert_eq!(fmt(f64::INFINITY), "INF");
        assert_eq!(fmt(f64::NEG_INFINITY), "-INF");
    }

    #[test]
    fn output_parses_back() {
        for f in [1.5e-7, 123456.789, -0.25, 1e300] {
            let text = fmt(f);
            assert_eq!(text.parse::<f64>().unwrap(), f, "{text}");
        }
    }
}
