//! Amount coercion.
//!
//! Ledger operations accept anything implementing [`AmountInput`]: the
//! numeric primitives, numeric strings (as typed by bot users), and JSON
//! values. Coercion either yields a finite `f64` or fails; nothing is
//! silently turned into zero.

use crate::error::{LedgerError, Result};
use serde_json::Value;

/// A value that may be coerced to a finite amount.
pub trait AmountInput {
    /// Returns the finite amount, or `None` if the input is not numeric.
    fn coerce(&self) -> Option<f64>;

    /// Short rendering of the input for error messages.
    fn describe(&self) -> String;
}

/// Coerces `input` or fails with [`LedgerError::NonNumericInput`].
pub(crate) fn require(input: &impl AmountInput) -> Result<f64> {
    input
        .coerce()
        .ok_or_else(|| LedgerError::non_numeric(input.describe()))
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn parse_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().and_then(finite)
}

impl AmountInput for f64 {
    fn coerce(&self) -> Option<f64> {
        finite(*self)
    }

    fn describe(&self) -> String {
        format!("number {self}")
    }
}

impl AmountInput for f32 {
    fn coerce(&self) -> Option<f64> {
        finite(f64::from(*self))
    }

    fn describe(&self) -> String {
        format!("number {self}")
    }
}

macro_rules! impl_amount_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AmountInput for $ty {
                fn coerce(&self) -> Option<f64> {
                    Some(*self as f64)
                }

                fn describe(&self) -> String {
                    format!("number {self}")
                }
            }
        )*
    };
}

impl_amount_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl AmountInput for str {
    fn coerce(&self) -> Option<f64> {
        parse_str(self)
    }

    fn describe(&self) -> String {
        format!("string {self:?}")
    }
}

impl AmountInput for String {
    fn coerce(&self) -> Option<f64> {
        parse_str(self)
    }

    fn describe(&self) -> String {
        format!("string {self:?}")
    }
}

impl AmountInput for Value {
    fn coerce(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64().and_then(finite),
            Value::String(s) => parse_str(s),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        let kind = match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        format!("{kind} {self}")
    }
}

impl<T: AmountInput + ?Sized> AmountInput for &T {
    fn coerce(&self) -> Option<f64> {
        (**self).coerce()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: AmountInput> AmountInput for Option<T> {
    fn coerce(&self) -> Option<f64> {
        self.as_ref().and_then(AmountInput::coerce)
    }

    fn describe(&self) -> String {
        match self {
            Some(inner) => inner.describe(),
            None => "nothing".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitives_coerce() {
        assert_eq!(5_i32.coerce(), Some(5.0));
        assert_eq!(7_u64.coerce(), Some(7.0));
        assert_eq!(2.5_f32.coerce(), Some(2.5));
        assert_eq!((-1.25_f64).coerce(), Some(-1.25));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert_eq!(f64::NAN.coerce(), None);
        assert_eq!(f64::INFINITY.coerce(), None);
        assert_eq!(f32::NEG_INFINITY.coerce(), None);
    }

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!("42".coerce(), Some(42.0));
        assert_eq!(" 1.5 ".coerce(), Some(1.5));
        assert_eq!(String::from("-3").coerce(), Some(-3.0));
        assert_eq!("1e3".coerce(), Some(1000.0));
    }

    #[test]
    fn garbage_strings_are_rejected() {
        assert_eq!("".coerce(), None);
        assert_eq!("   ".coerce(), None);
        assert_eq!("ten".coerce(), None);
        assert_eq!("NaN".coerce(), None);
        assert_eq!("inf".coerce(), None);
    }

    #[test]
    fn json_values() {
        assert_eq!(json!(3).coerce(), Some(3.0));
        assert_eq!(json!("4.5").coerce(), Some(4.5));
        assert_eq!(json!(null).coerce(), None);
        assert_eq!(json!(true).coerce(), None);
        assert_eq!(json!([1]).coerce(), None);
    }

    #[test]
    fn options() {
        assert_eq!(Some(2_i32).coerce(), Some(2.0));
        assert_eq!(None::<i32>.coerce(), None);
    }

    #[test]
    fn require_reports_truncated_input() {
        let long = "x".repeat(80);
        let err = require(&long.as_str()).unwrap_err();
        match err {
            LedgerError::NonNumericInput(shown) => assert_eq!(shown.chars().count(), 50),
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(require(&"12").unwrap(), 12.0);
    }
}
