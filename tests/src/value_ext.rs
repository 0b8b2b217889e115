//! Value conversion utilities.

use weft_core::Value;

/// Trait for converting values into Row values.
pub trait IntoRowValue {
    fn into_row_value(self) -> Value;
}

impl IntoRowValue for Value {
    fn into_row_value(self) -> Value {
        self
    }
}

impl IntoRowValue for &str {
    fn into_row_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoRowValue for String {
    fn into_row_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoRowValue for i64 {
    fn into_row_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoRowValue for i32 {
    fn into_row_value(self) -> Value {
        Value::Int(self as i64)
    }
}

impl IntoRowValue for f64 {
    fn into_row_value(self) -> Value {
        Value::Float(self)
    }
}
