use crate::{Result, UnsupportedValueType, Value};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use url::Url;
use uuid::Uuid;

/// Conversion of a host value into the SQLite storage model.
///
/// Conversions that cannot lose information are also available through
/// `From<T> for Value`; the fallible ones (integers wider than `i64`,
/// decimals, durations) exist only here and report [`UnsupportedValueType`]
/// when the value does not fit.
pub trait AsValue {
    fn as_value(self) -> Result<Value>;
}

impl AsValue for Value {
    fn as_value(self) -> Result<Value> {
        Ok(self)
    }
}

macro_rules! impl_as_value {
    ($source:ty, |$v:ident| $conversion:expr) => {
        impl From<$source> for Value {
            fn from($v: $source) -> Self {
                $conversion
            }
        }
        impl AsValue for $source {
            fn as_value(self) -> Result<Value> {
                Ok(self.into())
            }
        }
    };
}

impl_as_value!(bool, |v| Value::Integer(v as i64));
impl_as_value!(i8, |v| Value::Integer(v as i64));
impl_as_value!(i16, |v| Value::Integer(v as i64));
impl_as_value!(i32, |v| Value::Integer(v as i64));
impl_as_value!(i64, |v| Value::Integer(v));
impl_as_value!(u8, |v| Value::Integer(v as i64));
impl_as_value!(u16, |v| Value::Integer(v as i64));
impl_as_value!(u32, |v| Value::Integer(v as i64));
impl_as_value!(f32, |v| Value::Float(v as f64));
impl_as_value!(f64, |v| Value::Float(v));
impl_as_value!(&str, |v| Value::Text(v.to_owned()));
impl_as_value!(String, |v| Value::Text(v));
impl_as_value!(&[u8], |v| Value::Blob(v.into()));
impl_as_value!(Vec<u8>, |v| Value::Blob(v.into_boxed_slice()));
impl_as_value!(Box<[u8]>, |v| Value::Blob(v));
impl_as_value!(Date, |v| Value::Text(v.to_string()));
impl_as_value!(Time, |v| Value::Text(v.to_string()));
impl_as_value!(PrimitiveDateTime, |v| Value::Text(v.to_string()));
impl_as_value!(OffsetDateTime, |v| Value::Text(v.to_string()));
impl_as_value!(Uuid, |v| Value::Text(v.to_string()));
impl_as_value!(Url, |v| Value::Text(String::from(v)));

impl AsValue for u64 {
    fn as_value(self) -> Result<Value> {
        i64::try_from(self).map(Value::Integer).map_err(|_| {
            UnsupportedValueType::new(format!(
                "u64 value `{}` is out of the INTEGER range",
                self
            ))
        })
    }
}

impl AsValue for i128 {
    fn as_value(self) -> Result<Value> {
        i64::try_from(self).map(Value::Integer).map_err(|_| {
            UnsupportedValueType::new(format!(
                "i128 value `{}` is out of the INTEGER range",
                self
            ))
        })
    }
}

impl AsValue for u128 {
    fn as_value(self) -> Result<Value> {
        i64::try_from(self).map(Value::Integer).map_err(|_| {
            UnsupportedValueType::new(format!(
                "u128 value `{}` is out of the INTEGER range",
                self
            ))
        })
    }
}

impl AsValue for Decimal {
    fn as_value(self) -> Result<Value> {
        self.to_f64().map(Value::Float).ok_or_else(|| {
            UnsupportedValueType::new(format!("Cannot convert the Decimal value `{}` to f64", self))
        })
    }
}

/// Time spans are stored as whole nanoseconds.
impl AsValue for std::time::Duration {
    fn as_value(self) -> Result<Value> {
        i64::try_from(self.as_nanos())
            .map(Value::Integer)
            .map_err(|_| {
                UnsupportedValueType::new(format!(
                    "Duration of {} seconds does not fit the INTEGER range as nanoseconds",
                    self.as_secs()
                ))
            })
    }
}

impl AsValue for time::Duration {
    fn as_value(self) -> Result<Value> {
        i64::try_from(self.whole_nanoseconds())
            .map(Value::Integer)
            .map_err(|_| {
                UnsupportedValueType::new(format!(
                    "Duration of {} seconds does not fit the INTEGER range as nanoseconds",
                    self.whole_seconds()
                ))
            })
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Result<Value> {
        match self {
            Some(v) => v.as_value(),
            None => Ok(Value::Null),
        }
    }
}
