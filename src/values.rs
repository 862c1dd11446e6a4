use crate::error_handling::{CalcError, Result};
use std::cmp::Ordering;
use std::fmt;

/// A numeric value. Integer arithmetic stays exact until it would overflow
/// 64 bits, at which point it continues as a real.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    integer(i64),
    real(f64),
}

/// 2^63, the first real that no longer fits an `i64`.
const INTEGER_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl Number {
    /// Parses a literal as produced by the scanner: decimal integers and
    /// reals, `_` separators, and `0x`/`0b`/`0o` prefixed integers. A decimal
    /// literal too large for a real comes back infinite; see [`Number::checked`].
    pub fn from_literal(content: &str) -> Option<Number> {
        let prefix = content.get(..2).map(str::to_ascii_lowercase);
        let (radix, digits) = match prefix.as_deref() {
            Some("0x") => (16, &content[2..]),
            Some("0b") => (2, &content[2..]),
            Some("0o") => (8, &content[2..]),
            _ => (10, content),
        };
        if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
            return None;
        }
        let cleaned: String = digits.chars().filter(|c| *c != '_').collect();

        if radix != 10 {
            return i64::from_str_radix(&cleaned, radix).ok().map(Number::integer);
        }
        if cleaned.contains(|c| matches!(c, '.' | 'e' | 'E')) {
            return cleaned.parse::<f64>().ok().map(Number::real);
        }
        match cleaned.parse::<i64>() {
            Ok(value) => Some(Number::integer(value)),
            Err(_) => cleaned.parse::<f64>().ok().map(Number::real),
        }
    }

    /// Wraps a real result, refusing values the calculator cannot show.
    pub fn checked_real(value: f64) -> Result<Number> {
        if value.is_nan() {
            Err(CalcError::math_domain())
        } else if value.is_infinite() {
            Err(CalcError::overflow)
        } else {
            Ok(Number::real(value))
        }
    }

    pub fn checked(self) -> Result<Number> {
        match self {
            Number::real(value) => Number::checked_real(value),
            Number::integer(_) => Ok(self),
        }
    }

    /// Converts an already-integral real, preferring the integer form.
    pub fn from_integral(value: f64) -> Result<Number> {
        if !value.is_finite() {
            return Err(CalcError::overflow);
        }
        if (-INTEGER_LIMIT..INTEGER_LIMIT).contains(&value) {
            Ok(Number::integer(value as i64))
        } else {
            Ok(Number::real(value))
        }
    }

    pub fn from_unsigned(value: u128) -> Number {
        match i64::try_from(value) {
            Ok(value) => Number::integer(value),
            Err(_) => Number::real(value as f64),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::integer(value) => value as f64,
            Number::real(value) => value,
        }
    }

    /// The value as an `i64` when it has no fractional part.
    pub fn as_integer(self) -> Option<i64> {
        match self {
            Number::integer(value) => Some(value),
            Number::real(value) if value.fract() == 0.0 && (-INTEGER_LIMIT..INTEGER_LIMIT).contains(&value) => {
                Some(value as i64)
            },
            Number::real(_) => None,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    fn combine(
        self,
        other: Number,
        integer: fn(i64, i64) -> Option<i64>,
        real: fn(f64, f64) -> f64,
    ) -> Result<Number> {
        if let (Number::integer(left), Number::integer(right)) = (self, other) {
            if let Some(value) = integer(left, right) {
                return Ok(Number::integer(value));
            }
        }
        Number::checked_real(real(self.as_f64(), other.as_f64()))
    }

    pub fn add(self, other: Number) -> Result<Number> {
        self.combine(other, i64::checked_add, |left, right| left + right)
    }

    pub fn subtract(self, other: Number) -> Result<Number> {
        self.combine(other, i64::checked_sub, |left, right| left - right)
    }

    pub fn multiply(self, other: Number) -> Result<Number> {
        self.combine(other, i64::checked_mul, |left, right| left * right)
    }

    /// True division; always real.
    pub fn divide(self, other: Number) -> Result<Number> {
        if other.is_zero() {
            return Err(CalcError::division_by_zero);
        }
        Number::checked_real(self.as_f64() / other.as_f64())
    }

    /// Division rounded towards negative infinity.
    pub fn floor_divide(self, other: Number) -> Result<Number> {
        if other.is_zero() {
            return Err(CalcError::division_by_zero);
        }
        self.combine(
            other,
            |left, right| {
                let quotient = left.checked_div(right)?;
                if left % right != 0 && (left < 0) != (right < 0) {
                    Some(quotient - 1)
                } else {
                    Some(quotient)
                }
            },
            |left, right| (left / right).floor(),
        )
    }

    /// Remainder taking the sign of the divisor.
    pub fn modulo(self, other: Number) -> Result<Number> {
        if other.is_zero() {
            return Err(CalcError::division_by_zero);
        }
        self.combine(
            other,
            |left, right| {
                let remainder = left.checked_rem(right)?;
                if remainder != 0 && (remainder < 0) != (right < 0) {
                    Some(remainder + right)
                } else {
                    Some(remainder)
                }
            },
            |left, right| {
                let remainder = left % right;
                if remainder != 0.0 && (remainder < 0.0) != (right < 0.0) {
                    remainder + right
                } else {
                    remainder
                }
            },
        )
    }

    pub fn power(self, exponent: Number) -> Result<Number> {
        if let (Number::integer(base), Number::integer(power)) = (self, exponent) {
            if let Some(value) = u32::try_from(power).ok().and_then(|power| base.checked_pow(power)) {
                return Ok(Number::integer(value));
            }
        }
        let (base, power) = (self.as_f64(), exponent.as_f64());
        if base == 0.0 && power < 0.0 {
            return Err(CalcError::division_by_zero);
        }
        if base < 0.0 && power.fract() != 0.0 {
            return Err(CalcError::invalid_value("complex results are not supported".into()));
        }
        Number::checked_real(base.powf(power))
    }

    pub fn negate(self) -> Result<Number> {
        match self {
            Number::integer(value) => match value.checked_neg() {
                Some(value) => Ok(Number::integer(value)),
                None => Number::checked_real(-(value as f64)),
            },
            Number::real(value) => Ok(Number::real(-value)),
        }
    }

    pub fn total_cmp(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::integer(left), Number::integer(right)) => left.cmp(right),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::integer(value) => write!(f, "{value}"),
            // `+ 0.0` folds negative zero into zero
            Number::real(value) if value.fract() == 0.0 => write!(f, "{:.0}", value + 0.0),
            Number::real(value) if value.abs() < 1e-4 => write!(f, "{value:e}"),
            Number::real(value) => write!(f, "{value}"),
        }
    }
}

/// Anything an expression can produce or a variable can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    number(Number),
    /// Output of `bin`, `hex` and `oct`.
    digits(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::number(_) => "number",
            Value::digits(_) => "digits",
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::number(number) => Some(*number),
            Value::digits(_) => None,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        Value::number(number)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::number(number) => number.fmt(f),
            Value::digits(digits) => f.write_str(digits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Number::*;
    use super::*;

    #[test]
    fn parses_literals() {
        assert_eq!(Number::from_literal("42"), Some(integer(42)));
        assert_eq!(Number::from_literal("1_000"), Some(integer(1000)));
        assert_eq!(Number::from_literal("2.5"), Some(real(2.5)));
        assert_eq!(Number::from_literal(".5"), Some(real(0.5)));
        assert_eq!(Number::from_literal("5."), Some(real(5.0)));
        assert_eq!(Number::from_literal("1e3"), Some(real(1000.0)));
        assert_eq!(Number::from_literal("0xff"), Some(integer(255)));
        assert_eq!(Number::from_literal("0B101"), Some(integer(5)));
        assert_eq!(Number::from_literal("0o17"), Some(integer(15)));
        assert_eq!(Number::from_literal("99999999999999999999"), Some(real(1e20)));
    }

    #[test]
    fn oversized_literals_are_out_of_range() {
        let huge = Number::from_literal("1e400");
        assert_eq!(huge, Some(real(f64::INFINITY)));
        assert_eq!(huge.map(Number::checked), Some(Err(CalcError::overflow)));
        assert_eq!(integer(7).checked(), Ok(integer(7)));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(Number::from_literal("1.2.3"), None);
        assert_eq!(Number::from_literal("1__0"), None);
        assert_eq!(Number::from_literal("1_"), None);
        assert_eq!(Number::from_literal("0x"), None);
        assert_eq!(Number::from_literal("0b12"), None);
    }

    #[test]
    fn renders_integral_values_without_fraction() {
        assert_eq!(integer(5).to_string(), "5");
        assert_eq!(real(5.0).to_string(), "5");
        assert_eq!(real(-0.0).to_string(), "0");
        assert_eq!(real(5368709120.0).to_string(), "5368709120");
        assert_eq!(real(2f64.powi(64)).to_string(), "18446744073709551616");
    }

    #[test]
    fn renders_fractional_values() {
        assert_eq!(real(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(real(10.0 / 3.0).to_string(), "3.3333333333333335");
        assert_eq!(real(-2.5).to_string(), "-2.5");
        assert_eq!(real(0.00015).to_string(), "0.00015");
        assert_eq!(real(1.5e-7).to_string(), "1.5e-7");
    }

    #[test]
    fn integer_arithmetic_overflows_into_reals() {
        assert_eq!(integer(i64::MAX).add(integer(1)), Ok(real(i64::MAX as f64 + 1.0)));
        assert_eq!(integer(3).multiply(integer(4)), Ok(integer(12)));
        assert_eq!(integer(2).power(integer(10)), Ok(integer(1024)));
        assert_eq!(integer(2).power(integer(-1)), Ok(real(0.5)));
        assert_eq!(integer(i64::MIN).negate(), Ok(real(9_223_372_036_854_775_808.0)));
    }

    #[test]
    fn division_family_follows_floored_semantics() {
        assert_eq!(integer(10).divide(integer(2)), Ok(real(5.0)));
        assert_eq!(integer(7).floor_divide(integer(2)), Ok(integer(3)));
        assert_eq!(integer(-7).floor_divide(integer(2)), Ok(integer(-4)));
        assert_eq!(integer(-7).modulo(integer(3)), Ok(integer(2)));
        assert_eq!(integer(7).modulo(integer(-3)), Ok(integer(-2)));
        assert_eq!(real(-7.5).modulo(integer(2)), Ok(real(0.5)));
        assert_eq!(real(7.5).floor_divide(integer(2)), Ok(real(3.0)));
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(integer(5).divide(integer(0)), Err(CalcError::division_by_zero));
        assert_eq!(integer(5).floor_divide(real(0.0)), Err(CalcError::division_by_zero));
        assert_eq!(integer(5).modulo(integer(0)), Err(CalcError::division_by_zero));
        assert_eq!(integer(0).power(integer(-1)), Err(CalcError::division_by_zero));
    }

    #[test]
    fn power_domain_and_range() {
        assert!(matches!(integer(-8).power(real(1.0 / 3.0)), Err(CalcError::invalid_value(_))));
        assert_eq!(integer(10).power(integer(400)), Err(CalcError::overflow));
        assert_eq!(integer(-2).power(real(2.0)), Ok(real(4.0)));
    }

    #[test]
    fn integral_views() {
        assert_eq!(real(4.0).as_integer(), Some(4));
        assert_eq!(real(4.5).as_integer(), None);
        assert_eq!(real(1e30).as_integer(), None);
        assert_eq!(Number::from_integral(1e30), Ok(real(1e30)));
        assert_eq!(Number::from_integral(-3.0), Ok(integer(-3)));
    }
}
