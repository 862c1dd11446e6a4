use crate::error_handling::{CalcError, Result};
use crate::values::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Looks up a named constant. Units are expressed in bytes and seconds.
pub fn constant(name: &str) -> Option<Number> {
    use crate::values::Number::*;
    match name {
        "pi" => Some(real(std::f64::consts::PI)),
        "e" => Some(real(std::f64::consts::E)),
        "kb" => Some(integer(1 << 10)),
        "mb" => Some(integer(1 << 20)),
        "gb" => Some(integer(1 << 30)),
        "tb" => Some(integer(1 << 40)),
        "seconds" => Some(integer(1)),
        "minutes" => Some(integer(60)),
        "hours" => Some(integer(3_600)),
        "days" => Some(integer(86_400)),
        "weeks" => Some(integer(604_800)),
        "years" => Some(integer(31_536_000)),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    sqrt, abs, round, floor, ceil, min, max, sum, len, pow,
    factorial, gcd, lcm, log2, avg, median,
    sin, cos, tan,
    log, ln,
    bin, hex, oct,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    exactly(usize),
    between(usize, usize),
    at_least(usize),
}

impl Arity {
    fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::exactly(expected) => count == expected,
            Arity::between(low, high) => (low..=high).contains(&count),
            Arity::at_least(low) => count >= low,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |count: usize| if count == 1 { "argument" } else { "arguments" };
        match *self {
            Arity::exactly(count) => write!(f, "exactly {count} {}", plural(count)),
            Arity::between(low, high) => write!(f, "from {low} to {high} arguments"),
            Arity::at_least(count) => write!(f, "at least {count} {}", plural(count)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownFunction;

impl FromStr for Builtin {
    type Err = UnknownFunction;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use Builtin::*;
        match s {
            "sqrt" => Ok(sqrt),
            "abs" => Ok(abs),
            "round" => Ok(round),
            "floor" => Ok(floor),
            "ceil" => Ok(ceil),
            "min" => Ok(min),
            "max" => Ok(max),
            "sum" => Ok(sum),
            "len" => Ok(len),
            "pow" => Ok(pow),
            "factorial" => Ok(factorial),
            "gcd" => Ok(gcd),
            "lcm" => Ok(lcm),
            "log2" => Ok(log2),
            "avg" => Ok(avg),
            "median" => Ok(median),
            "sin" => Ok(sin),
            "cos" => Ok(cos),
            "tan" => Ok(tan),
            "log" => Ok(log),
            "ln" => Ok(ln),
            "bin" => Ok(bin),
            "hex" => Ok(hex),
            "oct" => Ok(oct),
            _ => Err(UnknownFunction),
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The variant names are the user-facing names.
        fmt::Debug::fmt(self, f)
    }
}

fn domain_checked(value: f64, valid: bool) -> Result<Number> {
    if valid {
        Number::checked_real(value)
    } else {
        Err(CalcError::math_domain())
    }
}

fn gcd_of(left: i64, right: i64) -> u128 {
    let (mut a, mut b) = (u128::from(left.unsigned_abs()), u128::from(right.unsigned_abs()));
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn in_base(value: i64, radix: u32) -> String {
    let magnitude = value.unsigned_abs();
    let digits = match radix {
        2 => format!("{magnitude:b}"),
        8 => format!("{magnitude:o}"),
        _ => format!("{magnitude:x}"),
    };
    if value < 0 {
        format!("-{digits}")
    } else {
        digits
    }
}

impl Builtin {
    pub fn arity(&self) -> Arity {
        use Builtin::*;
        match self {
            min | max => Arity::at_least(1),
            sum | avg | median => Arity::at_least(0),
            round => Arity::between(1, 2),
            pow => Arity::between(2, 3),
            gcd | lcm => Arity::exactly(2),
            _ => Arity::exactly(1),
        }
    }

    /// Invokes the function on already evaluated arguments.
    pub fn call(&self, arguments: &[Value]) -> Result<Value> {
        if !self.arity().accepts(arguments.len()) {
            return Err(CalcError::type_mismatch(format!(
                "{self}() takes {} ({} given)",
                self.arity(),
                arguments.len()
            )));
        }
        if let (Builtin::len, [argument]) = (self, arguments) {
            return match argument {
                Value::digits(digits) => Ok(Number::integer(digits.chars().count() as i64).into()),
                Value::number(_) => Err(CalcError::type_mismatch("object of type 'number' has no len()".into())),
            };
        }

        let numbers = arguments
            .iter()
            .map(|argument| {
                argument.as_number().ok_or_else(|| {
                    CalcError::type_mismatch(format!("bad operand type for {self}(): '{}'", argument.type_name()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match self {
            Builtin::bin => Ok(Value::digits(in_base(self.integral(numbers[0])?, 2))),
            Builtin::oct => Ok(Value::digits(in_base(self.integral(numbers[0])?, 8))),
            Builtin::hex => Ok(Value::digits(in_base(self.integral(numbers[0])?, 16))),
            _ => self.call_numeric(&numbers).map(Value::from),
        }
    }

    fn integral(&self, number: Number) -> Result<i64> {
        number
            .as_integer()
            .ok_or_else(|| CalcError::invalid_value(format!("{self}() requires integer arguments")))
    }

    fn call_numeric(&self, numbers: &[Number]) -> Result<Number> {
        use Builtin::*;
        use Number::*;

        let first = numbers.first().copied().unwrap_or(integer(0));
        let x = first.as_f64();
        match self {
            sqrt => domain_checked(x.sqrt(), x >= 0.0),
            log2 => domain_checked(x.log2(), x > 0.0),
            log => domain_checked(x.log10(), x > 0.0),
            ln => domain_checked(x.ln(), x > 0.0),
            sin => Number::checked_real(x.sin()),
            cos => Number::checked_real(x.cos()),
            tan => Number::checked_real(x.tan()),
            abs => match first {
                integer(value) => Ok(value.checked_abs().map_or(real(-(value as f64)), integer)),
                real(value) => Ok(real(value.abs())),
            },
            floor => match first {
                integer(_) => Ok(first),
                real(value) => Number::from_integral(value.floor()),
            },
            ceil => match first {
                integer(_) => Ok(first),
                real(value) => Number::from_integral(value.ceil()),
            },
            round => self.round(first, numbers.get(1).copied()),
            min => Ok(numbers.iter().copied().reduce(|best, n| if n.total_cmp(&best).is_lt() { n } else { best }).unwrap_or(first)),
            max => Ok(numbers.iter().copied().reduce(|best, n| if n.total_cmp(&best).is_gt() { n } else { best }).unwrap_or(first)),
            sum => numbers.iter().try_fold(integer(0), |total, n| total.add(*n)),
            avg => {
                if numbers.is_empty() {
                    return Ok(integer(0));
                }
                let total = numbers.iter().try_fold(integer(0), |total, n| total.add(*n))?;
                total.divide(integer(numbers.len() as i64))
            },
            median => {
                if numbers.is_empty() {
                    return Ok(integer(0));
                }
                let mut sorted = numbers.to_vec();
                sorted.sort_by(Number::total_cmp);
                let middle = sorted.len() / 2;
                if sorted.len() % 2 == 1 {
                    Ok(sorted[middle])
                } else {
                    sorted[middle - 1].add(sorted[middle])?.divide(integer(2))
                }
            },
            pow => match numbers {
                [base, exponent] => base.power(*exponent),
                [base, exponent, modulus] => self.modular_power(*base, *exponent, *modulus),
                _ => Err(CalcError::type_mismatch(format!("{self}() takes {}", self.arity()))),
            },
            factorial => self.factorial(first),
            gcd => {
                let (left, right) = (self.integral(numbers[0])?, self.integral(numbers[1])?);
                Ok(Number::from_unsigned(gcd_of(left, right)))
            },
            lcm => {
                let (left, right) = (self.integral(numbers[0])?, self.integral(numbers[1])?);
                if left == 0 || right == 0 {
                    return Ok(integer(0));
                }
                let product = u128::from(left.unsigned_abs()) * u128::from(right.unsigned_abs());
                Ok(Number::from_unsigned(product / gcd_of(left, right)))
            },
            len | bin | hex | oct => Err(CalcError::type_mismatch(format!("{self}() is not numeric"))),
        }
    }

    fn round(&self, number: Number, places: Option<Number>) -> Result<Number> {
        let places = match places {
            None => {
                return match number {
                    Number::integer(_) => Ok(number),
                    Number::real(value) => Number::from_integral(value.round_ties_even()),
                }
            },
            Some(places) => places
                .as_integer()
                .ok_or_else(|| CalcError::invalid_value("round() places must be an integer".into()))?,
        };
        match number {
            Number::integer(_) if places >= 0 => Ok(number),
            Number::integer(value) => {
                let scale = 10f64.powf(-(places.max(-400) as f64));
                if scale.is_infinite() {
                    return Ok(Number::integer(0));
                }
                Number::from_integral((value as f64 / scale).round_ties_even() * scale)
            },
            Number::real(_) if places > 300 => Ok(number),
            Number::real(value) => {
                let scale = 10f64.powi(places.max(-400) as i32);
                if scale == 0.0 {
                    return Ok(Number::real(0.0));
                }
                let scaled = value * scale;
                // too few digits to drop anything
                if !scaled.is_finite() {
                    return Ok(number);
                }
                Number::checked_real(scaled.round_ties_even() / scale)
            },
        }
    }

    fn modular_power(&self, base: Number, exponent: Number, modulus: Number) -> Result<Number> {
        let (base, exponent, modulus) = (self.integral(base)?, self.integral(exponent)?, self.integral(modulus)?);
        if modulus == 0 {
            return Err(CalcError::invalid_value("pow() 3rd argument cannot be 0".into()));
        }
        if exponent < 0 {
            return Err(CalcError::invalid_value("pow() 2nd argument cannot be negative when 3rd argument specified".into()));
        }
        let size = i128::from(modulus).abs();
        let mut result: i128 = 1 % size;
        let mut square = i128::from(base).rem_euclid(size);
        let mut remaining = exponent;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result * square % size;
            }
            square = square * square % size;
            remaining >>= 1;
        }
        if modulus < 0 && result != 0 {
            result -= size;
        }
        // |result| < |modulus|, so it always fits back into an i64
        Ok(Number::integer(result as i64))
    }

    fn factorial(&self, number: Number) -> Result<Number> {
        let n = match number.as_integer() {
            Some(n) => n,
            None => return Err(CalcError::invalid_value("factorial() only accepts integral values".into())),
        };
        if n < 0 {
            return Err(CalcError::invalid_value("factorial() not defined for negative values".into()));
        }
        let mut exact: i64 = 1;
        let mut i = 2;
        while i <= n {
            match exact.checked_mul(i) {
                Some(product) => exact = product,
                None => break,
            }
            i += 1;
        }
        if i > n {
            return Ok(Number::integer(exact));
        }
        let mut approximate = exact as f64;
        while i <= n {
            approximate *= i as f64;
            if approximate.is_infinite() {
                return Err(CalcError::overflow);
            }
            i += 1;
        }
        Ok(Number::real(approximate))
    }
}
