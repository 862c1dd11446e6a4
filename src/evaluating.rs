use crate::builtins::{constant, Builtin};
use crate::error_handling::{CalcError, Result};
use crate::parsing::*;
use crate::values::Value;
use std::collections::HashMap;

pub type Variables = HashMap<String, Value>;

/// Walks an expression tree. Only the session variables, the constant
/// table and the builtin functions are reachable from here.
pub fn evaluate(expression: &ExprNode, variables: &Variables) -> Result<Value> {
    match expression {
        ExprNode::literal(number) => Ok(Value::number(number.checked()?)),

        ExprNode::identifier(name) => resolve(name, variables),

        ExprNode::unary{operator, operand} => {
            let value = evaluate(operand, variables)?;
            match value {
                Value::number(number) => Ok(operator.call(number)?.into()),
                Value::digits(_) => Err(CalcError::type_mismatch(format!(
                    "bad operand type for unary {operator}: '{}'",
                    value.type_name()
                ))),
            }
        },

        ExprNode::binary{operator, left, right} => {
            let left = evaluate(left, variables)?;
            let right = evaluate(right, variables)?;
            match (&left, &right) {
                (Value::number(left), Value::number(right)) => Ok(operator.call(*left, *right)?.into()),
                _ => Err(CalcError::type_mismatch(format!(
                    "unsupported operand type(s) for {operator}: '{}' and '{}'",
                    left.type_name(),
                    right.type_name()
                ))),
            }
        },

        ExprNode::call{name, arguments} => {
            let function = resolve_function(name, variables)?;
            let arguments = arguments
                .iter()
                .map(|argument| evaluate(argument, variables))
                .collect::<Result<Vec<_>>>()?;
            function.call(&arguments)
        },
    }
}

/// Variables shadow constants; functions are not values.
fn resolve(name: &str, variables: &Variables) -> Result<Value> {
    if let Some(value) = variables.get(name) {
        return Ok(value.clone());
    }
    if let Some(number) = constant(name) {
        return Ok(number.into());
    }
    if name.parse::<Builtin>().is_ok() {
        return Err(CalcError::type_mismatch(format!("function '{name}' cannot be used as a value")));
    }
    Err(CalcError::undefined(name.into()))
}

fn resolve_function(name: &str, variables: &Variables) -> Result<Builtin> {
    if variables.contains_key(name) || constant(name).is_some() {
        return Err(CalcError::type_mismatch(format!("'{name}' is not callable")));
    }
    name.parse().map_err(|_| CalcError::undefined(name.into()))
}
