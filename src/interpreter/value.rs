use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use crate::interpreter::ast::BinaryOperator;
use crate::interpreter::evaluator::{RuntimeError, RuntimeResult};

#[cfg(test)]
mod tests;

/// Arrays are shared: cloning a value that holds an array clones the handle,
/// so every name bound to it observes mutations.
pub type Array = Rc<RefCell<Vec<Value>>>;

/// Longest string (in bytes) or array (in elements) that `*` may build.
pub const MAX_REPEAT_LEN: usize = 1 << 24;

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Array(Array),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_float(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(value) => Value::Int(value),
            Number::Float(value) => Value::Float(value),
        }
    }
}

impl Value {
    pub fn new_array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Bool(value) => *value,
            Value::Str(value) => !value.is_empty(),
            Value::Array(array) => !array.borrow().is_empty(),
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(value) => Some(Number::Int(*value)),
            Value::Float(value) => Some(Number::Float(*value)),
            Value::Bool(value) => Some(Number::Int(*value as i64)),
            _ => None,
        }
    }

    /// Integer view used for indexing and repetition counts.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Bool(value) => Some(*value as i64),
            _ => None,
        }
    }

    /// Identity used by `id(...)`: arrays are identified by their allocation,
    /// everything else by content.
    pub fn identity(&self) -> i64 {
        match self {
            Value::Array(array) => Rc::as_ptr(array) as usize as i64,
            Value::Int(value) => *value,
            _ => {
                let mut hasher = DefaultHasher::new();
                self.type_name().hash(&mut hasher);
                self.to_string().hash(&mut hasher);
                hasher.finish() as i64
            },
        }
    }

    /// Applies a binary operator to two evaluated operands. `&&` and `||` do
    /// not short-circuit; they pick one of the operands by truthiness.
    pub fn binary(operator: BinaryOperator, left: Value, right: Value) -> RuntimeResult<Value> {
        match operator {
            BinaryOperator::And => Ok(if left.is_truthy() { right } else { left }),
            BinaryOperator::Or => Ok(if left.is_truthy() { left } else { right }),
            BinaryOperator::Equal => Ok(Value::Bool(left == right)),
            BinaryOperator::NotEqual => Ok(Value::Bool(left != right)),
            BinaryOperator::Greater => Ok(Value::Bool(left.compare(&right, operator)? == Ordering::Greater)),
            BinaryOperator::Less => Ok(Value::Bool(left.compare(&right, operator)? == Ordering::Less)),
            BinaryOperator::GreaterEqual => Ok(Value::Bool(left.compare(&right, operator)? != Ordering::Less)),
            BinaryOperator::LessEqual => Ok(Value::Bool(left.compare(&right, operator)? != Ordering::Greater)),
            BinaryOperator::Add => left.add(right),
            BinaryOperator::Subtract => Self::arithmetic(operator, &left, &right, i64::checked_sub, |a, b| a - b),
            BinaryOperator::Multiply => left.multiply(right),
            BinaryOperator::Divide => left.divide(&right),
        }
    }

    fn add(self, right: Value) -> RuntimeResult<Value> {
        match (self, right) {
            (Value::Str(left), Value::Str(right)) => Ok(Value::Str(left + &right)),
            (Value::Array(left), Value::Array(right)) => {
                let mut elements = left.borrow().clone();
                elements.extend(right.borrow().iter().cloned());
                Ok(Value::new_array(elements))
            },
            (left, right) => Self::arithmetic(BinaryOperator::Add, &left, &right, i64::checked_add, |a, b| a + b),
        }
    }

    fn multiply(self, right: Value) -> RuntimeResult<Value> {
        match (&self, &right) {
            (Value::Str(text), count) | (count, Value::Str(text)) if count.as_integer().is_some() => {
                let count = Self::repeat_count(count, text.len())?;
                Ok(Value::Str(text.repeat(count)))
            },
            (Value::Array(array), count) | (count, Value::Array(array)) if count.as_integer().is_some() => {
                let elements = array.borrow();
                let count = Self::repeat_count(count, elements.len())?;
                let repeated = (0..count).flat_map(|_| elements.iter().cloned()).collect();
                Ok(Value::new_array(repeated))
            },
            _ => Self::arithmetic(BinaryOperator::Multiply, &self, &right, i64::checked_mul, |a, b| a * b),
        }
    }

    /// Number of copies for `len * count`, zero for an empty operand or a
    /// count below one. Results longer than [`MAX_REPEAT_LEN`] overflow.
    fn repeat_count(count: &Value, len: usize) -> RuntimeResult<usize> {
        let count = count.as_integer().unwrap_or(0);

        if len == 0 || count <= 0 {
            return Ok(0);
        }

        usize::try_from(count).ok()
            .filter(|count| count.checked_mul(len).map_or(false, |total| total <= MAX_REPEAT_LEN))
            .ok_or_else(|| RuntimeError::Overflow { operator: String::from(BinaryOperator::Multiply.symbol()) })
    }

    /// Real division, even for two integers.
    fn divide(&self, right: &Value) -> RuntimeResult<Value> {
        let (left_number, right_number) = Self::numbers(BinaryOperator::Divide, self, right)?;
        let divisor = right_number.as_float();

        if divisor == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }

        Ok(Value::Float(left_number.as_float() / divisor))
    }

    fn arithmetic(operator: BinaryOperator, left: &Value, right: &Value,
                  int_op: fn(i64, i64) -> Option<i64>, float_op: fn(f64, f64) -> f64) -> RuntimeResult<Value> {
        let result = match Self::numbers(operator, left, right)? {
            (Number::Int(left), Number::Int(right)) => Number::Int(int_op(left, right)
                .ok_or_else(|| RuntimeError::Overflow { operator: operator.symbol().to_owned() })?),
            (left, right) => Number::Float(float_op(left.as_float(), right.as_float())),
        };

        Ok(result.into_value())
    }

    fn numbers(operator: BinaryOperator, left: &Value, right: &Value) -> RuntimeResult<(Number, Number)> {
        match (left.as_number(), right.as_number()) {
            (Some(left), Some(right)) => Ok((left, right)),
            _ => Err(Self::unsupported(operator, left, right)),
        }
    }

    fn compare(&self, other: &Value, operator: BinaryOperator) -> RuntimeResult<Ordering> {
        self.partial_compare(other).ok_or_else(|| Self::unsupported(operator, self, other))
    }

    fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(left), Value::Str(right)) => Some(left.cmp(right)),
            (Value::Array(left), Value::Array(right)) => {
                if Rc::ptr_eq(left, right) {
                    return Some(Ordering::Equal);
                }

                let left = left.borrow();
                let right = right.borrow();

                for (left, right) in left.iter().zip(right.iter()) {
                    match left.partial_compare(right)? {
                        Ordering::Equal => continue,
                        ordering => return Some(ordering),
                    }
                }

                Some(left.len().cmp(&right.len()))
            },
            (left, right) => match (left.as_number()?, right.as_number()?) {
                (Number::Int(left), Number::Int(right)) => Some(left.cmp(&right)),
                (left, right) => left.as_float().partial_cmp(&right.as_float()),
            },
        }
    }

    fn unsupported(operator: BinaryOperator, left: &Value, right: &Value) -> RuntimeError {
        RuntimeError::UnsupportedOperands {
            operator: operator.symbol().to_owned(),
            left: left.type_name().to_owned(),
            right: right.type_name().to_owned(),
        }
    }

    fn fmt_nested(&self, f: &mut Formatter<'_>, quoted: bool, parents: &mut Vec<*const RefCell<Vec<Value>>>) -> std::fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => {
                if value.is_nan() {
                    f.write_str("nan")
                } else if value.is_infinite() {
                    f.write_str(if *value > 0.0 { "inf" } else { "-inf" })
                } else if value.fract() == 0.0 && value.abs() < 1e16 {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            },
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(value) if quoted => write!(f, "'{}'", value),
            Value::Str(value) => f.write_str(value),
            Value::Array(array) => {
                let pointer = Rc::as_ptr(array);

                if parents.contains(&pointer) {
                    return f.write_str("[...]");
                }

                parents.push(pointer);
                f.write_str("[")?;

                for (i, element) in array.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }

                    element.fmt_nested(f, true, parents)?;
                }

                parents.pop();
                f.write_str("]")
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(left), Value::Str(right)) => left == right,
            (Value::Array(left), Value::Array(right)) => {
                Rc::ptr_eq(left, right) || *left.borrow() == *right.borrow()
            },
            (left, right) => match (left.as_number(), right.as_number()) {
                (Some(Number::Int(left)), Some(Number::Int(right))) => left == right,
                (Some(left), Some(right)) => left.as_float() == right.as_float(),
                _ => false,
            },
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_nested(f, false, &mut Vec::new())
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_nested(f, true, &mut Vec::new())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Str(value.to_owned())
    }
}
