use super::*;

fn binary(operator: BinaryOperator, left: Value, right: Value) -> RuntimeResult<Value> {
    Value::binary(operator, left, right)
}

#[test]
pub fn test_division_is_real() {
    assert_eq!(binary(BinaryOperator::Divide, Value::Int(7), Value::Int(2)).unwrap(), Value::Float(3.5));
    assert_eq!(binary(BinaryOperator::Divide, Value::Int(8), Value::Int(2)).unwrap().to_string(), "4.0");
    assert_eq!(binary(BinaryOperator::Divide, Value::Int(1), Value::Int(0)).unwrap_err(), RuntimeError::DivisionByZero);
}

#[test]
pub fn test_integer_overflow_is_an_error() {
    assert!(matches!(binary(BinaryOperator::Add, Value::Int(i64::MAX), Value::Int(1)), Err(RuntimeError::Overflow { .. })));
}

#[test]
pub fn test_repetition_is_bounded() {
    let overflow = RuntimeError::Overflow { operator: String::from("*") };

    assert_eq!(binary(BinaryOperator::Multiply, Value::from("ab"), Value::Int(i64::MAX)).unwrap_err(), overflow);
    assert_eq!(binary(BinaryOperator::Multiply, Value::Int(i64::MAX), Value::new_array(vec![Value::Int(1)])).unwrap_err(), overflow);
    assert_eq!(binary(BinaryOperator::Multiply, Value::new_array(vec![]), Value::Int(i64::MAX)).unwrap().to_string(), "[]");
    assert_eq!(binary(BinaryOperator::Multiply, Value::from(""), Value::Int(i64::MAX)).unwrap(), Value::from(""));
    assert_eq!(binary(BinaryOperator::Multiply, Value::from("ab"), Value::Int(-2)).unwrap(), Value::from(""));
    assert_eq!(binary(BinaryOperator::Multiply, Value::new_array(vec![Value::Int(1)]), Value::Int(2)).unwrap().to_string(), "[1, 1]");
}

#[test]
pub fn test_mixed_arithmetic() {
    assert_eq!(binary(BinaryOperator::Add, Value::Int(1), Value::Float(0.5)).unwrap(), Value::Float(1.5));
    assert_eq!(binary(BinaryOperator::Add, Value::Bool(true), Value::Int(1)).unwrap(), Value::Int(2));
    assert_eq!(binary(BinaryOperator::Add, Value::from("ab"), Value::from("cd")).unwrap(), Value::from("abcd"));
    assert_eq!(binary(BinaryOperator::Multiply, Value::from("ab"), Value::Int(3)).unwrap(), Value::from("ababab"));
    assert!(matches!(binary(BinaryOperator::Subtract, Value::from("a"), Value::Int(1)),
        Err(RuntimeError::UnsupportedOperands { .. })));
}

#[test]
pub fn test_logical_operators_return_operands() {
    assert_eq!(binary(BinaryOperator::And, Value::Int(0), Value::Int(5)).unwrap(), Value::Int(0));
    assert_eq!(binary(BinaryOperator::And, Value::Int(3), Value::Int(5)).unwrap(), Value::Int(5));
    assert_eq!(binary(BinaryOperator::Or, Value::from(""), Value::Int(5)).unwrap(), Value::Int(5));
}

#[test]
pub fn test_comparisons() {
    assert_eq!(binary(BinaryOperator::Less, Value::Int(1), Value::Float(1.5)).unwrap(), Value::Bool(true));
    assert_eq!(binary(BinaryOperator::GreaterEqual, Value::from("b"), Value::from("a")).unwrap(), Value::Bool(true));
    assert_eq!(binary(BinaryOperator::Equal, Value::Int(1), Value::from("1")).unwrap(), Value::Bool(false));
    assert!(binary(BinaryOperator::Less, Value::Int(1), Value::from("1")).is_err());
}

#[test]
pub fn test_array_concatenation_copies() {
    let left = Value::new_array(vec![Value::Int(1)]);
    let joined = binary(BinaryOperator::Add, left.clone(), Value::new_array(vec![Value::Int(2)])).unwrap();

    assert_eq!(joined.to_string(), "[1, 2]");
    assert_eq!(left.to_string(), "[1]");
    assert_ne!(joined.identity(), left.identity());
}

#[test]
pub fn test_display() {
    let nested = Value::new_array(vec![Value::Int(1), Value::from("a"), Value::new_array(vec![]), Value::Bool(false)]);

    assert_eq!(nested.to_string(), "[1, 'a', [], False]");
    assert_eq!(Value::from("a").to_string(), "a");
    assert_eq!(Value::Float(0.25).to_string(), "0.25");
}

#[test]
pub fn test_self_referencing_array_display() {
    let array = Value::new_array(vec![Value::Int(1)]);

    if let Value::Array(handle) = &array {
        handle.borrow_mut().push(array.clone());
    }

    assert_eq!(array.to_string(), "[1, [...]]");
}

#[test]
pub fn test_truthiness() {
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::new_array(vec![]).is_truthy());
    assert!(Value::from("x").is_truthy());
}
