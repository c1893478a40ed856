use thiserror::Error;

/// Every way evaluation can fail. All are fatal to a program run, but they
/// are ordinary values so embedders and tests can inspect them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("Variable {name} not found")]
    VariableNotFound { name: String },
    #[error("Function {name} not found")]
    FunctionNotFound { name: String },
    #[error("Wrong number of arguments for function {name}: expected {expected}, got {found}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Return statement outside of a function")]
    ReturnOutsideFunction,
    #[error("Variable {name} is not an array")]
    NotAnArray { name: String },
    #[error("Value {value} not found in array {array}")]
    ValueNotFound { value: String, array: String },
    #[error("Variable {name}{path} not found")]
    IndexNotFound { name: String, path: String },
    #[error("Unsupported operand types for {operator}: {left} and {right}")]
    UnsupportedOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("Cannot apply {operation} to a value of type {type_name}")]
    InvalidOperand {
        operation: String,
        type_name: String,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow in '{operator}'")]
    Overflow { operator: String },
    #[error("Function {name} did not return a value")]
    MissingReturnValue { name: String },
    #[error("Stack depth exceeded (limit is {limit})")]
    StackDepthExceeded { limit: usize },
    #[error("Dynamic evaluation is disabled")]
    EvalDisabled,
    #[error("Invalid expression passed to eval: {message}")]
    InvalidDynamicExpression { message: String },
    #[error("Failed to write output: {message}")]
    Output { message: String },
    /// Raised by `exit;` to unwind every active call. `Evaluator::run`
    /// reports it as `Outcome::Exited`, so it never escapes a run.
    #[error("Program exited")]
    Exit,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
