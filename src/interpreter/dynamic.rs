use crate::interpreter::evaluator::{Evaluator, RuntimeError, RuntimeResult};
use crate::interpreter::parser::Parser;
use crate::interpreter::value::Value;

/// What `eval(...)` does with its string operand. Installed on the
/// [`Evaluator`], so embedders can sandbox, stub or switch it off.
pub trait DynamicEvaluator {
    fn evaluate(&self, code: &str, evaluator: &mut Evaluator) -> RuntimeResult<Value>;
}

/// Parses the string as a single expression of the language itself and
/// evaluates it in the caller's scope. Statements are rejected, so eval
/// cannot define functions or assign variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpressionEvaluator;

impl DynamicEvaluator for ExpressionEvaluator {
    fn evaluate(&self, code: &str, evaluator: &mut Evaluator) -> RuntimeResult<Value> {
        let expr = Parser::parse_expression_source(code)
            .map_err(|err| RuntimeError::InvalidDynamicExpression { message: err.to_string() })?;

        evaluator.evaluate_nested(&expr)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledEvaluator;

impl DynamicEvaluator for DisabledEvaluator {
    fn evaluate(&self, _code: &str, _evaluator: &mut Evaluator) -> RuntimeResult<Value> {
        Err(RuntimeError::EvalDisabled)
    }
}
