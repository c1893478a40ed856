use std::io::Write;
use std::rc::Rc;
use crate::println_verbose;
use crate::interpreter::ast::{Arguments, Block, Call, Chain, CompoundOperator, Expr, IncrementOperator, LiteralValue, Stmt, BinaryOperator};
use crate::interpreter::ast::chain::optional_len;
use crate::interpreter::dynamic::{DynamicEvaluator, ExpressionEvaluator};
use crate::interpreter::environment::{Environment, FunctionTable};
use crate::interpreter::value::{Array, Value};

mod error;

pub use error::{RuntimeError, RuntimeResult};

/// Fits the nesting of typical recursive programs on a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Exited,
}

/// Per-call execution state. `returned` stops every further statement of
/// the current function body once a `return` has run.
#[derive(Clone, Copy, Debug, Default)]
struct Frame {
    in_function: bool,
    returned: bool,
}

pub struct Evaluator {
    environment: Environment,
    globals: Environment,
    functions: FunctionTable,

    output: Box<dyn Write>,
    dynamic: Rc<dyn DynamicEvaluator>,

    depth: usize,
    max_depth: usize,
    verbose: bool,
}

impl Evaluator {
    pub fn new(output: Box<dyn Write>) -> Evaluator {
        Evaluator {
            environment: Environment::new(),
            globals: Environment::new(),
            functions: FunctionTable::new(),

            output,
            dynamic: Rc::new(ExpressionEvaluator),

            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            verbose: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Evaluator {
        self.max_depth = max_depth;
        self
    }

    pub fn with_dynamic_evaluator(mut self, dynamic: Rc<dyn DynamicEvaluator>) -> Evaluator {
        self.dynamic = dynamic;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Evaluator {
        self.verbose = verbose;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Executes a whole program. State persists across calls, so several
    /// programs run on one evaluator share variables and functions.
    pub fn run(&mut self, program: &Block) -> RuntimeResult<Outcome> {
        let mut frame = Frame::default();

        let outcome = match self.execute_block(program, &mut frame) {
            Ok(_) => Outcome::Completed,
            Err(RuntimeError::Exit) => Outcome::Exited,
            Err(error) => return Err(error),
        };

        self.output.flush().map_err(|err| RuntimeError::Output { message: err.to_string() })?;
        Ok(outcome)
    }

    /// Evaluates an expression one level deeper, for re-entrant evaluation.
    pub fn evaluate_nested(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        self.enter()?;
        let result = self.evaluate(expr);
        self.depth -= 1;

        result
    }

    // Statements

    fn execute_block(&mut self, block: &Block, frame: &mut Frame) -> RuntimeResult<Option<Value>> {
        let mut result = None;

        for stmt in block {
            if let Some(value) = self.execute(stmt, frame)? {
                result = Some(value);
            }
        }

        Ok(result)
    }

    /// Executes one statement. `Some` carries a value up to the enclosing
    /// function call: the operand of `return`, or the result of a bare call.
    fn execute(&mut self, stmt: &Stmt, frame: &mut Frame) -> RuntimeResult<Option<Value>> {
        if frame.in_function && frame.returned {
            return Ok(None);
        }

        match stmt {
            Stmt::Exit => {
                self.write_line("Bye")?;
                return Err(RuntimeError::Exit);
            },
            Stmt::Print(arguments) => {
                let values = self.evaluate_arguments(Some(arguments))?;
                let line = values.iter().map(Value::to_string).collect::<Vec<String>>().join(" ");

                self.write_line(&line)?;
            },
            Stmt::If { condition, then, otherwise } => {
                return self.with_checkpoint(|this| {
                    if this.evaluate(condition)?.is_truthy() {
                        this.execute_block(then, frame)
                    } else if let Some(otherwise) = otherwise {
                        this.execute_block(otherwise, frame)
                    } else {
                        Ok(None)
                    }
                });
            },
            Stmt::While { condition, body } => {
                return self.with_checkpoint(|this| {
                    while this.evaluate(condition)?.is_truthy() {
                        if let Some(value) = this.execute_block(body, frame)? {
                            return Ok(Some(value));
                        }
                    }

                    Ok(None)
                });
            },
            Stmt::For { init, condition, step, body } => {
                return self.with_checkpoint(|this| {
                    this.execute(init, frame)?;

                    // A value from the body does not end the loop; the last one
                    // seen is propagated once the condition fails.
                    let mut result = None;

                    while this.evaluate(condition)?.is_truthy() {
                        if let Some(value) = this.execute_block(body, frame)? {
                            result = Some(value);
                        }

                        let mut step_frame = Frame { in_function: frame.in_function, returned: false };
                        this.execute(step, &mut step_frame)?;
                    }

                    Ok(result)
                });
            },
            Stmt::FunctionDef(function) => {
                println_verbose!(self.verbose, "Defining function {}", function.name);
                self.functions.define(Rc::clone(function));
            },
            Stmt::Return(expr) => {
                if !frame.in_function {
                    return Err(RuntimeError::ReturnOutsideFunction);
                }

                let value = self.evaluate(expr)?;
                frame.returned = true;

                return Ok(Some(value));
            },
            Stmt::Call(call) => return self.call(call),

            Stmt::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.set(name.clone(), value);
            },
            Stmt::MultiAssign { names, values } => {
                // Extra names or values are ignored, no arity check.
                let values = self.evaluate_arguments(Some(values))?;

                for (name, value) in names.iter().zip(values) {
                    self.environment.set(name.clone(), value);
                }
            },
            Stmt::GlobalDeclare { name, value } => {
                let value = self.evaluate(value)?;
                println_verbose!(self.verbose, "Declaring global {} = {:?}", name, value);
                self.globals.set(name.clone(), value);
            },
            Stmt::GlobalPromote { name } => {
                let value = self.environment.get(name).cloned()
                    .ok_or_else(|| RuntimeError::VariableNotFound { name: name.clone() })?;

                println_verbose!(self.verbose, "Promoting {} = {:?} to global", name, value);
                self.globals.set(name.clone(), value);
            },
            Stmt::ArrayIndexAssign { name, indices, value } => self.assign_index(name, indices, value)?,
            Stmt::ArrayAppend { target, value } => {
                let (array, _) = self.resolve_array_target(target)?;
                let value = self.evaluate(value)?;

                array.borrow_mut().push(value);
            },
            Stmt::ArrayRemove { target, value } => {
                let (array, label) = self.resolve_array_target(target)?;
                let value = self.evaluate(value)?;

                let position = array.borrow().iter().position(|element| *element == value);

                match position {
                    Some(position) => {
                        array.borrow_mut().remove(position);
                    },
                    None => return Err(RuntimeError::ValueNotFound { value: value.to_string(), array: label }),
                }
            },
            Stmt::Increment { name, operator } => {
                let current = self.local(name)?;
                let delta = match operator {
                    IncrementOperator::Increment => 1,
                    IncrementOperator::Decrement => -1,
                };

                let updated = match current {
                    Value::Int(_) | Value::Float(_) | Value::Bool(_) => Value::binary(BinaryOperator::Add, current, Value::Int(delta))?,
                    other => return Err(RuntimeError::InvalidOperand {
                        operation: String::from(if delta > 0 { "++" } else { "--" }),
                        type_name: other.type_name().to_owned(),
                    }),
                };

                self.environment.set(name.clone(), updated);
            },
            Stmt::CompoundAssign { name, operator, value } => {
                let current = self.local(name)?;
                let value = self.evaluate(value)?;

                let updated = match (operator, &current, &value) {
                    // `+=` on an array extends it in place, keeping it shared
                    (CompoundOperator::Add, Value::Array(array), Value::Array(extra)) => {
                        let extra = extra.borrow().clone();
                        array.borrow_mut().extend(extra);
                        current
                    },
                    _ => Value::binary(operator.binary_operator(), current, value)?,
                };

                self.environment.set(name.clone(), updated);
            },

            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            },
        }

        Ok(None)
    }

    /// Runs `body` and then rolls the local environment back to its state
    /// before, whether or not `body` succeeded.
    fn with_checkpoint<T>(&mut self, body: impl FnOnce(&mut Evaluator) -> RuntimeResult<T>) -> RuntimeResult<T> {
        let checkpoint = self.environment.checkpoint();
        let result = body(self);
        self.environment.restore(checkpoint);

        result
    }

    fn call(&mut self, call: &Call) -> RuntimeResult<Option<Value>> {
        let function = self.functions.get(&call.name)
            .ok_or_else(|| RuntimeError::FunctionNotFound { name: call.name.clone() })?;

        let expected = optional_len(function.parameters.as_ref());
        let found = optional_len(call.arguments.as_ref());

        if expected != found {
            return Err(RuntimeError::WrongArgumentCount { name: call.name.clone(), expected, found });
        }

        let arguments = self.evaluate_arguments(call.arguments.as_ref())?;
        let mut callee = Environment::new();

        if let Some(parameters) = &function.parameters {
            for (name, value) in parameters.iter().zip(arguments) {
                callee.set(name.clone(), value);
            }
        }

        self.enter()?;
        println_verbose!(self.verbose, "Calling {} with {} argument(s) at depth {}", call.name, found, self.depth);

        let caller = std::mem::replace(&mut self.environment, callee);
        let mut frame = Frame { in_function: true, returned: false };
        let result = self.execute_block(&function.body, &mut frame);

        self.environment = caller;
        self.depth -= 1;

        if let Ok(value) = &result {
            println_verbose!(self.verbose, "Returning from {} with {:?}", call.name, value);
        }

        result
    }

    fn enter(&mut self) -> RuntimeResult<()> {
        if self.depth >= self.max_depth {
            return Err(RuntimeError::StackDepthExceeded { limit: self.max_depth });
        }

        self.depth += 1;
        Ok(())
    }

    fn assign_index(&mut self, name: &str, indices: &Chain<Expr>, value: &Expr) -> RuntimeResult<()> {
        let indices = self.evaluate_chain(indices)?;
        let value = self.evaluate(value)?;

        let not_found = || RuntimeError::IndexNotFound { name: name.to_owned(), path: render_path(&indices) };

        let mut array = match self.lookup(name) {
            Some(Value::Array(array)) => Rc::clone(array),
            Some(_) => return Err(RuntimeError::NotAnArray { name: name.to_owned() }),
            None => return Err(RuntimeError::VariableNotFound { name: name.to_owned() }),
        };

        let (last, walk) = match indices.split_last() {
            Some(split) => split,
            None => return Err(not_found()),
        };

        for index in walk {
            array = match element_at(&Value::Array(array), index) {
                Some(Value::Array(inner)) => inner,
                _ => return Err(not_found()),
            };
        }

        let mut elements = array.borrow_mut();
        let position = last.as_integer()
            .and_then(|position| normalize_index(position, elements.len()))
            .ok_or_else(not_found)?;

        elements[position] = value;
        Ok(())
    }

    /// Resolves the first operand of `append`/`remove`: an array value is used
    /// directly, a string names a local or global variable holding one.
    fn resolve_array_target(&mut self, target: &Expr) -> RuntimeResult<(Array, String)> {
        let label = target.to_string();

        match self.evaluate(target)? {
            Value::Array(array) => Ok((array, label)),
            Value::Str(name) => match self.lookup(&name) {
                Some(Value::Array(array)) => Ok((Rc::clone(array), name)),
                Some(_) => Err(RuntimeError::NotAnArray { name }),
                None => Err(RuntimeError::VariableNotFound { name }),
            },
            _ => Err(RuntimeError::NotAnArray { name: label }),
        }
    }

    // Expressions

    fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Literal(LiteralValue::Int(value)) => Ok(Value::Int(*value)),
            Expr::Literal(LiteralValue::Str(value)) => Ok(Value::Str(value.clone())),
            Expr::Identifier(name) => self.resolve_identifier(name),
            Expr::Binary { operator, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                Value::binary(*operator, left, right)
            },
            Expr::Call(call) => self.call(call)?
                .ok_or_else(|| RuntimeError::MissingReturnValue { name: call.name.clone() }),
            Expr::Index { name, indices } => {
                let indices = self.evaluate_chain(indices)?;
                let mut current = self.lookup(name).cloned()
                    .ok_or_else(|| RuntimeError::VariableNotFound { name: name.clone() })?;

                for index in &indices {
                    current = element_at(&current, index)
                        .ok_or_else(|| RuntimeError::IndexNotFound { name: name.clone(), path: render_path(&indices) })?;
                }

                Ok(current)
            },
            Expr::ArrayLiteral(elements) => Ok(Value::new_array(self.evaluate_arguments(elements.as_ref())?)),
            Expr::DynamicEval(operand) => {
                let code = match self.evaluate(operand)? {
                    Value::Str(code) => code,
                    other => return Err(RuntimeError::InvalidOperand {
                        operation: String::from("eval"),
                        type_name: other.type_name().to_owned(),
                    }),
                };

                println_verbose!(self.verbose, "Evaluating {:?}", code);

                let dynamic = Rc::clone(&self.dynamic);
                dynamic.evaluate(&code, self)
            },
            Expr::Identity(operand) => Ok(Value::Int(self.evaluate(operand)?.identity())),
        }
    }

    /// Local environment, then globals, then a quoted name stands for the
    /// string between its quotes.
    fn resolve_identifier(&self, name: &str) -> RuntimeResult<Value> {
        if let Some(value) = self.lookup(name) {
            return Ok(value.clone());
        }

        // Only reachable for names built outside the lexer, which already
        // turns quoted source text into string literals.
        match unquote(name) {
            Some(text) => Ok(Value::Str(text.to_owned())),
            None => Err(RuntimeError::VariableNotFound { name: name.to_owned() }),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.environment.get(name).or_else(|| self.globals.get(name))
    }

    fn local(&self, name: &str) -> RuntimeResult<Value> {
        self.environment.get(name).cloned()
            .ok_or_else(|| RuntimeError::VariableNotFound { name: name.to_owned() })
    }

    fn evaluate_arguments(&mut self, arguments: Option<&Arguments>) -> RuntimeResult<Vec<Value>> {
        match arguments {
            Some(arguments) => self.evaluate_chain(arguments),
            None => Ok(Vec::new()),
        }
    }

    fn evaluate_chain(&mut self, exprs: &Chain<Expr>) -> RuntimeResult<Vec<Value>> {
        let mut values = Vec::new();

        for expr in exprs {
            values.push(self.evaluate(expr)?);
        }

        Ok(values)
    }

    fn write_line(&mut self, line: &str) -> RuntimeResult<()> {
        writeln!(self.output, "{}", line).map_err(|err| RuntimeError::Output { message: err.to_string() })
    }
}

fn unquote(name: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        if name.len() >= 2 && name.starts_with(quote) && name.ends_with(quote) {
            Some(&name[1..name.len() - 1])
        } else {
            None
        }
    })
}

fn normalize_index(position: i64, len: usize) -> Option<usize> {
    let position = if position < 0 { position + len as i64 } else { position };

    if position >= 0 && (position as usize) < len {
        Some(position as usize)
    } else {
        None
    }
}

fn element_at(container: &Value, index: &Value) -> Option<Value> {
    let position = index.as_integer()?;

    match container {
        Value::Array(array) => {
            let elements = array.borrow();
            normalize_index(position, elements.len()).map(|position| elements[position].clone())
        },
        Value::Str(text) => {
            let position = normalize_index(position, text.chars().count())?;
            text.chars().nth(position).map(|c| Value::Str(c.to_string()))
        },
        _ => None,
    }
}

fn render_path(indices: &[Value]) -> String {
    indices.iter().map(|index| format!("[{}]", index)).collect()
}
