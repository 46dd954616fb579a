use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId};
use crate::function::LoxFunction;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.  `Return` unwinds through blocks and loops to
/// the nearest enclosing function call frame; it never escapes the
/// interpreter.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Tree-walking evaluator.  Program output (`print`) goes to the injected
/// writer so callers can capture it.
pub struct Interpreter<W: Write> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock_native,
            },
        );

        Interpreter {
            globals: globals.clone(),
            environment: globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Record the lexical depth of a variable occurrence.  Called by the
    /// resolver; the side-table is frozen before `interpret` runs.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for statement in statements {
            // The resolver rejects top-level `return`, so `Flow::Return`
            // cannot surface here.
            self.execute(statement)?;
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                writeln!(self.out, "{}", value)?;

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(self.environment.clone());

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body)? {
                        Flow::Normal => {}

                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                let function = LoxFunction::new(
                    declaration.clone(),
                    self.environment.clone(),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Flow::Return(value))
            }

            Stmt::Class { name, methods } => {
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                let mut table: HashMap<String, Rc<LoxFunction>> = HashMap::new();

                for method in methods {
                    let is_initializer: bool = method.name.lexeme == "init";

                    let function =
                        LoxFunction::new(method.clone(), self.environment.clone(), is_initializer);

                    table.insert(method.name.lexeme.clone(), Rc::new(function));
                }

                let class = Value::Class(Rc::new(LoxClass::new(name.lexeme.clone(), table)));

                self.environment.borrow_mut().assign(name, class)?;

                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` in `environment`, restoring the previous scope on
    /// every exit path.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Environment,
    ) -> Result<Flow> {
        let previous: Rc<RefCell<Environment>> = self.environment.clone();

        self.environment = Rc::new(RefCell::new(environment));

        let mut flow: Result<Flow> = Ok(Flow::Normal);

        for statement in statements {
            match self.execute(statement) {
                Ok(Flow::Normal) => {}

                other => {
                    flow = other;
                    break;
                }
            }
        }

        self.environment = previous;

        flow
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(token) => evaluate_literal(token),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right)?;

                evaluate_unary(operator, right)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;

                evaluate_binary(left, operator, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                match operator.token_type {
                    TokenType::OR if is_truthy(&left) => Ok(left),

                    TokenType::AND if !is_truthy(&left) => Ok(left),

                    _ => self.evaluate(right),
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(name, *id),

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(
                            &self.environment,
                            distance,
                            name,
                            value.clone(),
                        )?;
                    }

                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, args, paren)
            }

            Expr::Get { object, name } => {
                let object: Value = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => LoxInstance::get(&instance, name),

                    _ => Err(LoxError::runtime(name, "Only instances have properties.")),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object: Value = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        let value: Value = self.evaluate(value)?;

                        instance.borrow_mut().set(name, value.clone());

                        Ok(value)
                    }

                    _ => Err(LoxError::runtime(name, "Only instances have fields.")),
                }
            }
        }
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>, paren: &Token) -> Result<Value> {
        match callee {
            Value::NativeFunction { arity, func, .. } => {
                check_arity(arity, args.len(), paren)?;

                func(&args).map_err(|message| LoxError::runtime(paren, message))
            }

            Value::Function(function) => {
                check_arity(function.arity(), args.len(), paren)?;

                function.call(self, args)
            }

            Value::Class(class) => {
                check_arity(class.arity(), args.len(), paren)?;

                LoxClass::instantiate(&class, self, args)
            }

            _ => Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),

            None => self.globals.borrow().get(name),
        }
    }
}

fn evaluate_literal(token: &Token) -> Result<Value> {
    match &token.token_type {
        TokenType::NUMBER(n) => Ok(Value::Number(*n)),

        TokenType::STRING(s) => Ok(Value::String(s.clone())),

        TokenType::TRUE => Ok(Value::Bool(true)),

        TokenType::FALSE => Ok(Value::Bool(false)),

        TokenType::NIL => Ok(Value::Nil),

        _ => Err(LoxError::runtime(token, "Invalid literal.")),
    }
}

fn evaluate_unary(operator: &Token, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::MINUS => match right {
            Value::Number(n) => Ok(Value::Number(-n)),

            _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
        },

        TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),

        _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
    }
}

fn evaluate_binary(left: Value, operator: &Token, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

            _ => Err(LoxError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },

        TokenType::MINUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        },

        TokenType::STAR => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        },

        // Division by zero follows IEEE-754: infinity or NaN, no check.
        TokenType::SLASH => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        },

        TokenType::GREATER => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        },

        TokenType::GREATER_EQUAL => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        },

        TokenType::LESS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        },

        TokenType::LESS_EQUAL => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        },

        TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

        TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        ))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn clock_native(_args: &[Value]) -> std::result::Result<Value, String> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
