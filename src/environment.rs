use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// One lexical scope frame: a mutable name→value map plus an optional
/// reference to the enclosing frame.  Frames are shared (`Rc`) because
/// closures keep their defining scope alive past block exit.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Chain-walking lookup; used for names the resolver left unresolved
    /// (globals) and as the general dynamic path.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(name.lexeme.as_str()) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined_variable(name))
        }
    }

    /// Chain-walking assignment to an existing binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if self.values.contains_key(name.lexeme.as_str()) {
            self.values.insert(name.lexeme.clone(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined_variable(name))
        }
    }

    /// Read a binding exactly `distance` frames up the chain.  Never falls
    /// through to outer frames: the resolver already proved where the
    /// binding lives.
    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Result<Value> {
        let frame: Rc<RefCell<Environment>> = match Self::ancestor(env, distance) {
            Some(frame) => frame,
            None => return Err(undefined_variable(name)),
        };

        let value: Option<Value> = frame.borrow().values.get(name.lexeme.as_str()).cloned();

        value.ok_or_else(|| undefined_variable(name))
    }

    /// Write a binding exactly `distance` frames up the chain.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<()> {
        match Self::ancestor(env, distance) {
            Some(frame) => {
                frame
                    .borrow_mut()
                    .values
                    .insert(name.lexeme.clone(), value);
                Ok(())
            }

            None => Err(undefined_variable(name)),
        }
    }

    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut frame: Rc<RefCell<Environment>> = env.clone();

        for _ in 0..distance {
            let parent: Option<Rc<RefCell<Environment>>> = frame.borrow().enclosing.clone();
            frame = parent?;
        }

        Some(frame)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined_variable(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name.to_string(), 1)
    }

    #[test]
    fn define_then_get() {
        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().define("a", Value::Number(1.0));

        assert_eq!(env.borrow().get(&ident("a")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn get_walks_enclosing_chain() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("a", Value::Number(1.0));

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(global)));

        assert_eq!(inner.borrow().get(&ident("a")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_at_then_get_at_round_trips() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().define("a", Value::Nil);

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(outer)));

        Environment::assign_at(&inner, 1, &ident("a"), Value::String("x".to_string())).unwrap();

        assert_eq!(
            Environment::get_at(&inner, 1, &ident("a")).unwrap(),
            Value::String("x".to_string())
        );
    }

    #[test]
    fn get_at_does_not_search_outward() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().define("a", Value::Number(1.0));

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(outer)));

        // Depth 0 names the inner frame, which has no `a`.
        assert!(Environment::get_at(&inner, 0, &ident("a")).is_err());
    }

    #[test]
    fn undefined_variable_reports_name() {
        let env = Environment::new();
        let err = env.get(&ident("ghost")).unwrap_err();

        assert!(err.to_string().contains("Undefined variable 'ghost'."));
    }
}
