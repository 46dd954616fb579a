#[cfg(test)]
mod resolver_tests {
    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::Scanner;

    fn resolve(source: &str) -> Vec<String> {
        let mut parser = Parser::new(Scanner::new(source.as_bytes()));
        let program = parser.parse();

        assert!(
            !parser.had_error(),
            "parse diagnostics: {:?}",
            parser.diagnostics()
        );

        let mut interpreter: Interpreter<Vec<u8>> = Interpreter::new(Vec::new());

        Resolver::new(&mut interpreter)
            .resolve(&program)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn clean_program_has_no_diagnostics() {
        let errors = resolve(
            "var a = 1; { var b = a; fun f(x) { return x + b; } f(2); } \
             class A { init(x) { this.x = x; } get() { return this.x; } }",
        );

        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn reading_local_in_its_own_initializer() {
        let errors = resolve("{ var a = a; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't read local variable in its own initializer."));
    }

    #[test]
    fn global_may_refer_to_itself() {
        // Only *local* scopes are guarded; globals stay dynamic.
        let errors = resolve("var a = 1; var b = b;");

        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn duplicate_local_in_same_scope() {
        let errors = resolve("{ var a = 1; var a = 2; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Already a variable with this name in this scope."));
    }

    #[test]
    fn duplicate_redeclaration_still_guards_its_own_initializer() {
        // The redeclared slot goes back to declared-but-undefined, so the
        // self-referencing initializer raises as well.
        let errors = resolve("{ var a = 1; var a = a; }");

        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Already a variable with this name in this scope."));
        assert!(errors[1].contains("Can't read local variable in its own initializer."));
    }

    #[test]
    fn shadowing_across_scopes_is_fine() {
        let errors = resolve("var a = 1; { var a = 2; { var a = 3; } }");

        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn return_outside_function() {
        let errors = resolve("return 1;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't return from top-level code."));
        assert!(errors[0].contains("at 'return'"));
    }

    #[test]
    fn this_outside_class() {
        let errors = resolve("print this;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't use 'this' outside of a class."));
    }

    #[test]
    fn this_in_plain_function_outside_class() {
        let errors = resolve("fun f() { return this; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't use 'this' outside of a class."));
    }

    #[test]
    fn returning_a_value_from_an_initializer() {
        let errors = resolve("class A { init() { return 1; } }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't return a value from an initializer."));
    }

    #[test]
    fn bare_return_in_initializer_is_allowed() {
        let errors = resolve("class A { init() { return; } }");

        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn return_in_method_is_allowed() {
        let errors = resolve("class A { f() { return 1; } }");

        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn all_diagnostics_collected_in_one_pass() {
        let errors = resolve("return 1; { var a = 1; var a = 2; } print this;");

        assert_eq!(errors.len(), 3);
    }
}
