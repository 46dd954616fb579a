#[cfg(test)]
mod parser_tests {
    use rox::ast_printer::AstPrinter;
    use rox::expr::Expr;
    use rox::parser::Parser;
    use rox::scanner::Scanner;
    use rox::stmt::Stmt;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<String>) {
        let mut parser = Parser::new(Scanner::new(source.as_bytes()));
        let program: Vec<Stmt> = parser.parse();

        let diagnostics: Vec<String> = parser
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect();

        (program, diagnostics)
    }

    fn parse_expr(source: &str) -> Expr {
        let (mut program, diagnostics) = parse(source);

        assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);
        assert_eq!(program.len(), 1);

        match program.remove(0) {
            Stmt::Expression(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn printed(source: &str) -> String {
        AstPrinter::print(&parse_expr(source))
    }

    #[test]
    fn factor_binds_tighter_than_term() {
        assert_eq!(printed("1 + 2 * 3;"), "(+ 1 (* 2 3))");
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(printed("(1 + 2) * 3;"), "(* (group (+ 1 2)) 3)");
    }

    #[test]
    fn unary_is_right_associative() {
        assert_eq!(printed("!!true;"), "(! (! true))");
        assert_eq!(printed("--1;"), "(- (- 1))");
    }

    #[test]
    fn comparison_and_equality_chain_left() {
        assert_eq!(printed("1 < 2 == 3 >= 4;"), "(== (< 1 2) (>= 3 4))");
    }

    #[test]
    fn logic_or_binds_looser_than_and() {
        assert_eq!(printed("a or b and c;"), "(or a (and b c))");
    }

    #[test]
    fn calls_and_property_access_chain() {
        assert_eq!(printed("a.b(1).c;"), "(. (call (. a b) 1) c)");
    }

    #[test]
    fn assignment_rewrites_variable_to_assign() {
        assert_eq!(printed("a = 1;"), "(= a 1)");
    }

    #[test]
    fn assignment_rewrites_get_to_set() {
        assert_eq!(printed("a.b = 2;"), "(= (. a b) 2)");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(printed("a = b = 3;"), "(= a (= b 3))");
    }

    #[test]
    fn invalid_assignment_target_reports_without_unwinding() {
        let (program, diagnostics) = parse("1 = 2; print 3;");

        // The bad statement still parses (as its left-hand side) and the
        // statement after it is reached.
        assert_eq!(program.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Invalid assignment target."));
        assert!(diagnostics[0].contains("at '='"));
    }

    #[test]
    fn synchronize_recovers_at_statement_boundary() {
        let (program, diagnostics) = parse("var = 1; print 2; var 3;");

        assert_eq!(program.len(), 1);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].contains("Expect variable name."));
    }

    #[test]
    fn error_at_eof_reports_at_end() {
        let (_, diagnostics) = parse("print 1");

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("at end"));
        assert!(diagnostics[0].contains("Expect ';' after value."));
    }

    #[test]
    fn for_desugars_to_block_and_while() {
        let (mut program, diagnostics) = parse("for (var i = 0; i < 2; i = i + 1) print i;");

        assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);

        let outer = match program.remove(0) {
            Stmt::Block(stmts) => stmts,
            other => panic!("expected outer block, got {:?}", other),
        };

        assert_eq!(outer.len(), 2);
        assert!(matches!(outer[0], Stmt::Var { .. }));

        match &outer[1] {
            Stmt::While { body, .. } => {
                // The while body carries the loop body plus the increment.
                match body.as_ref() {
                    Stmt::Block(inner) => {
                        assert_eq!(inner.len(), 2);
                        assert!(matches!(inner[0], Stmt::Print(_)));
                        assert!(matches!(inner[1], Stmt::Expression(_)));
                    }
                    other => panic!("expected desugared body block, got {:?}", other),
                }
            }
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn empty_for_clauses_default_to_infinite_while() {
        let (mut program, diagnostics) = parse("for (;;) print 1;");

        assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);

        // No initializer: no outer block wrapper.
        match program.remove(0) {
            Stmt::While { condition, body } => {
                assert_eq!(AstPrinter::print(&condition), "true");
                assert!(matches!(*body, Stmt::Print(_)));
            }
            other => panic!("expected bare while, got {:?}", other),
        }
    }

    #[test]
    fn max_arguments_accepted_at_255() {
        let args: Vec<String> = (0..255).map(|i| i.to_string()).collect();
        let source: String = format!("f({});", args.join(", "));

        let (program, diagnostics) = parse(&source);

        assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn argument_256_reports_but_parsing_continues() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source: String = format!("f({}); print 1;", args.join(", "));

        let (program, diagnostics) = parse(&source);

        assert_eq!(program.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Can't have more than 255 arguments."));
    }

    #[test]
    fn parameter_256_reports_but_parsing_continues() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source: String = format!("fun f({}) {{}}", params.join(", "));

        let (program, diagnostics) = parse(&source);

        assert_eq!(program.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Can't have more than 255 parameters."));
    }

    #[test]
    fn class_with_methods_parses() {
        let (program, diagnostics) = parse("class A { init(x) { this.x = x; } get() { return this.x; } }");

        assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);

        match &program[0] {
            Stmt::Class { name, methods } => {
                assert_eq!(name.lexeme, "A");
                assert_eq!(methods.len(), 2);
                assert_eq!(methods[0].name.lexeme, "init");
                assert_eq!(methods[1].name.lexeme, "get");
            }
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn lexical_errors_surface_in_parser_diagnostics() {
        let (program, diagnostics) = parse("print 1; $");

        assert_eq!(program.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Unexpected character: $"));
    }

    #[test]
    fn super_is_reserved_but_not_an_expression() {
        let (_, diagnostics) = parse("print super;");

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("Expect expression."));
        assert!(diagnostics[0].contains("at 'super'"));
    }
}
