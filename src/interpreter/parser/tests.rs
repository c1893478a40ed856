use super::*;

fn parse(source: &str) -> ParseResult<Block> {
    Parser::new(Lexer::new(source)).parse()
}

fn parse_statements(source: &str) -> Vec<Stmt> {
    parse(source).unwrap().iter().cloned().collect()
}

fn expression(source: &str) -> String {
    Parser::parse_expression_source(source).unwrap().to_string()
}

mod expressions {
    use super::*;

    #[test]
    pub fn test_multiplicative_operators_group_right() {
        assert_eq!(expression("8 / 4 / 2"), "(8 / (4 / 2))");
        assert_eq!(expression("2 * 3 / 4"), "(2 * (3 / 4))");
    }

    #[test]
    pub fn test_additive_level_groups_left() {
        assert_eq!(expression("1 - 2 + 3"), "((1 - 2) + 3)");
        assert_eq!(expression("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(expression("i < n + 1"), "((i < n) + 1)");
    }

    #[test]
    pub fn test_equality_level_binds_loosest() {
        assert_eq!(expression("a + 1 == b * 2"), "((a + 1) == (b * 2))");
        assert_eq!(expression("a == 1 && b != 2"), "(((a == 1) && b) != 2)");
    }

    #[test]
    pub fn test_primaries() {
        assert_eq!(expression("f(1, x)"), "f(1, x)");
        assert_eq!(expression("g()"), "g()");
        assert_eq!(expression("a[1][i + 1]"), "a[1][(i + 1)]");
        assert_eq!(expression("[1, 'two', []]"), "[1, \"two\", []]");
        assert_eq!(expression("eval(\"1 + 2\")"), "eval(\"1 + 2\")");
        assert_eq!(expression("id(a)"), "id(a)");
        assert_eq!(expression("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    pub fn test_expressions_nest_inside_chains() {
        assert_eq!(expression("f(a[g(1, [h()])][2], eval(b[0]))"), "f(a[g(1, [h()])][2], eval(b[0]))");
        assert_eq!(parse_statements("if 1 then while 0 do a = 1; endwhile; endif;").len(), 1);
    }

    #[test]
    pub fn test_trailing_tokens_are_rejected() {
        assert!(matches!(Parser::parse_expression_source("1 2"), Err(SyntaxError::UnexpectedToken { .. })));
    }
}

mod statements {
    use super::*;

    #[test]
    pub fn test_block_is_chained_in_order() {
        let block = parse("a = 1; b = 2; c = 3;").unwrap();

        assert_eq!(block.len(), 3);
        assert_eq!(*block.head, Stmt::Assign { name: String::from("a"), value: Expr::Literal(LiteralValue::Int(1)) });
        assert_eq!(*block.last(), Stmt::Assign { name: String::from("c"), value: Expr::Literal(LiteralValue::Int(3)) });
    }

    #[test]
    pub fn test_assignment_forms() {
        let statements = parse_statements("x++; y--; z += 2; w /= 3; a, b = 1, 2; arr[0] = 5; global g = 1; global x;");

        assert!(matches!(&statements[0], Stmt::Increment { operator: IncrementOperator::Increment, .. }));
        assert!(matches!(&statements[1], Stmt::Increment { operator: IncrementOperator::Decrement, .. }));
        assert!(matches!(&statements[2], Stmt::CompoundAssign { operator: CompoundOperator::Add, .. }));
        assert!(matches!(&statements[3], Stmt::CompoundAssign { operator: CompoundOperator::Divide, .. }));

        match &statements[4] {
            Stmt::MultiAssign { names, values } => {
                assert_eq!(names.iter().cloned().collect::<Vec<String>>(), vec!["a", "b"]);
                assert_eq!(values.len(), 2);
            },
            other => panic!("Expected multi-assignment, got {:?}", other),
        }

        assert!(matches!(&statements[5], Stmt::ArrayIndexAssign { name, .. } if name == "arr"));
        assert!(matches!(&statements[6], Stmt::GlobalDeclare { name, .. } if name == "g"));
        assert!(matches!(&statements[7], Stmt::GlobalPromote { name } if name == "x"));
    }

    #[test]
    pub fn test_control_flow() {
        let statements = parse_statements(concat!(
            "if a < 2 then print(a); else print(b); endif;\n",
            "while i < 3 do i++; endwhile;\n",
            "for i = 0; i < 10; i++ do print(i); endfor;\n",
        ));

        assert!(matches!(&statements[0], Stmt::If { otherwise: Some(_), .. }));
        assert!(matches!(&statements[1], Stmt::While { .. }));

        match &statements[2] {
            Stmt::For { init, step, body, .. } => {
                assert!(matches!(**init, Stmt::Assign { .. }));
                assert!(matches!(**step, Stmt::Increment { .. }));
                assert_eq!(body.len(), 1);
            },
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    pub fn test_functions_and_calls() {
        let statements = parse_statements("function f(a, b) return a + b; endfunction; function g() return 1; endfunction; f(1, 2); g() + 1;");

        match &statements[0] {
            Stmt::FunctionDef(function) => {
                assert_eq!(function.name, "f");
                assert_eq!(function.parameters.as_ref().map(Chain::len), Some(2));
            },
            other => panic!("Expected function definition, got {:?}", other),
        }

        assert!(matches!(&statements[1], Stmt::FunctionDef(function) if function.parameters.is_none()));
        assert!(matches!(&statements[2], Stmt::Call(Call { name, arguments: Some(_) }) if name == "f"));
        assert!(matches!(&statements[3], Stmt::Expression(Expr::Binary { .. })));
    }

    #[test]
    pub fn test_array_methods() {
        let statements = parse_statements("append(a, 1); remove(a, [1]); a = [];");

        assert!(matches!(&statements[0], Stmt::ArrayAppend { target: Expr::Identifier(_), .. }));
        assert!(matches!(&statements[1], Stmt::ArrayRemove { value: Expr::ArrayLiteral(Some(_)), .. }));
        assert!(matches!(&statements[2], Stmt::Assign { value: Expr::ArrayLiteral(None), .. }));
    }
}

mod errors {
    use super::*;

    #[test]
    pub fn test_missing_semicolon_reports_line_and_token() {
        let error = parse("a = 1;\nb = 2\nc = 3;").unwrap_err();

        assert_eq!(error, SyntaxError::UnexpectedToken {
            line: 3,
            value: String::from("c"),
            message: String::from("Expected ';' after statement"),
        });
        assert!(error.to_string().starts_with("Syntax error at line 3 : c"));
    }

    #[test]
    pub fn test_unexpected_end_of_input() {
        assert!(matches!(parse("if 1 then a = 1;"), Err(SyntaxError::UnexpectedEof { .. })));
        assert!(matches!(parse(""), Err(SyntaxError::UnexpectedEof { .. })));
    }

    #[test]
    pub fn test_invalid_assignment_target() {
        assert!(matches!(parse("a + 1 = 2;"), Err(SyntaxError::UnexpectedToken { value, .. }) if value == "="));
    }

    #[test]
    pub fn test_stray_block_terminator() {
        assert!(matches!(parse("a = 1; endif;"), Err(SyntaxError::UnexpectedToken { value, .. }) if value == "endif"));
    }

    #[test]
    pub fn test_lexer_errors_do_not_stop_parsing() {
        let mut parser = Parser::new(Lexer::new("a = 1 $;"));

        assert!(parser.parse().is_ok());
        assert!(matches!(parser.lexer_errors(), [LexerError::IllegalCharacter { character: '$', .. }]));
    }

    #[test]
    pub fn test_nesting_is_bounded() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

        assert!(Parser::parse_expression_source(&nested(MAX_NESTING / 2)).is_ok());
        assert!(matches!(Parser::parse_expression_source(&nested(MAX_NESTING * 4)),
            Err(SyntaxError::UnexpectedToken { message, .. }) if message == "Nested too deeply"));

        let product = vec!["2"; MAX_NESTING * 4].join(" * ");
        assert!(matches!(Parser::parse_expression_source(&product), Err(SyntaxError::UnexpectedToken { .. })));

        let blocks = format!("{}a = 1;{}", "if 1 then ".repeat(MAX_NESTING), " endif;".repeat(MAX_NESTING));
        assert!(matches!(parse(&blocks), Err(SyntaxError::UnexpectedToken { .. })));
    }

    #[test]
    pub fn test_empty_block_is_rejected() {
        assert!(parse("while 1 do endwhile;").is_err());
    }
}
