#[cfg(test)]
mod scanner_tests {
    use lox_interpreter as lox;

    use lox::scanner::*;
    use lox::token::*;
    use lox::LoxError;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class fun var orchid or _tmp this super",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::FUN, "fun"),
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::OR, "or"),
                (TokenType::IDENTIFIER, "_tmp"),
                (TokenType::THIS, "this"),
                (TokenType::SUPER, "super"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_literals_and_lines() {
        let tokens: Vec<Token> = Scanner::new("123.23\n 32 + \"Hello world\"")
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::NUMBER, "123.23", Some(Literal::Number(123.23)), 1),
                Token::new(TokenType::NUMBER, "32", Some(Literal::Number(32.0)), 2),
                Token::new(TokenType::PLUS, "+", None, 2),
                Token::new(
                    TokenType::STRING,
                    "\"Hello world\"",
                    Some(Literal::Str("Hello world".into())),
                    2
                ),
                Token::new(TokenType::EOF, "", None, 2),
            ]
        );
    }

    #[test]
    fn test_scanner_05_comments_are_discarded() {
        assert_token_sequence(
            "var a; // trailing comment\n// whole line\nprint a;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "a"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::PRINT, "print"),
                (TokenType::IDENTIFIER, "a"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );

        let tokens: Vec<Token> = Scanner::new("// c\n// d\nx").filter_map(Result::ok).collect();
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn test_scanner_06_multiline_string_advances_line() {
        let tokens: Vec<Token> = Scanner::new("\"a\nb\" x").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb".into())));
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_07_trailing_dot_is_not_fraction() {
        assert_token_sequence(
            "12.",
            &[
                (TokenType::NUMBER, "12"),
                (TokenType::DOT, "."),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source).collect();

        // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(LoxError::message)
            .collect();

        assert_eq!(
            errors,
            vec!["Unexpected character: $", "Unexpected character: #"]
        );

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_non_ascii_character_is_one_error() {
        let mut errors: Vec<LoxError> = Vec::new();
        let tokens = scan_tokens("a é b", &mut errors);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Unexpected character: é");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_unterminated_string_reports_and_reaches_eof() {
        let mut errors: Vec<LoxError> = Vec::new();
        let tokens = scan_tokens("print \"oops\nstill going", &mut errors);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 2] Error: Unterminated string.");

        let kinds: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(kinds, vec![TokenType::PRINT, TokenType::EOF]);
    }

    #[test]
    fn test_rescanning_is_deterministic() {
        let source = "class A < B { init(x) { this.x = x * 2.5; } } // done\nprint \"s\";";
        let first: Vec<_> = Scanner::new(source).filter_map(Result::ok).collect();
        let second: Vec<_> = Scanner::new(source).filter_map(Result::ok).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_token_display() {
        let tokens: Vec<Token> = Scanner::new("3 2.5 \"hi\" x").filter_map(Result::ok).collect();
        let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec![
                "NUMBER 3 3.0",
                "NUMBER 2.5 2.5",
                "STRING \"hi\" hi",
                "IDENTIFIER x null",
                "EOF  null",
            ]
        );
    }
}
