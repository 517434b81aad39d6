mod common;

#[cfg(test)]
mod interpreter_tests {
    use lox_interpreter as lox;

    use lox::interpreter::MAX_CALL_DEPTH;
    use lox::token::{Token, TokenType};
    use lox::value::Value;
    use lox::{LoxError, Status};

    use crate::common::{output_of, run, session};

    fn runtime_failure(source: &str) -> (Vec<String>, String) {
        let run = run(source);
        assert_eq!(run.status, Status::RuntimeError);
        assert_eq!(run.errors.len(), 1);

        (run.output, run.errors[0].to_string())
    }

    // ───────────────────────────── expressions ─────────────────────────────

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(output_of("print 1 + 2 * 3;"), vec!["7"]);
        assert_eq!(output_of("print (1 + 2) * 3;"), vec!["9"]);
        assert_eq!(output_of("print -4 / 8;"), vec!["-0.5"]);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(
            output_of("print 3; print 2.5; print 10 / 4; print 1.0;"),
            vec!["3", "2.5", "2.5", "1"]
        );
    }

    #[test]
    fn test_string_concatenation_and_equality() {
        assert_eq!(
            output_of("print \"foo\" + \"bar\"; print \"a\" == \"a\"; print \"1\" == 1;"),
            vec!["foobar", "true", "false"]
        );
    }

    #[test]
    fn test_truthiness_and_comparison() {
        assert_eq!(
            output_of("print !nil; print !0; print !\"\"; print 1 < 2; print 2 <= 1; print nil == nil;"),
            vec!["true", "false", "false", "true", "false", "true"]
        );
    }

    #[test]
    fn test_logical_operators_return_an_operand() {
        assert_eq!(
            output_of("print nil or \"yes\"; print 1 and 2; print false and boom; print 0 or boom;"),
            vec!["yes", "2", "false", "0"]
        );
    }

    #[test]
    fn test_mixed_addition_is_an_error() {
        let (output, error) = runtime_failure("print \"a\" + 1;");

        assert!(output.is_empty());
        assert_eq!(error, "Operands must be two numbers or two strings.\n[line 1]");
    }

    #[test]
    fn test_division_by_zero() {
        let (output, error) = runtime_failure("print 1 / 0;");

        assert!(output.is_empty());
        assert_eq!(error, "Division by zero.\n[line 1]");
    }

    #[test]
    fn test_operand_type_errors() {
        let (_, error) = runtime_failure("print -\"x\";");
        assert_eq!(error, "Operand must be a number.\n[line 1]");

        let (_, error) = runtime_failure("print 1 < \"2\";");
        assert_eq!(error, "Operands must be numbers.\n[line 1]");
    }

    #[test]
    fn test_functions_mutate_enclosing_variables() {
        assert_eq!(
            output_of("var a = 10; fun f() { a = a + 1; return a; } print f(); print a;"),
            vec!["11", "11"]
        );
    }

    #[test]
    fn test_own_initializer_blocks_execution() {
        let run = run("var a = \"outer\"; { var a = a; }");

        assert_eq!(run.status, Status::StaticError);
        assert_eq!(
            run.messages(),
            vec!["Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_arity_checked_before_body_runs() {
        let run = run("fun f(a) { print \"body\"; } f(1, 2);");

        assert_eq!(run.status, Status::RuntimeError);
        assert!(run.output.is_empty());
    }

    // ───────────────────────────── variables ───────────────────────────────

    #[test]
    fn test_undefined_variable() {
        let (_, error) = runtime_failure("print nope;");
        assert_eq!(error, "Undefined variable 'nope'.\n[line 1]");

        let (_, error) = runtime_failure("\nnope = 1;");
        assert_eq!(error, "Undefined variable 'nope'.\n[line 2]");
    }

    #[test]
    fn test_uninitialised_variable_is_nil() {
        assert_eq!(output_of("var a; print a;"), vec!["nil"]);
    }

    #[test]
    fn test_block_shadowing() {
        assert_eq!(
            output_of("var a = \"outer\"; { var a = \"inner\"; print a; } print a;"),
            vec!["inner", "outer"]
        );
    }

    #[test]
    fn test_assignment_is_an_expression() {
        assert_eq!(output_of("var a; var b; a = b = 3; print a; print b;"), vec!["3", "3"]);
    }

    // ───────────────────────────── control flow ────────────────────────────

    #[test]
    fn test_if_else() {
        assert_eq!(
            output_of("if (1 > 2) print \"a\"; else print \"b\"; if (nil) print \"c\";"),
            vec!["b"]
        );
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            output_of("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            vec!["0", "1", "2"]
        );
    }

    #[test]
    fn test_for_loop() {
        assert_eq!(
            output_of("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["0", "1", "2"]
        );
    }

    #[test]
    fn test_for_loop_variable_is_scoped() {
        let run = run("for (var i = 0; i < 1; i = i + 1) {} print i;");

        assert_eq!(run.status, Status::RuntimeError);
        assert_eq!(run.messages(), vec!["Undefined variable 'i'."]);
    }

    // ───────────────────────────── functions ───────────────────────────────

    #[test]
    fn test_function_call_and_return() {
        assert_eq!(
            output_of("fun add(a, b) { return a + b; } print add(1, 2); print add;"),
            vec!["3", "<fn add>"]
        );
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(output_of("fun f() {} print f();"), vec!["nil"]);
    }

    #[test]
    fn test_return_unwinds_loops() {
        assert_eq!(
            output_of(
                "fun first() { for (var i = 0; ; i = i + 1) { if (i == 2) return i; } }
                 print first();"
            ),
            vec!["2"]
        );
    }

    #[test]
    fn test_recursion() {
        assert_eq!(
            output_of("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
            vec!["55"]
        );
    }

    #[test]
    fn test_closures_share_captured_variable() {
        assert_eq!(
            output_of(
                "fun make() {
                   var x = 10;
                   fun inc() { x = x + 1; return x; }
                   fun get() { return x; }
                   print inc();
                   return get;
                 }
                 var g = make();
                 print g();"
            ),
            vec!["11", "11"]
        );
    }

    #[test]
    fn test_counter_closure() {
        assert_eq!(
            output_of(
                "fun counter() { var n = 0; fun c() { n = n + 1; return n; } return c; }
                 var c = counter(); c(); c(); print c();"
            ),
            vec!["3"]
        );
    }

    #[test]
    fn test_closure_binds_lexically() {
        assert_eq!(
            output_of(
                "var a = \"global\";
                 {
                   fun show() { print a; }
                   show();
                   var a = \"block\";
                   show();
                 }"
            ),
            vec!["global", "global"]
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let (_, error) = runtime_failure("fun f(a, b) {}\nf(1);");
        assert_eq!(error, "Expected 2 arguments but got 1.\n[line 2]");
    }

    #[test]
    fn test_calling_a_non_callable() {
        let (_, error) = runtime_failure("\"text\"();");
        assert_eq!(error, "Can only call functions and classes.\n[line 1]");
    }

    #[test]
    fn test_unbounded_recursion_is_a_runtime_error() {
        let (output, error) = runtime_failure("fun f(n) { return f(n + 1); } f(0);");

        assert!(output.is_empty());
        assert_eq!(error, "Stack overflow.\n[line 1]");
    }

    #[test]
    fn test_recursion_below_the_call_limit() {
        let source = format!(
            "fun d(n) {{ if (n == 0) return 0; return 1 + d(n - 1); }} print d({});",
            MAX_CALL_DEPTH - 1
        );

        assert_eq!(output_of(&source), vec![(MAX_CALL_DEPTH - 1).to_string()]);

        let (_, error) = runtime_failure(&format!(
            "fun d(n) {{ if (n == 0) return 0; return 1 + d(n - 1); }} print d({});",
            MAX_CALL_DEPTH
        ));
        assert_eq!(error, "Stack overflow.\n[line 1]");
    }

    #[test]
    fn test_session_survives_stack_overflow() {
        let (mut session, buffer) = session();
        let mut errors: Vec<LoxError> = Vec::new();

        let status = session.run_source("fun down(n) { return down(n - 1); } down(1);", &mut errors);
        assert_eq!(status, Status::RuntimeError);
        assert_eq!(errors[0].message(), "Stack overflow.");

        let status = session.run_source(
            "fun fact(n) { if (n < 2) return 1; return n * fact(n - 1); } print fact(10);",
            &mut errors,
        );
        assert_eq!(status, Status::Success);
        assert_eq!(buffer.lines(), vec!["3628800"]);
    }

    #[test]
    fn test_clock_returns_a_number() {
        assert_eq!(output_of("print clock() > 0; print clock;"), vec!["true", "<native fn>"]);
    }

    // ───────────────────────────── classes ─────────────────────────────────

    #[test]
    fn test_class_and_instance_display() {
        assert_eq!(
            output_of("class Bagel {} print Bagel; print Bagel();"),
            vec!["Bagel", "Bagel instance"]
        );
    }

    #[test]
    fn test_fields_and_methods() {
        assert_eq!(
            output_of(
                "class Box { get() { return this.v; } }
                 var b = Box(); b.v = 42; print b.get(); print b.v;"
            ),
            vec!["42", "42"]
        );
    }

    #[test]
    fn test_fields_shadow_methods() {
        assert_eq!(
            output_of("class A { m() { return \"method\"; } } var a = A(); a.m = \"field\"; print a.m;"),
            vec!["field"]
        );
    }

    #[test]
    fn test_bound_method_keeps_receiver() {
        assert_eq!(
            output_of(
                "class P { init(n) { this.n = n; } say() { print this.n; } }
                 var m = P(\"bob\").say; m();"
            ),
            vec!["bob"]
        );
    }

    #[test]
    fn test_initializer_returns_instance() {
        assert_eq!(
            output_of(
                "class A { init() { this.x = 1; return; } }
                 var a = A(); print a.init(); print a.init() == a;"
            ),
            vec!["A instance", "true"]
        );
    }

    #[test]
    fn test_constructor_arity() {
        let (_, error) = runtime_failure("class A { init(a) {} } A();");
        assert_eq!(error, "Expected 1 arguments but got 0.\n[line 1]");

        let (_, error) = runtime_failure("class B {} B(1);");
        assert_eq!(error, "Expected 0 arguments but got 1.\n[line 1]");
    }

    #[test]
    fn test_undefined_property() {
        let (_, error) = runtime_failure("class A {} A().missing;");
        assert_eq!(error, "Undefined property 'missing'.\n[line 1]");
    }

    #[test]
    fn test_property_access_on_non_instance() {
        let (_, error) = runtime_failure("var x = 1; x.y;");
        assert_eq!(error, "Only instances have properties.\n[line 1]");

        let (_, error) = runtime_failure("var x = 1; x.y = 2;");
        assert_eq!(error, "Only instances have fields.\n[line 1]");
    }

    #[test]
    fn test_inherited_method() {
        assert_eq!(
            output_of("class A { greet() { return \"A\"; } } class B < A {} print B().greet();"),
            vec!["A"]
        );
    }

    #[test]
    fn test_super_call() {
        assert_eq!(
            output_of(
                "class A { m() { return \"A\"; } }
                 class B < A { m() { return \"B\" + super.m(); } }
                 class C < B {}
                 print C().m();"
            ),
            vec!["BA"]
        );
    }

    #[test]
    fn test_inherited_initializer() {
        assert_eq!(
            output_of(
                "class A { init(v) { this.v = v; } }
                 class B < A { init() { super.init(7); } }
                 print B().v;"
            ),
            vec!["7"]
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        let (_, error) = runtime_failure("var NotClass = 1; class A < NotClass {}");
        assert_eq!(error, "Superclass must be a class.\n[line 1]");
    }

    // ───────────────────────────── sessions ────────────────────────────────

    #[test]
    fn test_runtime_error_stops_the_program() {
        let run = run("print \"before\"; print nope; print \"after\";");

        assert_eq!(run.status, Status::RuntimeError);
        assert_eq!(run.output, vec!["before"]);
    }

    #[test]
    fn test_static_error_prevents_execution() {
        let run = run("print \"never\";\nreturn 1;");

        assert_eq!(run.status, Status::StaticError);
        assert!(run.output.is_empty());
        assert!(run.errors.iter().all(LoxError::is_static));
    }

    #[test]
    fn test_session_survives_errors() {
        let (mut session, buffer) = session();
        let mut errors: Vec<LoxError> = Vec::new();

        let lines = [
            "var a = 1;",
            "fun bump() { a = a + 1; return a; }",
            "print a +;",
            "print missing;",
            "print bump();",
        ];

        let statuses: Vec<Status> = lines
            .iter()
            .map(|line| session.run_source(line, &mut errors))
            .collect();

        assert_eq!(
            statuses,
            vec![
                Status::Success,
                Status::Success,
                Status::StaticError,
                Status::RuntimeError,
                Status::Success,
            ]
        );
        assert_eq!(buffer.lines(), vec!["2"]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_error_inside_call_restores_scope() {
        let (mut session, buffer) = session();
        let mut errors: Vec<LoxError> = Vec::new();

        session.run_source("var x = \"global\"; fun f() { var x = \"local\"; nope; }", &mut errors);
        let status = session.run_source("f();", &mut errors);
        assert_eq!(status, Status::RuntimeError);

        session.run_source("print x;", &mut errors);
        assert_eq!(buffer.lines(), vec!["global"]);
    }

    #[test]
    fn test_globals_persist_across_sources() {
        let (mut session, _) = session();
        let mut errors: Vec<LoxError> = Vec::new();

        session.run_source("var answer = 6 * 7;", &mut errors);

        let name = Token::new(TokenType::IDENTIFIER, "answer", None, 1);
        let value = session.interpreter().globals().borrow().get(&name).unwrap();

        assert_eq!(value, Value::Number(42.0));
    }

    #[test]
    fn test_failed_compile_leaves_no_distances_behind() {
        let (mut session, _) = session();
        let mut errors: Vec<LoxError> = Vec::new();

        session.run_source("fun f() { var x = 1; return x; }", &mut errors);
        let recorded = session.interpreter().locals().clone();
        assert!(!recorded.is_empty());

        let status = session.run_source("{ var a = 1; print a; }\nreturn a;", &mut errors);
        assert_eq!(status, Status::StaticError);
        assert_eq!(session.interpreter().locals(), &recorded);
    }

    #[test]
    fn test_compile_then_execute() {
        let (mut session, buffer) = session();
        let mut errors: Vec<LoxError> = Vec::new();

        let statements = session
            .compile("print \"compiled\";", &mut errors)
            .expect("program compiles");

        session.execute(&statements).unwrap();
        session.execute(&statements).unwrap();

        assert_eq!(buffer.lines(), vec!["compiled", "compiled"]);
    }
}
