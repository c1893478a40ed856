use clap::Parser as ClapParser;
use brash::{run, run_source, Config, Error};
use brash::interpreter::evaluator::{Outcome, RuntimeError};
use brash::util::SharedBuffer;

fn config(args: &[&str]) -> Config {
    Config::parse_from(std::iter::once("brash").chain(args.iter().copied()))
}

fn execute(source: &str, args: &[&str]) -> (Result<Outcome, Error>, String) {
    let output = SharedBuffer::new();
    let result = run_source(source, &config(args), Box::new(output.clone()));

    (result, output.contents())
}

fn assert_prints(source: &str, expected: &str) {
    let (result, output) = execute(source, &[]);

    if let Err(error) = result {
        panic!("Program failed:\n{}\nError: {}", source, error);
    }

    assert_eq!(output, expected, "Unexpected output for:\n{}", source);
}

#[test]
fn recursive_fibonacci() {
    assert_prints(r#"
        function fib(n)
            if n < 2 then
                return n;
            endif;
            return fib(n - 1) + fib(n - 2);
        endfunction;

        print(fib(10));
    "#, "55\n");
}

#[test]
fn bubble_sort_mutates_shared_array() {
    assert_prints(r#"
        function sort(a, n)
            for i = 0; i < n; i++ do
                for j = 0; j < (n - i - 1); j++ do
                    if a[j] > a[j + 1] then
                        t = a[j];
                        a[j] = a[j + 1];
                        a[j + 1] = t;
                    endif;
                endfor;
            endfor;
            return a;
        endfunction;

        numbers = [5, 3, 9, 1];
        sort(numbers, 4);
        print(numbers);
    "#, "[1, 3, 5, 9]\n");
}

#[test]
fn loop_state_survives_only_in_arrays() {
    assert_prints(r#"
        total = [0];
        i = 0;
        while i < 5 do
            i++;
            total[0] = total[0] + i;
        endwhile;
        print(total[0], i);
    "#, "15 0\n");
}

#[test]
fn strings_and_printing() {
    assert_prints(r#"
        // greeting
        greeting = "Hello" + ", " + 'world';
        print(greeting); // trailing comment
        print("ab" * 3, ["a", 1], 7 / 2, 4 / 2, 1 == 1);
    "#, "Hello, world\nababab ['a', 1] 3.5 2.0 True\n");
}

#[test]
fn globals_shared_between_functions() {
    assert_prints(r#"
        global count = 0;
        function bump()
            count = count + 1;
            global count;
        endfunction;

        bump();
        bump();
        print(count);
    "#, "2\n");
}

#[test]
fn arrays_passed_to_functions_are_shared() {
    assert_prints(r#"
        function push_twice(list, v)
            append(list, v);
            append(list, v);
        endfunction;

        items = [];
        alias = items;
        push_twice(items, "x");
        remove(alias, "x");
        print(items, id(items) == id(alias));
    "#, "['x'] True\n");
}

#[test]
fn multi_assign_swaps() {
    assert_prints("a, b = 1, 2; a, b = b, a; print(a, b);", "2 1\n");
}

#[test]
fn eval_sees_current_scope() {
    assert_prints("x = 3; code = \"x * x\"; print(eval(code) + 1);", "10\n");
}

#[test]
fn illegal_characters_are_skipped() {
    assert_prints("x = 2 $;\nprint(x);", "2\n");
}

#[test]
fn exit_inside_function() {
    let (result, output) = execute("function f() print('in'); exit; print('after'); endfunction; f(); print('never');", &[]);

    assert!(matches!(result, Ok(Outcome::Exited)));
    assert_eq!(output, "in\nBye\n");
}

#[test]
fn syntax_error_runs_nothing() {
    let (result, output) = execute("print(1);\nb = 2\nc = 3;", &[]);

    match result {
        Err(Error::Syntax(error)) => assert!(error.to_string().starts_with("Syntax error at line 3 : c")),
        other => panic!("Expected a syntax error, got {:?}", other),
    }

    assert_eq!(output, "");
}

#[test]
fn runtime_error_keeps_earlier_output() {
    let (result, output) = execute("print('before'); print(missing); print('after');", &[]);

    assert!(matches!(result, Err(Error::Runtime(RuntimeError::VariableNotFound { .. }))));
    assert_eq!(output, "before\n");
}

#[test]
fn command_line_limits() {
    let (result, _) = execute("print(eval('1'));", &["--no-eval"]);
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::EvalDisabled))));

    let (result, _) = execute("function f(n) return f(n + 1); endfunction; f(0);", &["--max-depth", "8"]);
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::StackDepthExceeded { limit: 8 }))));
}

#[test]
fn run_reads_input_file() {
    let path = std::env::temp_dir().join(format!("brash-programs-{}.brash", std::process::id()));
    std::fs::write(&path, "exit;").unwrap();

    let result = run(&config(&[path.to_str().unwrap()]));
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Ok(Outcome::Exited)));
    assert!(matches!(run(&config(&["does-not-exist.brash"])), Err(Error::Io(_))));
}

#[test]
fn limits_are_errors_not_crashes() {
    let (result, _) = execute("function f(n) return f(n + 1); endfunction; f(0);", &[]);
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::StackDepthExceeded { .. }))));

    let (result, _) = execute("s = 'ab' * 9223372036854775807;", &[]);
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::Overflow { .. }))));

    let (result, _) = execute(&format!("x = {}1{};", "(".repeat(1000), ")".repeat(1000)), &[]);
    assert!(matches!(result, Err(Error::Syntax(_))));
}
