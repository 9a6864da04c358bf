use korth::runtime::built_ins::register_core_words;
use korth::runtime::data_structures::value_stack::Cell;
use korth::runtime::error::ErrorKind;
use korth::runtime::interpreter::korth_interpreter::KorthInterpreter;
use korth::runtime::interpreter::{CodeManagement, InterpreterStack, WordManagement};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl Write for SharedOutput {
    fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buffer);
        Ok(buffer.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedOutput {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

fn session() -> (KorthInterpreter, SharedOutput) {
    let output = SharedOutput::default();
    let mut interpreter = KorthInterpreter::with_output(Box::new(output.clone()));

    register_core_words(&mut interpreter);

    (interpreter, output)
}

/// Evaluate one piece of source on a fresh session and return the stack bottom first.
fn eval_and_stack(source: &str) -> Vec<Cell> {
    let (mut interpreter, _output) = session();

    interpreter.process_source("<test>", source).unwrap();

    interpreter.stack().cells().to_vec()
}

// --- Defining words ---

#[test]
fn square() {
    assert_eq!(eval_and_stack(": square dup * ;  5 square"), vec![25]);
}

#[test]
fn empty_definition_is_fine() {
    assert_eq!(eval_and_stack(": nothing ;  nothing"), Vec::<Cell>::new());
}

#[test]
fn definitions_compose() {
    assert_eq!(
        eval_and_stack(": square dup * ;  : fourth square square ;  3 fourth"),
        vec![81]
    );
}

#[test]
fn definition_names_are_case_insensitive() {
    assert_eq!(eval_and_stack(": Square dup * ;  4 SQUARE"), vec![16]);
}

#[test]
fn a_number_can_name_a_word() {
    // The definition shadows the literal; the token now resolves as a word.
    assert_eq!(eval_and_stack(": 13 42 ;  13"), vec![42]);
}

#[test]
fn definitions_span_source_boundaries() {
    let (mut interpreter, _output) = session();

    interpreter.process_source("<repl>", ": double").unwrap();
    assert!(interpreter.is_compiling());

    interpreter.process_source("<repl>", "2 * ;").unwrap();
    assert!(!interpreter.is_compiling());

    interpreter.process_source("<repl>", "21 double").unwrap();
    assert_eq!(interpreter.stack().cells(), &[42]);
}

#[test]
fn colon_without_a_name_is_end_of_input() {
    let (mut interpreter, _output) = session();
    let error = interpreter.process_source("<test>", ":").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::UnexpectedEndOfInput);
}

#[test]
fn nested_colon_is_rejected() {
    let (mut interpreter, _output) = session();
    let error = interpreter.process_source("<test>", ": outer : inner ;").unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorKind::UnbalancedControlStructure(_)
    ));
    assert!(interpreter.find_word("outer").is_none());
}

#[test]
fn stray_semicolon_is_rejected() {
    let (mut interpreter, _output) = session();
    let error = interpreter.process_source("<test>", ";").unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorKind::UnbalancedControlStructure(_)
    ));
}

// --- Shadowing and late binding ---

#[test]
fn redefinition_shadows() {
    assert_eq!(eval_and_stack(": greet 1 ;  : greet 2 ;  greet"), vec![2]);
}

#[test]
fn late_binding_follows_redefinition() {
    let (mut interpreter, _output) = session();

    // combine compiles a call to + by name.
    interpreter.process_source("<test>", ": combine + ;").unwrap();
    interpreter.process_source("<test>", "1 2 combine").unwrap();
    assert_eq!(interpreter.stack().cells(), &[3]);

    interpreter.process_source("<test>", "0sp  : + - ;").unwrap();

    // New uses of + now subtract.
    interpreter.process_source("<test>", "10 4 +").unwrap();
    assert_eq!(interpreter.stack().cells(), &[6]);

    // And so does the word compiled before the redefinition: its call to + resolves
    // through the dictionary each time it runs.
    interpreter.process_source("<test>", "0sp  10 4 combine").unwrap();
    assert_eq!(interpreter.stack().cells(), &[6]);
}

// --- Control flow ---

#[test]
fn if_takes_the_true_branch() {
    assert_eq!(
        eval_and_stack(": pick-branch if 10 else 20 then ;  -1 pick-branch"),
        vec![10]
    );
}

#[test]
fn if_takes_the_false_branch() {
    assert_eq!(
        eval_and_stack(": pick-branch if 10 else 20 then ;  0 pick-branch"),
        vec![20]
    );
}

#[test]
fn if_without_else_falls_through() {
    assert_eq!(
        eval_and_stack(": maybe-ten if 10 then ;  0 maybe-ten  -1 maybe-ten"),
        vec![10]
    );
}

#[test]
fn nested_ifs() {
    let source = ": classify dup 0 = if drop 0 else dup 0 < if drop -1 else drop 1 then then ;";
    let (mut interpreter, _output) = session();

    interpreter.process_source("<test>", source).unwrap();
    interpreter.process_source("<test>", "-7 classify  0 classify  9 classify").unwrap();

    assert_eq!(interpreter.stack().cells(), &[-1, 0, 1]);
}

#[test]
fn do_loop_counts_index_up_to_limit() {
    // Sums i over 0..5.
    assert_eq!(eval_and_stack(": sum5 0  5 0 do i + loop ;  sum5"), vec![10]);
}

#[test]
fn do_loop_prints_each_index() {
    let (mut interpreter, output) = session();

    interpreter
        .process_source("<test>", ": counts 3 0 do i . loop ;  counts")
        .unwrap();

    assert_eq!(output.text(), "0 1 2 ");
}

#[test]
fn nested_do_loops_with_outer_index() {
    let (mut interpreter, output) = session();

    interpreter
        .process_source("<test>", ": pairs 2 0 do 2 0 do j . i . loop loop ;  pairs")
        .unwrap();

    assert_eq!(output.text(), "0 0 0 1 1 0 1 1 ");
}

#[test]
fn begin_until_repeats_while_false() {
    assert_eq!(
        eval_and_stack(": count-up 0 begin 1+ dup 5 >= until ;  count-up"),
        vec![5]
    );
}

#[test]
fn countdown_recurses_and_prints() {
    let source = ": countdown dup 0 = if drop else dup . 1 - countdown then ;";
    let (mut interpreter, output) = session();

    interpreter.process_source("<test>", source).unwrap();
    interpreter.process_source("<test>", "3 countdown").unwrap();

    assert_eq!(output.text(), "3 2 1 ");
    assert_eq!(interpreter.stack().depth(), 0);
}

#[test]
fn runaway_recursion_is_resource_exhaustion() {
    let (mut interpreter, _output) = session();

    interpreter.process_source("<test>", ": forever forever ;").unwrap();

    let error = interpreter.process_source("<test>", "forever").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::ResourceExhausted);
}

#[test]
fn loop_index_outside_a_loop_is_rejected() {
    let (mut interpreter, _output) = session();
    let error = interpreter.process_source("<test>", "i").unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorKind::UnbalancedControlStructure(_)
    ));
}

// --- Structure balance ---

#[test]
fn unclosed_if_fails_and_registers_nothing() {
    let (mut interpreter, _output) = session();
    let error = interpreter.process_source("<test>", ": broken if ;").unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorKind::UnbalancedControlStructure(_)
    ));
    assert!(interpreter.find_word("broken").is_none());
    assert!(!interpreter.is_compiling());
}

#[test]
fn mismatched_closers_fail_at_the_offending_token() {
    for source in [
        ": broken loop ;",
        ": broken then ;",
        ": broken else then ;",
        ": broken until ;",
        ": broken if loop then ;",
    ] {
        let (mut interpreter, _output) = session();
        let error = interpreter.process_source("<test>", source).unwrap_err();

        assert!(
            matches!(error.kind(), ErrorKind::UnbalancedControlStructure(_)),
            "{} reported {:?}",
            source,
            error.kind()
        );
        assert!(interpreter.find_word("broken").is_none());
    }
}

#[test]
fn structure_words_require_a_definition() {
    for source in ["if", "do", "begin", "then", "loop", "until", "else"] {
        let (mut interpreter, _output) = session();
        let error = interpreter.process_source("<test>", source).unwrap_err();

        assert!(
            matches!(error.kind(), ErrorKind::UnbalancedControlStructure(_)),
            "{} reported {:?}",
            source,
            error.kind()
        );
    }
}

// --- Immediate words ---

#[test]
fn immediate_words_run_during_compilation() {
    let (mut interpreter, output) = session();

    interpreter
        .process_source("<test>", ": star 42 emit immediate ;")
        .unwrap();
    assert_eq!(output.text(), "");

    // star runs while boxed is being compiled, not when boxed runs.
    interpreter.process_source("<test>", ": boxed star ;").unwrap();
    assert_eq!(output.text(), "*");

    interpreter.process_source("<test>", "boxed").unwrap();
    assert_eq!(output.text(), "*");
}

#[test]
fn immediate_outside_a_definition_is_rejected() {
    let (mut interpreter, _output) = session();
    let error = interpreter.process_source("<test>", "immediate").unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorKind::UnbalancedControlStructure(_)
    ));
}

// --- Comments ---

#[test]
fn paren_comments_are_skipped() {
    assert_eq!(eval_and_stack("1 ( two three four ) 2"), vec![1, 2]);
}

#[test]
fn paren_comments_work_inside_definitions() {
    assert_eq!(
        eval_and_stack(": square ( n -- n*n ) dup * ;  6 square"),
        vec![36]
    );
}

#[test]
fn unterminated_paren_comment_is_end_of_input() {
    let (mut interpreter, _output) = session();
    let error = interpreter.process_source("<test>", "1 ( never closed").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::UnexpectedEndOfInput);
}

#[test]
fn line_comments_run_to_end_of_line() {
    assert_eq!(eval_and_stack("1 # 2 3 4\n5"), vec![1, 5]);
}

// --- Error recovery ---

#[test]
fn a_failed_definition_does_not_kill_the_session() {
    let (mut interpreter, _output) = session();

    assert!(interpreter.process_source("<test>", ": broken if ;").is_err());

    interpreter.process_source("<test>", ": fine 2 2 + ;  fine").unwrap();
    assert_eq!(interpreter.stack().cells(), &[4]);
}

#[test]
fn unknown_words_compile_to_late_bound_calls() {
    let (mut interpreter, _output) = session();

    // The call compiles by name; nothing requires bogus to exist until it runs.
    interpreter.process_source("<test>", ": partial 1 2 bogus ;").unwrap();

    let error = interpreter.process_source("<test>", "partial").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::UndefinedWord("BOGUS".to_string()));
    assert_eq!(interpreter.stack().cells(), &[1, 2]);

    // Defining it afterwards makes the earlier word whole.
    interpreter.process_source("<test>", "0sp  : bogus + ;  partial").unwrap();
    assert_eq!(interpreter.stack().cells(), &[3]);
}
