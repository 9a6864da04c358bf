use korth::runtime::built_ins::register_core_words;
use korth::runtime::data_structures::value_stack::Cell;
use korth::runtime::error::{ErrorKind, Result};
use korth::runtime::interpreter::korth_interpreter::KorthInterpreter;
use korth::runtime::interpreter::{CodeManagement, InterpreterStack};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// A clonable sink so a test can hand the session its output buffer and still read it
/// afterwards.
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

/// A fresh session with the core words registered and its output captured.
fn session() -> (KorthInterpreter, SharedOutput) {
    let output = SharedOutput::default();
    let mut interpreter = KorthInterpreter::with_output(Box::new(output.clone()));

    register_core_words(&mut interpreter);

    (interpreter, output)
}

/// Seed the stack, evaluate the source, and return the resulting stack bottom first.
fn eval_and_stack(source: &str, init_stack: &[Cell]) -> Result<Vec<Cell>> {
    let (mut interpreter, _output) = session();

    for &value in init_stack {
        interpreter.push(value);
    }

    interpreter.process_source("<test>", source)?;

    Ok(interpreter.stack().cells().to_vec())
}

/// Evaluate the source and return what the printing words wrote.
fn eval_output(source: &str) -> Result<String> {
    let (mut interpreter, output) = session();

    interpreter.process_source("<test>", source)?;

    Ok(output.text())
}

#[test]
fn zero() {
    assert_eq!(eval_and_stack("0", &[]).unwrap(), vec![0]);
}

#[test]
fn number() {
    assert_eq!(eval_and_stack("42", &[]).unwrap(), vec![42]);
}

#[test]
fn negative_number() {
    assert_eq!(eval_and_stack("-17", &[]).unwrap(), vec![-17]);
}

#[test]
fn hex_and_binary_literals() {
    assert_eq!(eval_and_stack("0x2a 0b1010 1_000", &[]).unwrap(), vec![42, 10, 1000]);
}

#[test]
fn literals_stack_in_order() {
    assert_eq!(eval_and_stack("1 2 3", &[]).unwrap(), vec![1, 2, 3]);
}

#[test]
fn pops_are_lifo() {
    let (mut interpreter, _output) = session();

    interpreter.process_source("<test>", "1 2 3 4 5").unwrap();

    for expected in (1..=5).rev() {
        assert_eq!(interpreter.pop().unwrap(), expected);
    }
}

// --- Arithmetic ---

#[test]
fn simple_add() {
    assert_eq!(eval_and_stack("+", &[2, 2]).unwrap(), vec![4]);
}

#[test]
fn simple_sub() {
    assert_eq!(eval_and_stack("-", &[5, 2]).unwrap(), vec![3]);
}

#[test]
fn simple_mul() {
    assert_eq!(eval_and_stack("*", &[3, 4]).unwrap(), vec![12]);
}

#[test]
fn simple_div() {
    assert_eq!(eval_and_stack("/", &[12, 3]).unwrap(), vec![4]);
}

#[test]
fn simple_mod() {
    assert_eq!(eval_and_stack("mod", &[13, 5]).unwrap(), vec![3]);
}

#[test]
fn simple_div_mod() {
    assert_eq!(eval_and_stack("/mod", &[13, 5]).unwrap(), vec![3, 2]);
}

#[test]
fn increments_and_doublings() {
    assert_eq!(eval_and_stack("1+", &[41]).unwrap(), vec![42]);
    assert_eq!(eval_and_stack("1-", &[43]).unwrap(), vec![42]);
    assert_eq!(eval_and_stack("2*", &[7]).unwrap(), vec![14]);
    assert_eq!(eval_and_stack("2/", &[8]).unwrap(), vec![4]);
}

#[test]
fn abs_negate_min_max() {
    assert_eq!(eval_and_stack("abs", &[-42]).unwrap(), vec![42]);
    assert_eq!(eval_and_stack("negate", &[42]).unwrap(), vec![-42]);
    assert_eq!(eval_and_stack("min", &[3, 9]).unwrap(), vec![3]);
    assert_eq!(eval_and_stack("max", &[3, 9]).unwrap(), vec![9]);
}

#[test]
fn divide_by_zero_keeps_operands() {
    let (mut interpreter, _output) = session();

    interpreter.push(1);
    interpreter.push(0);

    let error = interpreter.process_source("<test>", "/").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::DivisionByZero);
    assert_eq!(interpreter.stack().cells(), &[1, 0]);
}

#[test]
fn modulo_by_zero_keeps_operands() {
    let (mut interpreter, _output) = session();

    interpreter.push(7);
    interpreter.push(0);

    let error = interpreter.process_source("<test>", "mod").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::DivisionByZero);
    assert_eq!(interpreter.stack().cells(), &[7, 0]);
}

// --- Stack manipulation ---

#[test]
fn dup_then_drop_is_identity() {
    assert_eq!(eval_and_stack("dup drop", &[1, 2, 3]).unwrap(), vec![1, 2, 3]);
}

#[test]
fn dup() {
    assert_eq!(eval_and_stack("dup", &[7]).unwrap(), vec![7, 7]);
}

#[test]
fn drop_word() {
    assert_eq!(eval_and_stack("drop", &[1, 2]).unwrap(), vec![1]);
}

#[test]
fn swap() {
    assert_eq!(eval_and_stack("swap", &[1, 2]).unwrap(), vec![2, 1]);
}

#[test]
fn over() {
    assert_eq!(eval_and_stack("over", &[1, 2]).unwrap(), vec![1, 2, 1]);
}

#[test]
fn rot() {
    assert_eq!(eval_and_stack("rot", &[1, 2, 3]).unwrap(), vec![2, 3, 1]);
}

#[test]
fn tuck() {
    assert_eq!(eval_and_stack("tuck", &[1, 2]).unwrap(), vec![2, 1, 2]);
}

#[test]
fn depth_reports_before_push() {
    assert_eq!(eval_and_stack("depth", &[5, 6]).unwrap(), vec![5, 6, 2]);
}

#[test]
fn clear_stack() {
    assert_eq!(eval_and_stack("0sp", &[1, 2, 3]).unwrap(), Vec::<Cell>::new());
}

#[test]
fn underflow_is_reported() {
    let error = eval_and_stack("drop", &[]).unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::StackUnderflow);
}

#[test]
fn peek_reads_without_removing() {
    let (mut interpreter, _output) = session();

    interpreter.process_source("<test>", "10 20").unwrap();

    assert_eq!(interpreter.peek(0).unwrap(), 20);
    assert_eq!(interpreter.peek(1).unwrap(), 10);
    assert_eq!(interpreter.stack().depth(), 2);
}

// --- Comparison and logic ---

#[test]
fn equal() {
    assert_eq!(eval_and_stack("=", &[5, 5]).unwrap(), vec![-1]);
    assert_eq!(eval_and_stack("=", &[5, 6]).unwrap(), vec![0]);
}

#[test]
fn not_equal() {
    assert_eq!(eval_and_stack("<>", &[5, 6]).unwrap(), vec![-1]);
    assert_eq!(eval_and_stack("<>", &[5, 5]).unwrap(), vec![0]);
}

#[test]
fn orderings() {
    assert_eq!(eval_and_stack("<", &[3, 4]).unwrap(), vec![-1]);
    assert_eq!(eval_and_stack("<=", &[4, 4]).unwrap(), vec![-1]);
    assert_eq!(eval_and_stack(">", &[4, 3]).unwrap(), vec![-1]);
    assert_eq!(eval_and_stack(">=", &[3, 4]).unwrap(), vec![0]);
}

#[test]
fn bitwise_and_or() {
    assert_eq!(eval_and_stack("and", &[-1, 0]).unwrap(), vec![0]);
    assert_eq!(eval_and_stack("or", &[-1, 0]).unwrap(), vec![-1]);
    assert_eq!(eval_and_stack("and", &[12, 10]).unwrap(), vec![8]);
}

#[test]
fn logical_not() {
    assert_eq!(eval_and_stack("not", &[0]).unwrap(), vec![-1]);
    assert_eq!(eval_and_stack("not", &[7]).unwrap(), vec![0]);
}

#[test]
fn true_and_false_words() {
    assert_eq!(eval_and_stack("true false", &[]).unwrap(), vec![-1, 0]);
}

// --- Dispatch ---

#[test]
fn undefined_word_names_the_token() {
    let error = eval_and_stack("frobnicate", &[]).unwrap_err();

    assert_eq!(
        error.kind(),
        &ErrorKind::UndefinedWord("frobnicate".to_string())
    );
}

#[test]
fn failed_execution_keeps_prior_pushes() {
    let (mut interpreter, _output) = session();

    let error = interpreter.process_source("<test>", "1 2 bogus 3").unwrap_err();

    assert_eq!(
        error.kind(),
        &ErrorKind::UndefinedWord("bogus".to_string())
    );
    assert_eq!(interpreter.stack().cells(), &[1, 2]);
}

#[test]
fn lookup_is_case_insensitive() {
    assert_eq!(eval_and_stack("5 DUP Dup", &[]).unwrap(), vec![5, 5, 5]);
}

#[test]
fn session_survives_an_error() {
    let (mut interpreter, _output) = session();

    assert!(interpreter.process_source("<test>", "bogus").is_err());
    assert!(interpreter.process_source("<test>", "1 2 +").is_ok());
    assert_eq!(interpreter.stack().cells(), &[3]);
}

// --- Output ---

#[test]
fn print_pops_and_prints() {
    let (mut interpreter, output) = session();

    interpreter.process_source("<test>", "42 .").unwrap();

    assert_eq!(output.text(), "42 ");
    assert_eq!(interpreter.stack().depth(), 0);
}

#[test]
fn emit_prints_a_character() {
    assert_eq!(eval_output("65 emit").unwrap(), "A");
}

#[test]
fn emit_replaces_invalid_code_points() {
    assert_eq!(eval_output("-1 emit").unwrap(), "\u{FFFD}");
}

#[test]
fn cr_prints_a_newline() {
    assert_eq!(eval_output("7 . cr 8 .").unwrap(), "7 \n8 ");
}

#[test]
fn space_and_spaces() {
    assert_eq!(eval_output("65 emit space 66 emit 3 spaces 67 emit").unwrap(), "A B   C");
}

#[test]
fn print_stack_leaves_it_alone() {
    let (mut interpreter, output) = session();

    interpreter.process_source("<test>", "1 2 3 .s").unwrap();

    assert_eq!(output.text(), "1 2 3\n");
    assert_eq!(interpreter.stack().cells(), &[1, 2, 3]);
}

#[test]
fn dictionary_listing_mentions_core_words() {
    let listing = eval_output(".w").unwrap();

    assert!(listing.contains("words defined."));
    assert!(listing.contains("DUP"));
    assert!(listing.contains("immediate"));
}

// --- Session words ---

#[test]
fn reset_clears_the_stack() {
    assert_eq!(eval_and_stack("reset", &[1, 2, 3]).unwrap(), Vec::<Cell>::new());
}

#[test]
fn max_depth_is_tracked() {
    let (mut interpreter, _output) = session();

    interpreter.process_source("<test>", "1 2 3 drop drop").unwrap();

    assert_eq!(interpreter.stack().depth(), 1);
    assert_eq!(interpreter.stack().max_depth(), 3);
}
