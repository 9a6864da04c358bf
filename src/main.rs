use korth::runtime::{
    built_ins::register_core_words,
    error::{ErrorKind, Result, ScriptError},
    interpreter::{korth_interpreter::KorthInterpreter, CodeManagement},
};
use std::{
    env,
    io::{self, BufRead},
    process::ExitCode,
};

/// Read and process one script file against the session.  The file is read here, the
/// interpreter core itself never touches the file system.  A definition left open at
/// the end of the file is reported as running out of input.
fn run_file(interpreter: &mut KorthInterpreter, path: &str) -> Result<()> {
    let source = std::fs::read_to_string(path)?;

    interpreter.process_source(path, &source)?;

    if interpreter.is_compiling() {
        interpreter.construction_abandon();

        return ScriptError::new_as_result(ErrorKind::UnexpectedEndOfInput, None, None);
    }

    Ok(())
}

/// The interactive loop.  Each line is processed as its own piece of source; a
/// successful line answers `ok`, or `compiled` while a definition is still open, and
/// an error keeps the session alive for the next line.
fn repl(interpreter: &mut KorthInterpreter) {
    println!("Type bye or an end of file to quit.");

    let stdin = io::stdin();

    loop {
        let mut line = String::new();

        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        if line.trim().eq_ignore_ascii_case("bye") {
            break;
        }

        match interpreter.process_source("<repl>", &line) {
            Ok(()) => {
                if interpreter.is_compiling() {
                    println!("compiled");
                } else {
                    println!("ok");
                }
            }

            Err(error) => println!(" ? {}", error),
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    // Create the session and give it the core word set.  The words are registered by
    // the host rather than baked into the interpreter, so an embedding program is free
    // to supply a different set.
    let mut interpreter = KorthInterpreter::new();

    register_core_words(&mut interpreter);

    // An optional startup file of definitions to process before anything else.
    if let Ok(path) = env::var("KORTH_STARTUP") {
        if let Err(error) = run_file(&mut interpreter, &path) {
            eprintln!("Error: {}", error);
            return ExitCode::FAILURE;
        }
    }

    // With script files as arguments, run them in order; otherwise start the REPL.
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        repl(&mut interpreter);
    } else {
        for path in args.iter() {
            if let Err(error) = run_file(&mut interpreter, path) {
                eprintln!("Error: {}", error);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
