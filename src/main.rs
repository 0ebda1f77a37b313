//! Reads queries from stdin and writes their results to stdout.
//!
//! See [`osavl_tree::query`] for the input format. A malformed or failing query is
//! reported on stderr and ends the run with a non-zero exit status.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use osavl_tree::OSAvlSet;
use osavl_tree::query;

fn main() -> ExitCode {
    let mut input = String::new();
    if let Err(error) = io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read stdin: {error}");
        return ExitCode::FAILURE;
    }

    let mut set = OSAvlSet::new();
    let mut output = String::new();
    let outcome = query::run(&input, &mut set, &mut output);

    let mut stdout = io::stdout().lock();
    if let Err(error) = stdout.write_all(output.as_bytes()).and_then(|()| writeln!(stdout)) {
        eprintln!("failed to write stdout: {error}");
        return ExitCode::FAILURE;
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
