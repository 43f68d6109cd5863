use std::process::ExitCode;

use texpat_cli::args::Command;
use texpat_cli::{ARGS, EXIT, print_error, set_failed};
use texpat_syntax::StrResult;

/// Entry point.
fn main() -> ExitCode {
    if let Err(err) = texpat_cli::tracing::setup_tracing(&ARGS) {
        eprintln!("failed to initialize tracing ({err})");
    }

    let res = dispatch();

    if let Err(msg) = res {
        set_failed();
        print_error(&msg).expect("failed to print error");
    }

    EXIT.with(|cell| cell.get())
}

/// Execute the requested command.
fn dispatch() -> StrResult<()> {
    match &ARGS.command {
        Command::Parse(command) => texpat_cli::parse::parse(command)?,
        Command::Check(command) => texpat_cli::check::check(command)?,
        Command::Styles(command) => texpat_cli::styles::styles(command)?,
    }

    Ok(())
}
