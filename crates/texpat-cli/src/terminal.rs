use std::io::{self, IsTerminal, Write};

use codespan_reporting::term::termcolor::{self, ColorChoice, WriteColor};

use crate::ARGS;
use crate::args;

/// Returns a handle to the optionally colored terminal output.
pub fn out() -> TermOut {
    TermOut { stream: termcolor::StandardStream::stderr(color_choice()) }
}

/// Whether the output should be colored, based on the `--color` argument and
/// whether stderr is a terminal.
fn color_choice() -> ColorChoice {
    match ARGS.color {
        args::ColorChoice::Auto if io::stderr().is_terminal() => ColorChoice::Auto,
        args::ColorChoice::Always => ColorChoice::Always,
        _ => ColorChoice::Never,
    }
}

/// A utility that allows users to write colored terminal output.
/// If colors are not supported by the terminal, they are disabled.
pub struct TermOut {
    stream: termcolor::StandardStream,
}

impl Write for TermOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.lock().flush()
    }
}

impl WriteColor for TermOut {
    fn supports_color(&self) -> bool {
        self.stream.supports_color()
    }

    fn set_color(&mut self, spec: &termcolor::ColorSpec) -> io::Result<()> {
        self.stream.lock().set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.stream.lock().reset()
    }
}
