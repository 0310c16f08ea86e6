use codespan_reporting::diagnostic::Severity;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use codespan_reporting::term::{self, Config, DisplayStyle};

use scillac::message::Messages;
use scillac::Driver;

pub struct ConsoleDriver {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: Config,
    errors: usize,
}

impl ConsoleDriver {
    pub fn new(files: SimpleFiles<String, String>) -> Self {
        Self {
            files,
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: Config {
                display_style: DisplayStyle::Rich,
                ..Default::default()
            },
            errors: 0,
        }
    }

    /// How many error-severity messages have been emitted so far.
    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl Driver for ConsoleDriver {
    fn report(&mut self, messages: Messages) {
        for msg in messages.msgs {
            if msg.severity >= Severity::Error {
                self.errors += 1;
            }

            term::emit(&mut self.writer, &self.config, &self.files, &msg).unwrap();
        }
    }
}
