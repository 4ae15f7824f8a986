//! Line-oriented input sources for commands and their arguments.
//!
//! The same reader drives both the operator's terminal and script files; the
//! [`InputMode`] decides whether prompts are shown and whether a badly
//! formatted field is asked for again or aborts the command.

mod fields;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use thiserror::Error;

pub(crate) use fields::{
    input_file_path, input_id, input_killer, input_login, input_password, input_record,
    need_registration,
};

const COMMAND_PROMPT: &str = "Input a command: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    /// Operator input: format errors reprompt.
    Interactive,
    /// Script file: format errors abort the current command.
    Script,
}

/// Failures raised while reading input.
#[derive(Debug, Error)]
pub(crate) enum InputError {
    /// The operator supplied a value in the wrong format.
    #[error("{0}")]
    Format(String),
    /// The source has no more lines.
    #[error("input is exhausted")]
    Exhausted,
    #[error("failed to read input: {0}")]
    Io(#[source] io::Error),
}

/// A source of command names and field values.
pub(crate) trait InputSource {
    fn mode(&self) -> InputMode;

    /// Reads the next non-blank command line and returns its command name.
    ///
    /// Anything after the name is kept and answers the next field request.
    fn next_command(&mut self, out: &mut dyn Write) -> Result<String, InputError>;

    /// Reads one raw line in answer to `prompt`.
    fn read_line(&mut self, out: &mut dyn Write, prompt: &str) -> Result<String, InputError>;
}

pub(crate) struct LineInput<R> {
    reader: R,
    mode: InputMode,
    prompts: bool,
    pending: Option<String>,
}

impl<R: BufRead> LineInput<R> {
    /// Operator input. `prompts` controls whether prompts are printed.
    pub(crate) const fn interactive(reader: R, prompts: bool) -> Self {
        Self {
            reader,
            mode: InputMode::Interactive,
            prompts,
            pending: None,
        }
    }

    pub(crate) const fn script(reader: R) -> Self {
        Self {
            reader,
            mode: InputMode::Script,
            prompts: false,
            pending: None,
        }
    }

    fn read_raw(&mut self) -> Result<String, InputError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(InputError::Io)?;
        if read == 0 {
            return Err(InputError::Exhausted);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    fn prompt(&self, out: &mut dyn Write, text: &str) -> Result<(), InputError> {
        if !self.prompts {
            return Ok(());
        }
        write!(out, "{text}")
            .and_then(|()| out.flush())
            .map_err(InputError::Io)
    }
}

impl LineInput<BufReader<File>> {
    /// Opens a script file as a non-interactive source.
    pub(crate) fn open_script(path: &Path) -> Result<Self, InputError> {
        let file = File::open(path).map_err(InputError::Io)?;
        Ok(Self::script(BufReader::new(file)))
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn mode(&self) -> InputMode {
        self.mode
    }

    fn next_command(&mut self, out: &mut dyn Write) -> Result<String, InputError> {
        self.pending = None;
        loop {
            self.prompt(out, COMMAND_PROMPT)?;
            let line = self.read_raw()?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            self.pending = (!rest.is_empty()).then(|| rest.to_owned());
            return Ok(name.to_owned());
        }
    }

    fn read_line(&mut self, out: &mut dyn Write, prompt: &str) -> Result<String, InputError> {
        if let Some(value) = self.pending.take() {
            return Ok(value);
        }
        self.prompt(out, prompt)?;
        self.read_raw()
    }
}
