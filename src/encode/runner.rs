use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::foundation::error::{PcboothError, PcboothResult};

/// One blocking encoder invocation: program, arguments and the file it writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeCommand {
    pub program: String,
    pub args: Vec<String>,
    pub output: PathBuf,
}

impl EncodeCommand {
    pub fn new(program: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output: output.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Value following `flag`, if present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl std::fmt::Display for EncodeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes encoder commands. Returning an error fails that sequencing step only.
pub trait EncodeRunner {
    fn run(&mut self, command: &EncodeCommand) -> PcboothResult<()>;
}

/// Keeps every command instead of running it. Clones share one log.
#[derive(Clone, Debug, Default)]
pub struct RecordingRunner {
    log: Rc<RefCell<Vec<EncodeCommand>>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail commands whose output path contains `pattern`; they are still recorded.
    pub fn failing_on(mut self, pattern: impl Into<String>) -> Self {
        self.fail_on = Some(pattern.into());
        self
    }

    pub fn commands(&self) -> Vec<EncodeCommand> {
        self.log.borrow().clone()
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.log.borrow().iter().map(|c| c.output.clone()).collect()
    }
}

impl EncodeRunner for RecordingRunner {
    fn run(&mut self, command: &EncodeCommand) -> PcboothResult<()> {
        self.log.borrow_mut().push(command.clone());
        match &self.fail_on {
            Some(p) if command.output.to_string_lossy().contains(p.as_str()) => Err(
                PcboothError::encode(format!("simulated failure for {}", command.output.display())),
            ),
            _ => Ok(()),
        }
    }
}
