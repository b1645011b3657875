//! Mock command runner for testing.

use crate::error::{Error, Result};
use crate::runner::{CommandOutput, CommandRunner};
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

/// A recorded call to [`CommandRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Scripted {
    Exit(i32),
    Missing,
}

/// A mock command runner for testing.
///
/// This allows testing code that depends on [`CommandRunner`] without
/// touching the real display. Every call is recorded; programs succeed
/// unless scripted otherwise.
///
/// # Example
///
/// ```
/// use pastmidnight_core::{CommandRunner, MockRunner};
///
/// let mock = MockRunner::new();
/// mock.fail_with("xrandr", 1);
/// let output = mock.run("xrandr", &["--version".to_string()]).unwrap();
/// assert!(!output.success());
/// assert_eq!(mock.invocations().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRunner {
    calls: Mutex<Vec<Invocation>>,
    scripted: Mutex<HashMap<String, Scripted>>,
}

impl MockRunner {
    /// Create a mock where every program exits successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` exit with `code`.
    pub fn fail_with(&self, program: &str, code: i32) {
        self.scripted
            .lock()
            .unwrap()
            .insert(program.to_string(), Scripted::Exit(code));
    }

    /// Make `program` fail to launch, as if it were not installed.
    pub fn missing(&self, program: &str) {
        self.scripted
            .lock()
            .unwrap()
            .insert(program.to_string(), Scripted::Missing);
    }

    /// All calls so far, oldest first.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Argument lists of every call to `program`, oldest first.
    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.program == program)
            .map(|call| call.args.clone())
            .collect()
    }

    /// Forget recorded calls, keeping the script.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        });

        match self.scripted.lock().unwrap().get(program).copied() {
            None => Ok(CommandOutput {
                status: Some(0),
                stderr: String::new(),
            }),
            Some(Scripted::Exit(code)) => Ok(CommandOutput {
                status: Some(code),
                stderr: format!("{} failed", program),
            }),
            Some(Scripted::Missing) => Err(Error::CommandLaunch {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
            }),
        }
    }
}
