#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use lox_interpreter as lox;

use lox::{Lox, LoxError, Status};

/// In‑memory `print` sink that stays readable after the session takes it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("program output is UTF-8")
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Result of running one source through a fresh session.
pub struct Run {
    pub status: Status,
    pub output: Vec<String>,
    pub errors: Vec<LoxError>,
}

impl Run {
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(LoxError::message).collect()
    }
}

pub fn session() -> (Lox, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let session = Lox::with_output(Box::new(buffer.clone()));
    (session, buffer)
}

pub fn run(source: &str) -> Run {
    let (mut session, buffer) = session();
    let mut errors: Vec<LoxError> = Vec::new();
    let status = session.run_source(source, &mut errors);

    Run {
        status,
        output: buffer.lines(),
        errors,
    }
}

/// Run a program expected to succeed and return its printed lines.
pub fn output_of(source: &str) -> Vec<String> {
    let run = run(source);
    assert_eq!(
        run.status,
        Status::Success,
        "unexpected diagnostics: {:?}",
        run.messages()
    );
    run.output
}
