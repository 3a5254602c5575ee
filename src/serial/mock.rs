//! Recording serial backend for tests

use super::port::{PortConfig, SerialBackend};
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Log {
    opened: Vec<PathBuf>,
    writes: Vec<Vec<u8>>,
    flushes: usize,
    closes: usize,
}

/// Backend that records every open and write instead of touching hardware
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: Rc<RefCell<Log>>,
    fail_open: Option<io::ErrorKind>,
    fail_write: Option<io::ErrorKind>,
}

impl RecordingBackend {
    pub fn failing_open(kind: io::ErrorKind) -> Self {
        Self {
            fail_open: Some(kind),
            ..Default::default()
        }
    }

    pub fn failing_write(kind: io::ErrorKind) -> Self {
        Self {
            fail_write: Some(kind),
            ..Default::default()
        }
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.log.borrow().opened.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log.borrow().writes.clone()
    }

    pub fn flushes(&self) -> usize {
        self.log.borrow().flushes
    }

    pub fn closes(&self) -> usize {
        self.log.borrow().closes
    }
}

impl SerialBackend for RecordingBackend {
    type Port = RecordingPort;

    fn open(&self, config: &PortConfig) -> io::Result<RecordingPort> {
        if let Some(kind) = self.fail_open {
            return Err(io::Error::from(kind));
        }

        self.log.borrow_mut().opened.push(config.port_path.clone());
        Ok(RecordingPort {
            log: Rc::clone(&self.log),
            fail_write: self.fail_write,
        })
    }
}

pub struct RecordingPort {
    log: Rc<RefCell<Log>>,
    fail_write: Option<io::ErrorKind>,
}

impl Write for RecordingPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.fail_write {
            return Err(io::Error::from(kind));
        }

        self.log.borrow_mut().writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.borrow_mut().flushes += 1;
        Ok(())
    }
}

impl Drop for RecordingPort {
    fn drop(&mut self) {
        self.log.borrow_mut().closes += 1;
    }
}
