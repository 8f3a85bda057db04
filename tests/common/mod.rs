//! Shared utilities for integration tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use dynlog::{StackFrame, Throwable};

/// In-memory sink that can be inspected after the context has written to it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> Box<dyn Write + Send> {
        Box::new(self.clone())
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Parse each line as one JSON record.
    #[allow(dead_code)]
    pub fn json_records(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Error with `frames` synthetic frames and one cause with three frames.
#[allow(dead_code)]
pub fn deep_throwable(frames: usize) -> Throwable {
    let own = (0..frames).map(|i| {
        StackFrame::new(format!("app.module{}.Component", i % 7), format!("step{i}")).at("Component.rs", i as u32 + 1)
    });
    Throwable::new("app.RequestFailed", "request failed")
        .with_frames(own)
        .with_cause(
            Throwable::new("app.db.PoolExhausted", "no connection available").with_frames([
                StackFrame::new("app.db.Pool", "acquire").at("pool.rs", 10),
                StackFrame::new("app.db.Pool", "checkout").at("pool.rs", 20),
                StackFrame::new("app.db.Repo", "load").at("repo.rs", 30),
            ]),
        )
}
