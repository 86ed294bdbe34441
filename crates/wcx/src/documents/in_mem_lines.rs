//! 🧪 In-memory lines. No network, no disk, no heartbeat. Built for tests.
//!
//! Can also be told to fail after its last line, so the "decode error mid-stream"
//! path can be exercised without hand-crafting a broken file.

use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::LineSource;

#[derive(Debug, Default)]
pub(crate) struct InMemoryLines {
    lines: VecDeque<String>,
    trailing_error: Option<String>,
}

impl InMemoryLines {
    pub(crate) fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            trailing_error: None,
        }
    }

    /// 💀 After the last line, hand out this error once instead of end-of-document.
    pub(crate) fn failing_with(mut self, error: impl Into<String>) -> Self {
        self.trailing_error = Some(error.into());
        self
    }
}

#[async_trait]
impl LineSource for InMemoryLines {
    async fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }
        match self.trailing_error.take() {
            Some(error) => Err(anyhow!(error)),
            None => Ok(None),
        }
    }
}
