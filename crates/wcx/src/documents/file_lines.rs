//! 📂 File lines: a tokio `BufReader` over a local file, read one `read_line` at a time.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::trace;

use super::{LineSource, strip_line_ending};

#[derive(Debug)]
pub(crate) struct FileLines {
    path: String,
    reader: BufReader<File>,
    line: String,
    exhausted: bool,
}

impl FileLines {
    pub(crate) async fn open(path: &str) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("💀 The door to '{path}' would not budge."))?;
        Ok(Self {
            path: path.to_string(),
            reader: BufReader::new(file),
            line: String::new(),
            exhausted: false,
        })
    }
}

#[async_trait]
impl LineSource for FileLines {
    async fn next_line(&mut self) -> Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }
        self.line.clear();
        // -- 📖 0 bytes = EOF. Invalid UTF-8 comes back as an io::Error, which is what we want.
        let bytes_read = self
            .reader
            .read_line(&mut self.line)
            .await
            .with_context(|| format!("💀 Failed to read the next line of '{}'", self.path))?;
        if bytes_read == 0 {
            trace!("📂 reached the end of {}", self.path);
            self.exhausted = true;
            return Ok(None);
        }
        let mut line = std::mem::take(&mut self.line);
        strip_line_ending(&mut line);
        Ok(Some(line))
    }
}
