//! 📡 HTTP lines: a streamed response body, chopped into lines as the bytes arrive.
//!
//! The body is never held in memory as a whole. Chunks land in a small carry-over buffer,
//! `memchr` finds the next `\n`, and a line pops out. Whatever is left after the last
//! newline waits for the next chunk, or becomes the final line at end of stream.
//!
//! ```text
//!   chunk: "alpha\nbe"   chunk: "ta\ngamma"   end
//!           ^^^^^ line          ^^^^ "beta"    "gamma"
//! ```

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::{debug, trace};

use super::{LineSource, strip_line_ending};

pub(crate) struct HttpLines {
    url: String,
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    carry: Vec<u8>,
    exhausted: bool,
}

// 🎭 manual Debug: a boxed stream has no opinion about formatting, and nobody wants to read one
impl std::fmt::Debug for HttpLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLines")
            .field("url", &self.url)
            .field("carry_len", &self.carry.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl HttpLines {
    /// 🚀 GETs `url` and keeps the body as a stream. Non-2xx statuses are an error here.
    pub(crate) async fn open(client: &reqwest::Client, url: &str) -> Result<Self> {
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("💀 GET {url} never made it there and back"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("💀 GET {url} answered with {status}. We asked for lines and got a status code.");
        }
        debug!("📡 {} answered {}, streaming body", url, status);

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();
        Ok(Self {
            url: url.to_string(),
            body,
            carry: Vec::new(),
            exhausted: false,
        })
    }

    fn decode(&self, raw: Vec<u8>) -> Result<String> {
        let mut line = String::from_utf8(raw)
            .with_context(|| format!("💀 A line from {} is not valid UTF-8", self.url))?;
        strip_line_ending(&mut line);
        Ok(line)
    }
}

#[async_trait]
impl LineSource for HttpLines {
    async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(newline_at) = memchr::memchr(b'\n', &self.carry) {
                let raw: Vec<u8> = self.carry.drain(..=newline_at).collect();
                return self.decode(raw).map(Some);
            }
            if self.exhausted {
                if self.carry.is_empty() {
                    return Ok(None);
                }
                // -- 🏁 no trailing newline on the last line. happens. we forgive.
                let raw = std::mem::take(&mut self.carry);
                return self.decode(raw).map(Some);
            }
            match self.body.next().await {
                Some(chunk) => {
                    let chunk = chunk.with_context(|| format!("💀 The body of {} stopped mid-sentence", self.url))?;
                    trace!("📦 {} more bytes from {}", chunk.len(), self.url);
                    self.carry.extend_from_slice(&chunk);
                }
                None => self.exhausted = true,
            }
        }
    }
}
