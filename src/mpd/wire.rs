//! Line-oriented reader and writer over an async byte stream.
//!
//! MPD frames everything with `\n`. The reader strips the terminator (and a
//! stray `\r`, which some proxies insert) and decodes lossily, so a tag with
//! bad UTF-8 never stops a reply short of its terminator. The writer appends
//! the terminator and flushes immediately.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

/// Buffered line reader.
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// Read the next line without its terminator.
    ///
    /// Returns `Ok(None)` on a clean end of stream. A final line that was
    /// not terminated before EOF is still returned. Invalid UTF-8 is replaced
    /// with U+FFFD rather than reported.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let n = self.inner.read_until(b'\n', &mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }

        let line: &[u8] = &self.buf;
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }
}

/// Buffered line writer.
pub struct LineWriter<W> {
    inner: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
        }
    }

    /// Write `text` followed by `\n` and flush.
    pub async fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_all(text.as_bytes()).await?;
        self.inner.write_all(b"\n").await?;
        self.inner.flush().await
    }
}
