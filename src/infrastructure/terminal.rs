//! # Terminal Operator
//!
//! Line-oriented operator I/O over stdin/stdout with colored speaker labels.
//!
//! Stdin is read on its own OS thread and handed over through a channel. A pending
//! read can then be dropped (Ctrl-C at the prompt) without leaving a blocking task
//! behind that would hold up runtime shutdown.

use std::io::{self, BufRead};
use std::thread;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::mpsc;

use crate::domain::traits::Operator;
use crate::strings::messages;

const LINE_BUFFER: usize = 16;

pub type LineReceiver = mpsc::Receiver<io::Result<String>>;

/// Reads `reader` line by line on a dedicated thread. The channel closes at end of
/// input, after the first read error, or once the receiver is dropped.
pub fn spawn_line_reader<R>(reader: R) -> io::Result<LineReceiver>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

pub struct TerminalOperator<W = Stdout> {
    lines: LineReceiver,
    out: W,
}

impl TerminalOperator {
    pub fn stdio() -> Result<Self> {
        let lines = spawn_line_reader(io::BufReader::new(io::stdin()))
            .context("Failed to start the stdin reader")?;
        Ok(Self::new(lines, tokio::io::stdout()))
    }
}

impl<W> TerminalOperator<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(lines: LineReceiver, out: W) -> Self {
        Self { lines, out }
    }

    /// Prints `prompt` and reads one line, without the label used for chat input.
    pub async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.write(prompt, false).await?;
        self.next_line().await
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.recv().await {
            Some(line) => line.map(Some).context("Failed to read operator input"),
            None => Ok(None),
        }
    }

    async fn write(&mut self, text: &str, newline: bool) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        if newline {
            self.out.write_all(b"\n").await?;
        }
        self.out.flush().await.context("Failed to write to terminal")
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W> Operator for TerminalOperator<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn read_line(&mut self) -> Result<Option<String>> {
        self.write(&messages::you_label(), false).await?;
        self.next_line().await
    }

    async fn show_reply(&mut self, text: &str) -> Result<()> {
        self.write(&messages::model_line(text), true).await
    }

    async fn show_tool_call(&mut self, name: &str, args: &str) -> Result<()> {
        self.write(&messages::tool_line(name, args), true).await
    }

    async fn notify(&mut self, text: &str) -> Result<()> {
        self.write(&messages::notice_line(text), true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn operator(input: &'static [u8]) -> TerminalOperator<Vec<u8>> {
        let lines = spawn_line_reader(Cursor::new(input)).unwrap();
        TerminalOperator::new(lines, Vec::new())
    }

    #[tokio::test]
    async fn test_reads_lines_until_eof() {
        let mut op = operator(b"first\r\nsecond\n");

        assert_eq!(op.read_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(op.read_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(op.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_output_is_labelled() {
        let mut op = operator(b"");
        op.show_reply("hello").await.unwrap();
        op.show_tool_call("read_file", "{\"path\":\"/x\"}").await.unwrap();

        let out = String::from_utf8(op.into_writer()).unwrap();
        assert!(out.contains("Claude\u{1b}[0m: hello\n"));
        assert!(out.contains("tool\u{1b}[0m: read_file({\"path\":\"/x\"})\n"));
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let mut op = operator(b"/scan/Film\n");
        assert_eq!(op.ask("Path: ").await.unwrap().as_deref(), Some("/scan/Film"));
    }

    #[tokio::test]
    async fn test_pending_read_can_be_abandoned() {
        // Input that never arrives, like an idle terminal.
        let (tx, rx) = mpsc::channel(1);
        let mut op = TerminalOperator::new(rx, Vec::new());

        let waited = tokio::time::timeout(Duration::from_millis(50), op.read_line()).await;
        assert!(waited.is_err());

        tx.send(Ok("later".to_string())).await.unwrap();
        assert_eq!(op.read_line().await.unwrap().as_deref(), Some("later"));
    }

    #[tokio::test]
    async fn test_read_error_is_reported_once() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(Err(io::Error::new(io::ErrorKind::InvalidData, "bad utf-8")))
            .await
            .unwrap();
        drop(tx);
        let mut op = TerminalOperator::new(rx, Vec::new());

        let err = op.read_line().await.unwrap_err();
        assert!(format!("{:#}", err).contains("bad utf-8"));
        assert_eq!(op.read_line().await.unwrap(), None);
    }
}
