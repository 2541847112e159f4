use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("input stream closed before the order was complete")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One line in, one bot message out.
#[async_trait]
pub trait Terminal: Send {
    async fn read_line(&mut self) -> Result<String, TerminalError>;
    async fn display(&mut self, message: &str) -> Result<(), TerminalError>;
}

pub struct StdioTerminal {
    reader: BufReader<Stdin>,
    writer: Stdout,
    bot_prefix: String,
    user_prompt: String,
}

impl StdioTerminal {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: tokio::io::stdout(),
            bot_prefix: "Bot:".to_string(),
            user_prompt: "You: ".to_string(),
        }
    }
}

impl Default for StdioTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Terminal for StdioTerminal {
    async fn read_line(&mut self) -> Result<String, TerminalError> {
        self.writer.write_all(self.user_prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(TerminalError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn display(&mut self, message: &str) -> Result<(), TerminalError> {
        let rendered = format!("\n{} {message}\n\n", self.bot_prefix);
        self.writer.write_all(rendered.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
