//! Line-oriented terminal chat.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

use super::LoopState;
use crate::agent::{ChatService, Session};
use crate::error::ParleyError;

pub struct Repl<'a> {
    service: &'a ChatService,
    greeting: &'a str,
    state: LoopState,
}

impl<'a> Repl<'a> {
    pub fn new(service: &'a ChatService, greeting: &'a str) -> Self {
        Self {
            service,
            greeting,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Read messages until `exit`, `quit` or end of input.
    ///
    /// Turn failures are printed and the loop carries on; only I/O errors on
    /// the terminal itself end it early.
    pub async fn run<R, W>(
        &mut self,
        session: &mut Session,
        reader: R,
        writer: &mut W,
    ) -> Result<(), ParleyError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer
            .write_all(format!("assistant: {}\n", self.greeting).as_bytes())
            .await?;

        let mut lines = reader.lines();
        loop {
            writer.write_all(b"> ").await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                break;
            }

            self.state = LoopState::Processing;
            let rendered = match self.service.respond(session, input, None).await {
                Ok(reply) => format!("assistant: {reply}\n"),
                Err(ParleyError::MissingCredential { hint, .. }) => format!("{hint}\n"),
                Err(e) => {
                    warn!(error = %e, "Turn failed");
                    format!("error: {e}\n")
                }
            };
            writer.write_all(rendered.as_bytes()).await?;
            self.state = LoopState::Idle;
        }

        writer.flush().await?;
        Ok(())
    }
}
