use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::debug;

use crate::channel::{DeviceChannel, InboundEvent, OutboundMessage};
use crate::errors::ChannelError;

/// A device channel speaking newline-delimited JSON, one event or reply per line.
pub struct JsonLinesChannel<R, W> {
    reader: Mutex<BufReader<R>>,
    writer: Mutex<W>,
}

impl JsonLinesChannel<Stdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> JsonLinesChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(BufReader::new(reader)),
            writer: Mutex::new(writer),
        }
    }
}

impl<R, W> DeviceChannel for JsonLinesChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn next_event(&self) -> Result<Option<InboundEvent>, ChannelError> {
        let mut reader = self.reader.lock().await;
        let mut line = String::new();

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| ChannelError::Receive {
                    source: Box::new(e),
                })?;

            if read == 0 {
                debug!("Device channel reached end of input");
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| ChannelError::MalformedEvent {
                    reason: e.to_string(),
                });
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), ChannelError> {
        let mut line = serde_json::to_vec(message).map_err(|e| ChannelError::Send {
            source: Box::new(e),
        })?;
        line.push(b'\n');

        // One write per reply keeps concurrent replies from interleaving.
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await.map_err(send_error)?;
        writer.flush().await.map_err(send_error)
    }
}

/// A broken pipe means the device hung up.
fn send_error(err: io::Error) -> ChannelError {
    if err.kind() == io::ErrorKind::BrokenPipe {
        ChannelError::Closed
    } else {
        ChannelError::Send {
            source: Box::new(err),
        }
    }
}
