//! Best-effort WebSocket relay for roster snapshots.
//!
//! Outbound: JSON text frames, queued only while Open and written by a
//! background task, so `send` never waits on the peer. Inbound: every frame
//! received while Open is appended verbatim to an unbounded log.
//!
//! States: Connecting -> Open -> Closed, or Connecting -> Closed. Closed is
//! terminal; a new channel must be created to reconnect.

use crate::error::TrackerResult;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `close` lets the writer drain before aborting it.
pub const CLOSE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Queued for the writer.
    Sent,
    /// Channel not open; payload dropped.
    Skipped,
    /// Encoding failed or the writer is gone; payload dropped.
    Failed,
}

pub struct RelayChannel {
    endpoint: String,
    state:    ChannelState,
    outbound: Option<UnboundedSender<Message>>,
    reader:   Option<SplitStream<WsStream>>,
    writer:   Option<JoinHandle<()>>,
    received: Vec<String>,
    disposed: bool,
}

impl RelayChannel {
    /// Connect to `endpoint`. Never fails: a refused or broken handshake
    /// yields a Closed channel and an error log line.
    pub async fn connect(endpoint: impl Into<String>) -> Self {
        let mut channel = Self::with_state(endpoint.into(), ChannelState::Connecting);

        match open(&channel.endpoint).await {
            Ok(stream) => {
                log::info!("relay connected: {}", channel.endpoint);
                let (sink, reader) = stream.split();
                let (tx, rx) = unbounded_channel();
                channel.writer = Some(tokio::spawn(write_frames(sink, rx)));
                channel.outbound = Some(tx);
                channel.reader = Some(reader);
                channel.state = ChannelState::Open;
            }
            Err(e) => {
                log::error!("relay connection to {} failed: {e}", channel.endpoint);
                channel.state = ChannelState::Closed;
            }
        }
        channel
    }

    /// A channel that never connects. Sends are skipped, `recv` pends.
    pub fn offline(endpoint: impl Into<String>) -> Self {
        Self::with_state(endpoint.into(), ChannelState::Closed)
    }

    fn with_state(endpoint: String, state: ChannelState) -> Self {
        Self {
            endpoint,
            state,
            outbound: None,
            reader: None,
            writer: None,
            received: Vec::new(),
            disposed: false,
        }
    }

    /// Serialize `payload` to JSON and queue it as one text frame. Returns
    /// immediately; nothing waits on the peer. Dropped with a warning
    /// unless the channel is Open.
    pub fn send<T: Serialize + ?Sized>(&mut self, payload: &T) -> SendOutcome {
        if self.state() != ChannelState::Open {
            log::warn!("relay not connected, cannot send payload");
            self.settle_state();
            return SendOutcome::Skipped;
        }

        let text = match encode(payload) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("relay payload dropped: {e}");
                return SendOutcome::Failed;
            }
        };

        let len = text.len();
        let queued = self
            .outbound
            .as_ref()
            .map(|tx| tx.send(Message::Text(text.into())).is_ok())
            .unwrap_or(false);

        if queued {
            log::debug!("relay queued {len} bytes");
            SendOutcome::Sent
        } else {
            log::warn!("relay writer gone, closing");
            self.mark_closed();
            SendOutcome::Failed
        }
    }

    /// Wait for the next inbound message, append it to the log, and return
    /// it. Returns None when the peer closes or the transport fails.
    /// Never resolves unless Open. Cancel-safe.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            let reader = match (self.state, self.reader.as_mut()) {
                (ChannelState::Open, Some(reader)) => reader,
                _ => return std::future::pending().await,
            };

            let text = match reader.next().await {
                Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                Some(Ok(Message::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                Some(Ok(Message::Close(frame))) => {
                    log::info!("relay closed by peer: {frame:?}");
                    self.mark_closed();
                    return None;
                }
                // ping/pong are answered by the protocol layer
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    log::warn!("relay receive failed, closing: {e}");
                    self.mark_closed();
                    return None;
                }
                None => {
                    log::info!("relay stream ended");
                    self.mark_closed();
                    return None;
                }
            };

            self.received.push(text.clone());
            return Some(text);
        }
    }

    /// Release the connection. Only the first call has any effect. A writer
    /// still blocked on a stalled peer after `CLOSE_GRACE` is aborted.
    pub async fn close(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        if let Some(tx) = self.outbound.take() {
            let _ = tx.send(Message::Close(None));
        }
        self.reader = None;

        if let Some(mut writer) = self.writer.take() {
            if tokio::time::timeout(CLOSE_GRACE, &mut writer).await.is_err() {
                log::debug!("relay writer stalled, aborting");
                writer.abort();
            }
            log::info!("relay closed: {}", self.endpoint);
        }
        self.state = ChannelState::Closed;
    }

    /// Drops both halves. The writer finishes queued frames, then exits.
    fn mark_closed(&mut self) {
        self.state = ChannelState::Closed;
        self.outbound = None;
        self.reader = None;
    }

    /// Records a dead writer as Closed.
    fn settle_state(&mut self) {
        if self.state == ChannelState::Open {
            self.mark_closed();
        }
    }

    /// Current state. An Open channel whose writer has died reports Closed.
    pub fn state(&self) -> ChannelState {
        match (self.state, self.outbound.as_ref()) {
            (ChannelState::Open, Some(tx)) if !tx.is_closed() => ChannelState::Open,
            (ChannelState::Open, _) => ChannelState::Closed,
            (state, _) => state,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Inbound messages in arrival order.
    pub fn received(&self) -> &[String] {
        &self.received
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

async fn open(endpoint: &str) -> TrackerResult<WsStream> {
    let (stream, _response) = connect_async(endpoint).await?;
    Ok(stream)
}

fn encode<T: Serialize + ?Sized>(payload: &T) -> TrackerResult<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Owns the socket's write half. Exits when every sender is dropped or a
/// write fails; either way the channel then reads as Closed.
async fn write_frames(mut sink: SplitSink<WsStream, Message>, mut frames: UnboundedReceiver<Message>) {
    while let Some(frame) = frames.recv().await {
        let closing = matches!(frame, Message::Close(_));
        if let Err(e) = sink.send(frame).await {
            log::warn!("relay write failed, closing: {e}");
            return;
        }
        if closing {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use std::collections::BTreeMap;

    #[test]
    fn non_string_map_keys_fail_to_encode() {
        let mut payload = BTreeMap::new();
        payload.insert((1u8, 2u8), "pair");
        let err = encode(&payload).unwrap_err();
        assert!(matches!(err, TrackerError::Serialization(_)));
        assert!(err.to_string().starts_with("Cannot serialize relay payload"));
    }

    #[tokio::test]
    async fn refused_handshake_maps_to_relay_error() {
        let err = open("ws://127.0.0.1:9").await.unwrap_err();
        assert!(matches!(err, TrackerError::Relay(_)));
    }

    #[tokio::test]
    async fn offline_channel_skips_sends() {
        let mut channel = RelayChannel::offline("ws://127.0.0.1:9");
        assert_eq!(channel.state(), ChannelState::Closed);
        assert_eq!(channel.send(&[1, 2, 3]), SendOutcome::Skipped);
        assert!(channel.received().is_empty());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut channel = RelayChannel::offline("ws://127.0.0.1:9");
        channel.close().await;
        channel.close().await;
        assert!(channel.is_disposed());
        assert_eq!(channel.state(), ChannelState::Closed);
    }
}
