//! Frame transport seam. The stream client only needs "open a URL, get a
//! stream of text frames"; tests swap in scripted transports.

use std::future::Future;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::error::LinkError;

/// Text frames in arrival order. Ends when the channel closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, LinkError>> + Send>>;

pub trait Transport: Send + Sync + 'static {
    fn open(&self, url: &str) -> impl Future<Output = Result<FrameStream, LinkError>> + Send;
}

/// WebSocket transport. Non-text frames are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

impl Transport for WsTransport {
    async fn open(&self, url: &str) -> Result<FrameStream, LinkError> {
        let (ws, _response) = tokio_tungstenite::connect_async(url).await?;
        let frames = ws.filter_map(|msg| async move {
            match msg {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(_) => None,
                Err(e) => Some(Err(LinkError::from(e))),
            }
        });
        Ok(Box::pin(frames))
    }
}
