//! Minimal WebSocket client helpers for subscribing to an instance's stream.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::types::MetricSample;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_WS: &str = "ws://127.0.0.1:3001/";

/// `base` with `instanceId` set, replacing any existing value.
pub fn subscribe_url(base: &str, instance_id: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "instanceId")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut q = url.query_pairs_mut();
        q.clear();
        for (k, v) in &kept {
            q.append_pair(k, v);
        }
        q.append_pair("instanceId", instance_id);
    }
    Ok(url)
}

// Connect to the agent and return the WS stream
pub async fn connect(url: &Url) -> anyhow::Result<WsStream> {
    let (ws, _) = connect_async(url.as_str()).await?;
    Ok(ws)
}

/// Next decodable sample, skipping malformed and non-text frames.
/// `None` once the server closes or the transport fails.
pub async fn next_sample(ws: &mut WsStream) -> Option<MetricSample> {
    loop {
        match ws.next().await? {
            Ok(Message::Text(json)) => {
                if let Ok(s) = serde_json::from_str::<MetricSample>(&json) {
                    return Some(s);
                }
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}
