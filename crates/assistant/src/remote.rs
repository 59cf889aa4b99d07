//! Remote assistant server client

use crate::{AssistantBackend, AssistantError};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Assistant client that streams a reply from a WebSocket server.
///
/// `ask` blocks on the given runtime handle, so it must be called from a
/// blocking-pool or plain OS thread, never from inside an async task.
pub struct RemoteAssistant {
    server_url: String,
    runtime: Handle,
}

impl RemoteAssistant {
    pub fn new(server_url: String, runtime: Handle) -> Self {
        Self {
            server_url,
            runtime,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn ask_inner(&self, query: &str) -> Result<String, AssistantError> {
        let (ws_stream, _) = connect_async(&self.server_url)
            .await
            .map_err(|e| AssistantError::Connection(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        let request_json = serde_json::to_string(&QueryRequest { query })
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;

        write
            .send(Message::Text(request_json.into()))
            .await
            .map_err(|e| AssistantError::Connection(e.to_string()))?;

        let mut reply = String::new();
        let mut received_any = false;

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    received_any = true;
                    match serde_json::from_str::<ReplyFrame>(&text) {
                        Ok(frame) => {
                            if let Some(error) = frame.error {
                                return Err(AssistantError::Query(error));
                            }
                            reply.push_str(&frame.content);
                            if frame.done {
                                break;
                            }
                        }
                        // Servers that stream plain text
                        Err(_) => reply.push_str(&text),
                    }
                }
                Ok(Message::Binary(_)) => {
                    return Err(AssistantError::InvalidResponse(
                        "unexpected binary frame".into(),
                    ));
                }
                Ok(Message::Close(_)) => break,
                Err(e) => return Err(AssistantError::Connection(e.to_string())),
                _ => {}
            }
        }

        if !received_any {
            return Err(AssistantError::InvalidResponse("No reply received".into()));
        }

        tracing::debug!("Assistant replied with {} bytes", reply.len());
        Ok(reply)
    }
}

impl AssistantBackend for RemoteAssistant {
    fn ask(&self, query: &str) -> Result<String, AssistantError> {
        self.runtime.block_on(self.ask_inner(query))
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct ReplyFrame {
    #[serde(default)]
    content: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}
