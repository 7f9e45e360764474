use auc_core::push_wire::{self, decode_push_message, PushEvent, Routed};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use url::Url;

/// Fixed reconnection delay. No backoff growth and no retry cap: the loop
/// tries again every five seconds for the lifetime of the session.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// One message from the push task to the app loop. The generation counts
/// connection attempts; the app drops signals older than the newest one it
/// has applied, so a superseded connection can never flip state backwards.
#[derive(Debug)]
pub struct PushSignal {
    pub generation: u64,
    pub kind: PushSignalKind,
}

#[derive(Debug)]
pub enum PushSignalKind {
    Opened,
    Closed,
    Event(PushEvent),
}

/// Push-channel lifecycle task. Connects, subscribes, forwards decoded
/// events, and reconnects after [`RECONNECT_DELAY`] on any close or error.
/// Returns only when the app side of the channel is gone.
pub async fn push_loop(endpoint: Url, tx: mpsc::Sender<PushSignal>) {
    let mut generation: u64 = 0;
    loop {
        generation += 1;
        let (mut ws, _) = match connect_async(endpoint.as_str()).await {
            Ok(value) => value,
            Err(err) => {
                warn!("push_connect_error: {err}");
                if emit(&tx, generation, PushSignalKind::Closed).await.is_err() {
                    return;
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        if emit(&tx, generation, PushSignalKind::Opened).await.is_err() {
            return;
        }
        for kind in push_wire::SUBSCRIBED_KINDS {
            if ws
                .send(Message::Text(push_wire::subscribe_frame(kind)))
                .await
                .is_err()
            {
                warn!("push_subscribe_error: {kind}");
                break;
            }
        }

        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(text)) => match decode_push_message(&text) {
                    Ok(Routed::Event(event)) => {
                        if emit(&tx, generation, PushSignalKind::Event(event))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Ok(Routed::Unrecognized { kind }) => {
                        debug!("push_unrecognized_kind: {kind}");
                    }
                    Err(err) => {
                        // One bad frame never takes the channel down.
                        warn!("push_decode_error: {err}");
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!("push_read_error: {err}");
                    break;
                }
            }
        }

        let _ = ws.close(None).await;
        if emit(&tx, generation, PushSignalKind::Closed).await.is_err() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn emit(
    tx: &mpsc::Sender<PushSignal>,
    generation: u64,
    kind: PushSignalKind,
) -> Result<(), ()> {
    tx.send(PushSignal { generation, kind }).await.map_err(|_| ())
}
