//! Live transaction feed over WebSocket.
//!
//! Each connection is one hub subscriber. Outgoing frames carry every
//! transaction ingested after the connection registered; incoming text frames
//! are treated as new transactions and go through the normal ingestion path.

use crate::api::handlers::AppState;
use crate::api::models::{TransactionRequest, TransactionView};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

pub(crate) async fn transactions_ws(State(service): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_subscriber(service, socket))
}

async fn serve_subscriber(service: AppState, socket: WebSocket) {
    let subscription = match service.hub().register().await {
        Ok(subscription) => subscription,
        Err(err) => {
            warn!(error = %err, "rejecting websocket client");
            return;
        }
    };
    let subscriber = subscription.id;
    let mut outbox = subscription.receiver;
    info!(subscriber, "websocket client connected");

    let (mut sink, mut stream) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(transaction) = outbox.recv().await {
            let payload = match serde_json::to_string(&TransactionView::from(transaction.as_ref())) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(transaction_id = %transaction.id, error = %err, "failed to encode live update");
                    continue;
                }
            };
            if let Err(err) = sink.send(Message::Text(payload.into())).await {
                debug!(subscriber, error = %err, "websocket write failed");
                break;
            }
        }
        let _ = sink.close().await;
    });

    let reader_service = service.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => ingest_frame(&reader_service, text.as_str()).await,
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    debug!(subscriber, error = %err, "websocket read failed");
                    break;
                }
            }
        }
    });

    // Whichever half finishes first takes the other one down with it.
    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    service.hub().unregister(subscriber).await;
    info!(subscriber, "websocket client disconnected");
}

/// Malformed or rejected frames are logged and skipped; the connection stays open.
async fn ingest_frame(service: &AppState, text: &str) {
    let request: TransactionRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "skipping malformed websocket frame");
            return;
        }
    };
    if let Err(err) = service.add_transaction(request.into()).await {
        warn!(error = %err, "websocket transaction rejected");
    }
}
