//! WebSocket Handlers
//!
//! - `/ws/process`: 一次请求一个动作，转发单元消息，终止消息后关闭
//! - `/ws/status`: 推送可用性快照

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::{ProgressRelay, UnitMessage};
use crate::infrastructure::http::dto::WsProcessRequest;
use crate::infrastructure::http::state::AppState;

/// 处理动作 WebSocket
pub async fn process_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_process_socket(socket, state))
}

/// 可用性 WebSocket
pub async fn status_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_status_socket(socket, state))
}

async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    match serde_json::to_string(value) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WebSocket message");
            Ok(())
        }
    }
}

async fn handle_process_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 等待客户端的请求
    let text = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => break text,
            Some(Ok(Message::Close(_))) | None => return,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "WebSocket error before request");
                return;
            }
            Some(Ok(_)) => continue,
        }
    };

    let request: WsProcessRequest = match serde_json::from_str(&text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid WebSocket request");
            let message = UnitMessage::error(format!("Invalid request: {}", e));
            let _ = send_json(&mut sender, &message).await;
            let _ = sender.close().await;
            return;
        }
    };

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let relay = ProgressRelay::new(progress_tx);
    let action = async move {
        match request {
            WsProcessRequest::Process(req) => {
                state
                    .process_image_handler
                    .handle(req.into(), &relay)
                    .await
            }
            WsProcessRequest::Translate(req) => {
                state
                    .translate_text_handler
                    .handle(req.into(), &relay)
                    .await
            }
        }
    };
    tokio::pin!(action);

    // 客户端断开时丢弃动作，正在运行的单元随之终止
    let result = loop {
        tokio::select! {
            Some(progress) = progress_rx.recv() => {
                if let Err(e) = send_json(&mut sender, &progress).await {
                    tracing::debug!(error = %e, "Client gone, cancelling action");
                    return;
                }
            }
            result = &mut action => break result,
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                    tracing::info!("WebSocket closed by client, cancelling action");
                    return;
                }
                Some(Ok(_)) => {}
            },
        }
    };

    while let Ok(progress) = progress_rx.try_recv() {
        let _ = send_json(&mut sender, &progress).await;
    }

    let terminal = match result {
        Ok(result) => UnitMessage::Success(result),
        Err(e) => UnitMessage::error(e.to_string()),
    };
    if let Err(e) = send_json(&mut sender, &terminal).await {
        tracing::debug!(error = %e, "Failed to send terminal message");
    }
    let _ = sender.close().await;
}

async fn handle_status_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut status_rx = state.availability.subscribe();

    tracing::info!("Status WebSocket connected");

    // 快照转发任务
    let mut forward_task = tokio::spawn(async move {
        loop {
            let snapshot = status_rx.borrow_and_update().clone();
            if let Err(e) = send_json(&mut sender, &snapshot).await {
                tracing::debug!(error = %e, "Failed to send status snapshot");
                break;
            }
            if status_rx.changed().await.is_err() {
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Status WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Status WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut forward_task => receive_task.abort(),
        _ = &mut receive_task => forward_task.abort(),
    }

    tracing::info!("Status WebSocket disconnected");
}
