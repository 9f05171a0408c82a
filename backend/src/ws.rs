use crate::client::{self, Client, Clients, Sender};
use crate::game::SharedGame;
use common::messages::Response;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info, warn};
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

pub async fn client_connection(ws: WebSocket, clients: Clients, game: SharedGame) {
    let id = Uuid::new_v4().as_simple().to_string();
    let (client_ws_sender, mut client_ws_rcv) = ws.split();
    let (client_sender, client_rcv) = mpsc::unbounded_channel();

    let client_rcv = UnboundedReceiverStream::new(client_rcv);
    tokio::task::spawn(client_rcv.forward(client_ws_sender).map(|result| {
        if let Err(e) = result {
            error!("error sending websocket msg: {}", e);
        }
    }));

    clients.write().await.insert(
        id.clone(),
        Client {
            sender: Sender(client_sender),
        },
    );

    info!("{} connected", id);

    while let Some(result) = client_ws_rcv.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                error!("error receiving ws message for id: {}): {}", id, e);
                break;
            }
        };
        client_msg(&id, msg, &clients, &game).await;
    }

    clients.write().await.remove(&id);
    info!("{} disconnected", id);
}

#[tracing::instrument(skip(clients, game))]
async fn client_msg(id: &str, msg: Message, clients: &Clients, game: &SharedGame) {
    if msg.is_binary() {
        warn!("binary frame from {} ignored", id);
        let reply = Response::Error("expected a text command".to_string());
        client::send_to(clients, id, &reply).await;
        return;
    }
    // close, ping and pong frames
    let command = match msg.to_str() {
        Ok(v) => v.trim(),
        Err(_) => return,
    };

    match command {
        "ping" => {}
        // Broadcast before releasing the game so views see updates in order
        "roll" => {
            let mut game = game.write().await;
            let response = game.roll();
            client::broadcast(clients, &Response::Roll(response)).await;
        }
        "reset" => {
            let mut game = game.write().await;
            let state = game.reset();
            client::broadcast(clients, &Response::State(state)).await;
        }
        "state" => {
            let state = game.read().await.state();
            client::send_to(clients, id, &Response::State(state)).await;
        }
        other => {
            warn!("unknown command from {}: {:?}", id, other);
            let reply = Response::Error(format!("unknown command: {}", other));
            client::send_to(clients, id, &reply).await;
        }
    }
}
