use common::messages::Response;
use hashbrown::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::error;
use warp::ws::Message;

#[derive(Error, Debug)]
#[error("Error sending message")]
pub struct SendError;

// Open WebSocket views of the session, keyed by connection id
pub type Clients = Arc<RwLock<HashMap<String, Client>>>;

#[derive(Debug, Clone)]
pub struct Sender(pub mpsc::UnboundedSender<Result<Message, warp::Error>>);

#[derive(Debug, Clone)]
pub struct Client {
    pub sender: Sender,
}

pub trait SendMsg {
    fn send(&self, msg: &str) -> Result<(), SendError>;
}

impl SendMsg for Sender {
    fn send(&self, msg: &str) -> Result<(), SendError> {
        self.0.send(Ok(Message::text(msg))).map_err(|_| SendError)
    }
}

fn encode(response: &Response) -> Option<String> {
    match serde_json::to_string(response) {
        Ok(text) => Some(text),
        Err(err) => {
            error!("failed to serialize response {:?}: {}", response, err);
            None
        }
    }
}

// An unbounded send only fails once the socket has closed, so there's nothing to
// retry; the connection loop drops the client shortly after.
fn deliver(id: &str, client: &impl SendMsg, text: &str) {
    if let Err(err) = client.send(text) {
        error!("failed to send to client {}: {}", id, err);
    }
}

/// Pushes a response to every open view of the session.
pub async fn broadcast(clients: &Clients, response: &Response) {
    let Some(text) = encode(response) else {
        return;
    };
    for (id, client) in clients.read().await.iter() {
        deliver(id, &client.sender, &text);
    }
}

pub async fn send_to(clients: &Clients, id: &str, response: &Response) {
    let Some(text) = encode(response) else {
        return;
    };
    match clients.read().await.get(id) {
        Some(client) => deliver(id, &client.sender, &text),
        None => error!("client {} is not connected", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_every_client() {
        let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        clients.write().await.insert("a".to_string(), Client { sender: Sender(tx1) });
        clients.write().await.insert("b".to_string(), Client { sender: Sender(tx2) });

        broadcast(&clients, &Response::Error("hello".to_string())).await;

        for rx in [&mut rx1, &mut rx2] {
            let msg = rx.recv().await.unwrap().unwrap();
            let response: Response = serde_json::from_str(msg.to_str().unwrap()).unwrap();
            assert_eq!(response, Response::Error("hello".to_string()));
        }
    }

    #[tokio::test]
    async fn test_send_to_one_client() {
        let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        clients.write().await.insert("a".to_string(), Client { sender: Sender(tx1) });
        clients.write().await.insert("b".to_string(), Client { sender: Sender(tx2) });

        send_to(&clients, "b", &Response::Error("only b".to_string())).await;

        assert!(rx2.recv().await.is_some());
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_socket() {
        let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        let (open_tx, mut open_rx) = mpsc::unbounded_channel();
        drop(closed_rx);
        clients.write().await.insert("closed".to_string(), Client { sender: Sender(closed_tx) });
        clients.write().await.insert("open".to_string(), Client { sender: Sender(open_tx) });

        broadcast(&clients, &Response::Error("still here".to_string())).await;

        let msg = open_rx.recv().await.unwrap().unwrap();
        let response: Response = serde_json::from_str(msg.to_str().unwrap()).unwrap();
        assert_eq!(response, Response::Error("still here".to_string()));
    }
}
