use crate::{
    client::{self, Clients},
    game::SharedGame,
    ws,
};
use common::messages::Response;
use warp::{http::StatusCode, reply::json, Rejection, Reply};

type Result<T> = std::result::Result<T, Rejection>;

pub async fn state_handler(game: SharedGame) -> Result<impl Reply> {
    let state = game.read().await.state();
    Ok(json(&state))
}

pub async fn board_handler(game: SharedGame) -> Result<impl Reply> {
    let board = game.read().await.board();
    Ok(json(&board))
}

pub async fn roll_handler(game: SharedGame, clients: Clients) -> Result<impl Reply> {
    // Hold the game until every view has the update so broadcasts stay in order
    let mut game = game.write().await;
    let response = game.roll();
    client::broadcast(&clients, &Response::Roll(response.clone())).await;
    Ok(json(&response))
}

pub async fn reset_handler(game: SharedGame, clients: Clients) -> Result<impl Reply> {
    let mut game = game.write().await;
    let state = game.reset();
    client::broadcast(&clients, &Response::State(state.clone())).await;
    Ok(json(&state))
}

pub async fn ws_handler(
    ws: warp::ws::Ws,
    game: SharedGame,
    clients: Clients,
) -> Result<impl Reply> {
    Ok(ws.on_upgrade(move |socket| ws::client_connection(socket, clients, game)))
}

pub async fn health_handler() -> Result<impl Reply> {
    Ok(StatusCode::OK)
}
