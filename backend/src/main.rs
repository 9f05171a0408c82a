use crate::client::Clients;
use crate::config::{Config, ConfigError};
use crate::game::{Game, SharedGame};
use common::{Board, GameState, StdDice};
use dotenv::dotenv;
use hashbrown::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use tracing::subscriber::SetGlobalDefaultError;
use warp::{
    http::{header, Method},
    Filter, Rejection, Reply,
};

mod client;
mod config;
mod game;
mod handler;
mod ws;

#[derive(Error, Debug)]
enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("could not install the log subscriber: {0}")]
    Logging(#[from] SetGlobalDefaultError),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (dice, animation_dice) = match config.seed {
        Some(seed) => (StdDice::seeded(seed), StdDice::seeded(seed.wrapping_add(1))),
        None => (StdDice::default(), StdDice::default()),
    };
    let game: SharedGame = Arc::new(RwLock::new(Game::new(
        GameState::new(Board::default(), dice),
        animation_dice,
        config.animation_frames,
    )));
    let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
    info!(?config, "created game session");

    warp::serve(routes(game, clients)).run(config.addr).await;
    Ok(())
}

fn routes(
    game: SharedGame,
    clients: Clients,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health_route = warp::path!("health").and_then(handler::health_handler);

    let state_route = warp::path!("state")
        .and(warp::get())
        .and(with_game(game.clone()))
        .and_then(handler::state_handler);

    let board_route = warp::path!("board")
        .and(warp::get())
        .and(with_game(game.clone()))
        .and_then(handler::board_handler);

    let roll_route = warp::path!("roll")
        .and(warp::post())
        .and(with_game(game.clone()))
        .and(with_clients(clients.clone()))
        .and_then(handler::roll_handler);

    let reset_route = warp::path!("reset")
        .and(warp::post())
        .and(with_game(game.clone()))
        .and(with_clients(clients.clone()))
        .and_then(handler::reset_handler);

    let ws_route = warp::path("ws")
        .and(warp::ws())
        .and(with_game(game))
        .and(with_clients(clients))
        .and_then(handler::ws_handler);

    health_route
        .or(state_route)
        .or(board_route)
        .or(roll_route)
        .or(reset_route)
        .or(ws_route)
        .with(
            warp::cors()
                .allow_methods(&[Method::OPTIONS, Method::GET, Method::POST])
                .allow_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(300)
                .allow_any_origin(),
        )
}

fn with_clients(clients: Clients) -> impl Filter<Extract = (Clients,), Error = Infallible> + Clone {
    warp::any().map(move || clients.clone())
}

fn with_game(game: SharedGame) -> impl Filter<Extract = (SharedGame,), Error = Infallible> + Clone {
    warp::any().map(move || game.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::messages::{BoardResponse, Response, RollResponse, StateResponse};
    use common::{Outcome, PlayerNum, Status};
    use warp::ws::Message;

    fn session() -> (SharedGame, Clients) {
        session_with(Board::default())
    }

    fn session_with(board: Board) -> (SharedGame, Clients) {
        let game = Game::new(
            GameState::new(board, StdDice::seeded(1)),
            StdDice::seeded(2),
            8,
        );
        (
            Arc::new(RwLock::new(game)),
            Arc::new(RwLock::new(HashMap::new())),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let (game, clients) = session();
        let res = warp::test::request()
            .path("/health")
            .reply(&routes(game, clients))
            .await;
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (game, clients) = session();
        let res = warp::test::request()
            .path("/state")
            .reply(&routes(game, clients))
            .await;
        assert_eq!(res.status(), 200);
        let state: StateResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(state.positions[PlayerNum::P1].get(), 1);
        assert_eq!(state.positions[PlayerNum::P2].get(), 1);
        assert_eq!(
            state.status,
            Status::InProgress {
                turn: PlayerNum::P1
            }
        );
        assert_eq!(state.last_roll, None);
        assert_eq!(state.message, common::START_MESSAGE);
    }

    #[tokio::test]
    async fn test_board() {
        let (game, clients) = session();
        let res = warp::test::request()
            .path("/board")
            .reply(&routes(game, clients))
            .await;
        let board: BoardResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(board, Board::default().view());
    }

    #[tokio::test]
    async fn test_roll_then_state() {
        let (game, clients) = session();
        let api = routes(game, clients);
        let res = warp::test::request()
            .method("POST")
            .path("/roll")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 200);
        let roll: RollResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(roll.report.player, PlayerNum::P1);
        assert!(roll.report.roll.is_some());
        assert_eq!(roll.animation.len(), 8);
        // Nobody can win from the first cell in one roll
        assert_eq!(
            roll.state.status,
            Status::InProgress {
                turn: PlayerNum::P2
            }
        );

        let res = warp::test::request().path("/state").reply(&api).await;
        let state: StateResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(state, roll.state);
        assert_eq!(state.turn_counts[PlayerNum::P1], 1);
    }

    #[tokio::test]
    async fn test_roll_requires_post() {
        let (game, clients) = session();
        let res = warp::test::request()
            .path("/roll")
            .reply(&routes(game, clients))
            .await;
        assert_eq!(res.status(), 405);
    }

    #[tokio::test]
    async fn test_reset() {
        let (game, clients) = session();
        let api = routes(game, clients);
        for _ in 0..3 {
            warp::test::request()
                .method("POST")
                .path("/roll")
                .reply(&api)
                .await;
        }
        let res = warp::test::request()
            .method("POST")
            .path("/reset")
            .reply(&api)
            .await;
        let state: StateResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(state.positions[PlayerNum::P1].get(), 1);
        assert_eq!(state.positions[PlayerNum::P2].get(), 1);
        assert_eq!(state.turn_counts[PlayerNum::P1], 0);
        assert_eq!(state.turn_counts[PlayerNum::P2], 0);
        assert_eq!(state.last_roll, None);
        assert_eq!(state.wins, common::Players::both(0));
    }

    #[tokio::test]
    async fn test_reset_keeps_wins() {
        // Every first roll lands on a ladder to the last cell
        let ladders: Vec<(u8, u8)> = (2..=7).map(|from| (from, 100)).collect();
        let (game, clients) = session_with(Board::new(&[], &ladders).unwrap());
        let api = routes(game, clients);

        let res = warp::test::request()
            .method("POST")
            .path("/roll")
            .reply(&api)
            .await;
        let roll: RollResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(roll.report.outcome, Outcome::Won);
        assert_eq!(roll.state.wins[PlayerNum::P1], 1);

        let res = warp::test::request()
            .method("POST")
            .path("/reset")
            .reply(&api)
            .await;
        let state: StateResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(state.wins[PlayerNum::P1], 1);
        assert_eq!(state.wins[PlayerNum::P2], 0);
        assert_eq!(state.positions[PlayerNum::P1].get(), 1);
        assert_eq!(
            state.status,
            Status::InProgress {
                turn: PlayerNum::P1
            }
        );
    }

    async fn recv_response(client: &mut warp::test::WsClient) -> Response {
        let msg = client.recv().await.unwrap();
        serde_json::from_str(msg.to_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_http_rolls_reach_sockets_in_order() {
        let (game, clients) = session();
        let api = routes(game, clients);
        let mut client = warp::test::ws()
            .path("/ws")
            .handshake(api.clone())
            .await
            .unwrap();
        // Once the socket answers it is registered for broadcasts
        client.send_text("state").await;
        recv_response(&mut client).await;

        let api_ref = &api;
        let roll = move || {
            warp::test::request()
                .method("POST")
                .path("/roll")
                .reply(api_ref)
        };
        // Six rolls cannot finish a game from the first cell
        tokio::join!(roll(), roll(), roll(), roll(), roll(), roll());

        let mut last = None;
        for expected in 1..=6 {
            match recv_response(&mut client).await {
                Response::Roll(roll) => {
                    let counts = roll.state.turn_counts;
                    let turns = counts[PlayerNum::P1] + counts[PlayerNum::P2];
                    assert_eq!(turns, expected);
                    last = Some(roll.state);
                }
                other => panic!("expected roll, got {:?}", other),
            }
        }

        let res = warp::test::request().path("/state").reply(&api).await;
        let state: StateResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(Some(state), last);
    }

    #[tokio::test]
    async fn test_ws_binary_frame_is_answered() {
        let (game, clients) = session();
        let api = routes(game, clients);
        let mut client = warp::test::ws().path("/ws").handshake(api).await.unwrap();

        client.send(Message::binary(b"roll".to_vec())).await;
        assert_eq!(
            recv_response(&mut client).await,
            Response::Error("expected a text command".to_string())
        );

        // The socket keeps working and the binary frame did not roll
        client.send_text("state").await;
        match recv_response(&mut client).await {
            Response::State(state) => assert_eq!(state.last_roll, None),
            other => panic!("expected state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ws_commands() {
        let (game, clients) = session();
        let api = routes(game, clients);
        let mut client = warp::test::ws().path("/ws").handshake(api).await.unwrap();

        client.send_text("state").await;
        let msg = client.recv().await.unwrap();
        match serde_json::from_str::<Response>(msg.to_str().unwrap()).unwrap() {
            Response::State(state) => assert_eq!(state.message, common::START_MESSAGE),
            other => panic!("expected state, got {:?}", other),
        }

        client.send_text("roll").await;
        let msg = client.recv().await.unwrap();
        match serde_json::from_str::<Response>(msg.to_str().unwrap()).unwrap() {
            Response::Roll(roll) => assert_eq!(roll.report.player, PlayerNum::P1),
            other => panic!("expected roll, got {:?}", other),
        }

        client.send_text("jump").await;
        let msg = client.recv().await.unwrap();
        let response: Response = serde_json::from_str(msg.to_str().unwrap()).unwrap();
        assert_eq!(response, Response::Error("unknown command: jump".to_string()));
    }
}
