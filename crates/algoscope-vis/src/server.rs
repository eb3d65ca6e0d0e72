//! Axum web server with WebSocket streaming for visualization.
//!
//! Every operation endpoint records its steps, loads them into the shared
//! [`Player`], starts playback and returns the recording to the caller.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use algoscope_algorithms::{AlgorithmInfo, AlgorithmRun};
use algoscope_core::bst::{DeleteOutcome, InsertOutcome, SearchOutcome, Traversal};
use algoscope_core::trie::{
    PrefixSearchOutcome, TrieDeleteOutcome, TrieInsertOutcome, TrieSearchOutcome,
};
use algoscope_core::{
    layout_tree, layout_trie, BinarySearchTree, Snapshot, StepList, TraversalOrder, Trie,
    TreeLayout, TrieLayout,
};

use crate::config::VisConfig;
use crate::error::Result;
use crate::playback::{Playback, PlaybackSpeed, PlaybackStatus};
use crate::player::{AppliedStep, Player};
use crate::render::RenderState;

/// Shared application state.
///
/// Handlers keep the structure's lock until its recording is loaded, so the
/// player always ends up with the recording of the latest mutation.
pub struct AppState {
    bst: RwLock<BinarySearchTree>,
    trie: RwLock<Trie>,
    player: Player,
}

impl AppState {
    fn new(config: &VisConfig) -> Self {
        let speed = PlaybackSpeed::new(config.speed_ms, config.min_speed_ms);
        Self {
            bst: RwLock::new(BinarySearchTree::new()),
            trie: RwLock::new(Trie::new()),
            player: Player::new(Playback::default().with_speed(speed)),
        }
    }

    async fn play(&self, steps: StepList, initial: RenderState) {
        self.player.load(steps, initial).await;
        self.player.start().await;
    }
}

/// Visualization server.
pub struct VisServer {
    config: VisConfig,
    state: Arc<AppState>,
}

impl VisServer {
    pub fn new(config: VisConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(&config)),
            config,
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/algorithms", get(algorithms_handler))
            .route("/api/run", post(run_handler))
            // Binary search tree
            .route("/api/bst/insert", post(bst_insert_handler))
            .route("/api/bst/search", post(bst_search_handler))
            .route("/api/bst/delete", post(bst_delete_handler))
            .route("/api/bst/traverse", post(bst_traverse_handler))
            .route("/api/bst/layout", get(bst_layout_handler))
            .route("/api/bst/clear", post(bst_clear_handler))
            // Trie
            .route("/api/trie/insert", post(trie_insert_handler))
            .route("/api/trie/search", post(trie_search_handler))
            .route("/api/trie/prefix", post(trie_prefix_handler))
            .route("/api/trie/delete", post(trie_delete_handler))
            .route("/api/trie/layout", get(trie_layout_handler))
            .route("/api/trie/clear", post(trie_clear_handler))
            // Playback
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/render", get(render_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/stop", post(stop_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/next", post(next_handler))
            .route("/api/playback/mode", post(mode_handler))
            .route("/api/playback/speed", post(speed_handler))
            // WebSocket for step streaming
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("Visualization server running on http://{}", self.config.addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: &'static str,
    bst_size: usize,
    bst_height: usize,
    trie_words: usize,
    trie_nodes: usize,
    playback: PlaybackStatus,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (bst_size, bst_height) = {
        let bst = state.bst.read().await;
        (bst.len(), bst.height())
    };
    let (trie_words, trie_nodes) = {
        let trie = state.trie.read().await;
        (trie.len(), trie.node_count())
    };
    Json(StatusResponse {
        status: "ok",
        bst_size,
        bst_height,
        trie_words,
        trie_nodes,
        playback: state.player.status().await,
    })
}

async fn algorithms_handler() -> Json<Vec<AlgorithmInfo>> {
    Json(algoscope_algorithms::algorithms().collect())
}

#[derive(Deserialize)]
struct RunRequest {
    algorithm: String,
    array: Value,
    #[serde(default)]
    target: Option<Value>,
}

async fn run_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<AlgorithmRun>> {
    let run = tokio::task::spawn_blocking(move || {
        algoscope_algorithms::run_algorithm(&req.algorithm, &req.array, req.target.as_ref())
    })
    .await??;

    let start = run
        .steps
        .get(0)
        .and_then(|step| step.array.as_deref())
        .unwrap_or(&run.final_array);
    state.play(run.steps.clone(), RenderState::for_array(start)).await;
    Ok(Json(run))
}

#[derive(Deserialize)]
struct ValueRequest {
    value: i64,
}

#[derive(Deserialize)]
struct TraverseRequest {
    order: TraversalOrder,
}

async fn bst_insert_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValueRequest>,
) -> Json<InsertOutcome> {
    let mut bst = state.bst.write().await;
    let before = Snapshot::tree(bst.root());
    let outcome = bst.insert(req.value);
    debug!(value = req.value, inserted = ?outcome.inserted, "bst insert");
    state
        .play(outcome.steps.clone(), RenderState::for_structure(before))
        .await;
    Json(outcome)
}

async fn bst_search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValueRequest>,
) -> Json<SearchOutcome> {
    let bst = state.bst.read().await;
    let outcome = bst.search(req.value);
    let current = RenderState::for_structure(Snapshot::tree(bst.root()));
    state.play(outcome.steps.clone(), current).await;
    Json(outcome)
}

async fn bst_delete_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValueRequest>,
) -> Json<DeleteOutcome> {
    let mut bst = state.bst.write().await;
    let before = Snapshot::tree(bst.root());
    let outcome = bst.delete(req.value);
    debug!(value = req.value, deleted = outcome.deleted, "bst delete");
    state
        .play(outcome.steps.clone(), RenderState::for_structure(before))
        .await;
    Json(outcome)
}

async fn bst_traverse_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TraverseRequest>,
) -> Json<Traversal> {
    let bst = state.bst.read().await;
    let traversal = bst.traverse(req.order);
    let current = RenderState::for_structure(Snapshot::tree(bst.root()));
    state.play(traversal.steps.clone(), current).await;
    Json(traversal)
}

async fn bst_layout_handler(State(state): State<Arc<AppState>>) -> Json<TreeLayout> {
    let bst = state.bst.read().await;
    Json(layout_tree(bst.root()))
}

async fn bst_clear_handler(State(state): State<Arc<AppState>>) -> Json<TreeLayout> {
    let mut bst = state.bst.write().await;
    bst.clear();
    let empty = RenderState::for_structure(Snapshot::tree(None));
    state.player.load(StepList::default(), empty).await;
    Json(TreeLayout::default())
}

#[derive(Deserialize)]
struct WordRequest {
    word: String,
}

#[derive(Deserialize)]
struct PrefixRequest {
    prefix: String,
}

#[derive(Deserialize)]
struct TrieDeleteRequest {
    word: String,
    /// Remove only this exact word instead of everything under the prefix.
    #[serde(default)]
    exact: bool,
}

async fn trie_insert_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WordRequest>,
) -> Json<TrieInsertOutcome> {
    let mut trie = state.trie.write().await;
    let before = Snapshot::trie(trie.root());
    let outcome = trie.insert(&req.word);
    debug!(word = %req.word, inserted = outcome.inserted, "trie insert");
    state
        .play(outcome.steps.clone(), RenderState::for_structure(before))
        .await;
    Json(outcome)
}

async fn trie_search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WordRequest>,
) -> Json<TrieSearchOutcome> {
    let trie = state.trie.read().await;
    let outcome = trie.search(&req.word);
    let current = RenderState::for_structure(Snapshot::trie(trie.root()));
    state.play(outcome.steps.clone(), current).await;
    Json(outcome)
}

async fn trie_prefix_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrefixRequest>,
) -> Json<PrefixSearchOutcome> {
    let trie = state.trie.read().await;
    let outcome = trie.search_prefix(&req.prefix);
    let current = RenderState::for_structure(Snapshot::trie(trie.root()));
    state.play(outcome.steps.clone(), current).await;
    Json(outcome)
}

async fn trie_delete_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TrieDeleteRequest>,
) -> Json<TrieDeleteOutcome> {
    let mut trie = state.trie.write().await;
    let before = Snapshot::trie(trie.root());
    let outcome = if req.exact {
        trie.delete_word(&req.word)
    } else {
        trie.delete(&req.word)
    };
    debug!(
        word = %req.word,
        exact = req.exact,
        removed = outcome.removed.len(),
        "trie delete"
    );
    state
        .play(outcome.steps.clone(), RenderState::for_structure(before))
        .await;
    Json(outcome)
}

async fn trie_layout_handler(State(state): State<Arc<AppState>>) -> Json<TrieLayout> {
    let trie = state.trie.read().await;
    Json(layout_trie(trie.root()))
}

async fn trie_clear_handler(State(state): State<Arc<AppState>>) -> Json<TrieLayout> {
    let mut trie = state.trie.write().await;
    trie.clear();
    let empty = RenderState::for_structure(Snapshot::trie(trie.root()));
    state.player.load(StepList::default(), empty).await;
    Json(TrieLayout::default())
}

async fn playback_status_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.status().await)
}

async fn render_handler(State(state): State<Arc<AppState>>) -> Json<RenderState> {
    Json(state.player.render().await)
}

async fn play_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.resume().await)
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.pause().await)
}

async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.stop().await)
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.reset().await)
}

async fn next_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    state.player.next().await;
    Json(state.player.status().await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeRequest {
    step_mode: bool,
}

async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ModeRequest>,
) -> Json<PlaybackStatus> {
    Json(state.player.set_step_mode(req.step_mode).await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeedRequest {
    delay_ms: u64,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Json<PlaybackStatus> {
    Json(state.player.set_speed(req.delay_ms).await)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut applied = state.player.subscribe();

    let initial = WsResponse::Status(state.player.status().await);
    if !send(&mut socket, &initial).await {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let response = match serde_json::from_str::<WsCommand>(&text) {
                        Ok(cmd) => handle_ws_command(&state, cmd).await,
                        Err(e) => WsResponse::Error { message: e.to_string() },
                    };
                    if !send(&mut socket, &response).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            step = applied.recv() => match step {
                Ok(step) => {
                    if !send(&mut socket, &WsResponse::Step(step)).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    debug!("websocket closed");
}

async fn send(socket: &mut WebSocket, response: &WsResponse) -> bool {
    match serde_json::to_string(response) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "failed to encode websocket response");
            true
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WsCommand {
    #[serde(rename = "get_status")]
    GetStatus,
    #[serde(rename = "get_render")]
    GetRender,
    #[serde(rename = "play")]
    Play,
    #[serde(rename = "pause")]
    Pause,
    #[serde(rename = "next")]
    Next,
    #[serde(rename = "reset")]
    Reset,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum WsResponse {
    #[serde(rename = "status")]
    Status(PlaybackStatus),
    #[serde(rename = "render")]
    Render(RenderState),
    #[serde(rename = "step")]
    Step(AppliedStep),
    #[serde(rename = "error")]
    Error { message: String },
}

async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> WsResponse {
    match cmd {
        WsCommand::GetStatus => WsResponse::Status(state.player.status().await),
        WsCommand::GetRender => WsResponse::Render(state.player.render().await),
        WsCommand::Play => WsResponse::Status(state.player.resume().await),
        WsCommand::Pause => WsResponse::Status(state.player.pause().await),
        WsCommand::Next => {
            state.player.next().await;
            WsResponse::Status(state.player.status().await)
        }
        WsCommand::Reset => WsResponse::Status(state.player.reset().await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use algoscope_algorithms::{Category, ValidationError};
    use algoscope_core::StepKind;
    use serde_json::json;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(&VisConfig::default()))
    }

    #[test]
    fn router_builds() {
        let server = VisServer::new(VisConfig::default());
        let _router = server.router();
    }

    #[tokio::test]
    async fn run_loads_steps_into_the_player() {
        let state = state();
        let req = RunRequest {
            algorithm: "quickSort".into(),
            array: json!([3, 1, 2]),
            target: None,
        };
        let Json(run) = run_handler(State(state.clone()), Json(req)).await.unwrap();

        assert_eq!(run.category, Category::Sorting);
        assert_eq!(run.final_array, vec![1.0, 2.0, 3.0]);
        assert_eq!(state.player.status().await.total_steps, run.steps.len());
    }

    #[tokio::test]
    async fn run_rejects_bad_input() {
        let req = RunRequest {
            algorithm: "linearSearch".into(),
            array: json!([1, 2]),
            target: Some(Value::Null),
        };
        let err = run_handler(State(state()), Json(req)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingTarget)));
    }

    #[tokio::test]
    async fn bst_operations_share_one_tree() {
        let state = state();
        for value in [50, 30, 70] {
            let Json(inserted) =
                bst_insert_handler(State(state.clone()), Json(ValueRequest { value })).await;
            assert!(inserted.inserted.is_some());
        }
        let Json(found) =
            bst_search_handler(State(state.clone()), Json(ValueRequest { value: 30 })).await;
        assert!(found.found);

        let Json(deleted) =
            bst_delete_handler(State(state.clone()), Json(ValueRequest { value: 50 })).await;
        assert!(deleted.deleted);
        assert_eq!(deleted.steps.count_of(StepKind::Apply), 1);

        let Json(layout) = bst_layout_handler(State(state.clone())).await;
        assert_eq!(layout.nodes.len(), 2);

        let Json(cleared) = bst_clear_handler(State(state.clone())).await;
        assert!(cleared.nodes.is_empty());
        assert_eq!(state.bst.read().await.len(), 0);
    }

    #[tokio::test]
    async fn trie_prefix_and_exact_delete() {
        let state = state();
        for word in ["cat", "car", "dog"] {
            let req = WordRequest { word: word.into() };
            let Json(inserted) = trie_insert_handler(State(state.clone()), Json(req)).await;
            assert!(inserted.inserted);
        }

        let Json(exact) = trie_delete_handler(
            State(state.clone()),
            Json(TrieDeleteRequest {
                word: "cat".into(),
                exact: true,
            }),
        )
        .await;
        assert_eq!(exact.removed, vec!["cat".to_string()]);

        let Json(prefix) = trie_delete_handler(
            State(state.clone()),
            Json(TrieDeleteRequest {
                word: "ca".into(),
                exact: false,
            }),
        )
        .await;
        assert_eq!(prefix.removed, vec!["car".to_string()]);
        assert_eq!(state.trie.read().await.words(), vec!["dog".to_string()]);
    }

    async fn drain_player(state: &AppState) -> RenderState {
        state.player.stop().await;
        while state.player.next().await {}
        state.player.render().await
    }

    #[tokio::test]
    async fn overlapping_inserts_render_the_live_tree() {
        let state = state();
        let (Json(first), Json(second)) = tokio::join!(
            bst_insert_handler(State(state.clone()), Json(ValueRequest { value: 10 })),
            bst_insert_handler(State(state.clone()), Json(ValueRequest { value: 20 })),
        );
        assert!(first.inserted.is_some() && second.inserted.is_some());

        let render = drain_player(&state).await;
        let live = Snapshot::tree(state.bst.read().await.root());
        assert_eq!(render.structure, Some(live));
        assert_eq!(state.bst.read().await.values(), vec![10, 20]);
    }

    #[tokio::test]
    async fn overlapping_trie_edits_render_the_live_trie() {
        let state = state();
        let insert = |word: &str| {
            let req = WordRequest { word: word.into() };
            trie_insert_handler(State(state.clone()), Json(req))
        };
        let _ = tokio::join!(insert("cat"), insert("car"), insert("dog"));

        let render = drain_player(&state).await;
        let live = Snapshot::trie(state.trie.read().await.root());
        assert_eq!(render.structure, Some(live));
    }

    #[tokio::test]
    async fn status_reports_structure_shape() {
        let state = state();
        for value in [50, 30, 20] {
            let _ = bst_insert_handler(State(state.clone()), Json(ValueRequest { value })).await;
        }
        let req = WordRequest { word: "cat".into() };
        let _ = trie_insert_handler(State(state.clone()), Json(req)).await;

        let Json(status) = status_handler(State(state)).await;
        assert_eq!(status.bst_size, 3);
        assert_eq!(status.bst_height, 3);
        assert_eq!(status.trie_words, 1);
        assert_eq!(status.trie_nodes, 4);
    }

    #[tokio::test]
    async fn ws_commands_report_status() {
        let state = state();
        let response = handle_ws_command(&state, WsCommand::GetStatus).await;
        assert!(matches!(response, WsResponse::Status(_)));

        let cmd: WsCommand = serde_json::from_str(r#"{"type":"next"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Next));
    }
}
