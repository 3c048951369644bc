use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crease_core::progress::{MatchProgress, MatchStatus};
use crease_core::setup::SetupId;
use crease_core::store::{MatchId, MatchKey, MatchRecord, MatchStore, StoreError};
use crease_core::sync::{PersistenceSynchronizer, SessionRecord, SyncOutcome};
use crease_core::test_helpers::{progress, sample_setup};
use crease_http::{HttpMatchStore, HttpStoreConfig};

/// Requests received by the fake store, as `(method route, body)`.
#[derive(Default)]
struct FakeState {
    seen: Vec<(String, Value)>,
    fail_with: Option<(StatusCode, Value)>,
}

type Shared = Arc<Mutex<FakeState>>;

fn record(state: &Shared, what: &str, body: Value) -> Option<(StatusCode, Json<Value>)> {
    let mut s = state.lock().unwrap();
    s.seen.push((what.to_string(), body));
    s.fail_with
        .clone()
        .map(|(code, body)| (code, Json(body)))
}

async fn get_setup(
    State(state): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let user = q.get("userId").cloned().unwrap_or_default();
    if let Some(fail) = record(&state, "GET game-setup", json!({ "userId": user })) {
        return fail;
    }
    let data = if user == "user-1" {
        json!({
            "id": 42,
            "userId": "user-1",
            "yourTeam": "India",
            "opponentTeam": "Australia",
            "overs": 2,
            "maxPlayer": 3,
            "target": 20,
            "status": "PENDING",
            "score": null
        })
    } else {
        Value::Null
    };
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

async fn delete_setup(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(fail) = record(&state, "DELETE game-setup", body) {
        return fail;
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

async fn create_match(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(fail) = record(&state, "POST play-match", body.clone()) {
        return fail;
    }
    let mut row = body;
    row["id"] = json!(7);
    (StatusCode::OK, Json(json!({ "success": true, "data": row })))
}

async fn update_match(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(fail) = record(&state, "PUT play-match", body.clone()) {
        return fail;
    }
    (StatusCode::OK, Json(json!({ "success": true, "data": body })))
}

async fn delete_match(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(fail) = record(&state, "DELETE play-match", body) {
        return fail;
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

struct FakeStore {
    addr: SocketAddr,
    state: Shared,
    _server: tokio::task::JoinHandle<()>,
}

impl FakeStore {
    async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/api/game-setup", get(get_setup).delete(delete_setup))
            .route(
                "/api/play-match",
                axum::routing::post(create_match)
                    .put(update_match)
                    .delete(delete_match),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            _server: handle,
        }
    }

    fn client(&self) -> HttpMatchStore {
        HttpMatchStore::new(HttpStoreConfig::new(format!("http://{}", self.addr))).unwrap()
    }

    fn fail_with(&self, code: StatusCode, body: Value) {
        self.state.lock().unwrap().fail_with = Some((code, body));
    }

    fn seen(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().seen.clone()
    }
}

#[tokio::test]
async fn fetch_setup_decodes_store_row() {
    let server = FakeStore::start().await;
    let store = server.client();

    let setup = store.fetch_setup("user-1").await.unwrap().unwrap();
    assert_eq!(setup.id, SetupId("42".to_string()));
    assert_eq!(setup.overs_limit, 2);
    assert_eq!(setup.max_wickets, 3);
    assert_eq!(setup.score, 0);
    assert!(setup.validate().is_ok());

    assert_eq!(store.fetch_setup("someone-else").await.unwrap(), None);
}

#[tokio::test]
async fn create_returns_row_id() {
    let server = FakeStore::start().await;
    let store = server.client();

    let rec = MatchRecord::new(&sample_setup(), &progress(1, 4, 0));
    let id = store.create_match(&rec).await.unwrap();
    assert_eq!(id, MatchId("7".to_string()));

    let seen = server.seen();
    assert_eq!(seen[0].0, "POST play-match");
    assert_eq!(seen[0].1["gameId"], "setup-1");
    assert_eq!(seen[0].1["score"], 4);
    assert_eq!(seen[0].1["overs"], 0.1);
    assert_eq!(seen[0].1["status"], "ongoing");
}

#[tokio::test]
async fn update_and_delete_bodies() {
    let server = FakeStore::start().await;
    let store = server.client();
    let setup = sample_setup();
    let rec = MatchRecord::new(&setup, &progress(7, 12, 1));

    store
        .update_match(&MatchKey::Setup(setup.id.clone()), &rec)
        .await
        .unwrap();
    store
        .update_match(&MatchKey::Match(MatchId("7".into())), &rec)
        .await
        .unwrap();
    store.delete_match_setup(&setup.id).await.unwrap();

    let seen = server.seen();
    assert_eq!(seen.len(), 3);
    assert!(seen[0].1.get("id").is_none());
    assert_eq!(seen[0].1["overs"], 1.1);
    assert_eq!(seen[1].1["id"], "7");
    assert_eq!(seen[2], ("DELETE game-setup".to_string(), json!({ "id": "setup-1" })));
}

#[tokio::test]
async fn error_status_carries_message() {
    let server = FakeStore::start().await;
    server.fail_with(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "success": false, "message": "db down" }),
    );
    let store = server.client();

    let err = store
        .create_match(&MatchRecord::new(&sample_setup(), &MatchProgress::default()))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Status(500, "db down".to_string()));
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected() {
    let server = FakeStore::start().await;
    server.fail_with(
        StatusCode::OK,
        json!({ "success": false, "message": "Missing required fields" }),
    );
    let store = server.client();

    let err = store.delete_match_setup(&SetupId("1".into())).await.unwrap_err();
    assert_eq!(err, StoreError::Rejected("Missing required fields".to_string()));
}

#[tokio::test]
async fn unreachable_store_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpMatchStore::new(HttpStoreConfig::new(format!("http://{addr}"))).unwrap();
    let err = store.fetch_setup("user-1").await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn synchronizer_round_trip_over_http() {
    let server = FakeStore::start().await;
    let store = server.client();
    let mut sync = PersistenceSynchronizer::new(sample_setup(), &MatchProgress::default());
    sync.mark_started();

    assert_eq!(
        sync.sync(&store, &progress(1, 2, 0)).await.unwrap(),
        SyncOutcome::Created(MatchId("7".into()))
    );
    assert_eq!(sync.record(), &SessionRecord::Persisted(MatchId("7".into())));
    assert_eq!(
        sync.sync(&store, &progress(2, 6, 0)).await.unwrap(),
        SyncOutcome::Updated
    );

    let mut done = progress(3, 21, 0);
    done.status = MatchStatus::Achieved;
    assert_eq!(sync.sync(&store, &done).await.unwrap(), SyncOutcome::Archived);

    let seen = server.seen();
    let routes: Vec<&str> = seen.iter().map(|(r, _)| r.as_str()).collect();
    assert_eq!(
        routes,
        vec![
            "POST play-match",
            "PUT play-match",
            "DELETE play-match",
            "DELETE game-setup",
        ]
    );
    assert_eq!(seen[2].1, json!({ "userId": "user-1", "gameId": "setup-1" }));
}

#[tokio::test]
async fn missing_match_record_counts_as_deleted() {
    let server = FakeStore::start().await;
    server.fail_with(
        StatusCode::NOT_FOUND,
        json!({ "success": false, "message": "No match found to delete" }),
    );
    let store = server.client();

    assert_eq!(
        store.delete_match("user-1", &SetupId("setup-1".into())).await,
        Ok(())
    );
    // Other routes still surface a 404.
    assert_eq!(
        store.delete_match_setup(&SetupId("setup-1".into())).await,
        Err(StoreError::Status(404, "No match found to delete".to_string()))
    );
}
