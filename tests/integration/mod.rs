//! Integration tests for the item service.
//!
//! These tests run the real server on an ephemeral localhost port and talk
//! to it over TCP.
//! Run with: cargo test --test integration

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch, Notify};
use tokio::task::JoinHandle;

use item_service::api::{create_router, AppState};
use item_service::items::Item;
use item_service::server::{Phase, Server};

/// A server running in the background.
struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    phase: watch::Receiver<Phase>,
    task: JoinHandle<item_service::Result<()>>,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn start(router: Router, drain_timeout: Duration) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_listener(listener, router, drain_timeout);
    let addr = server.local_addr().unwrap();
    let mut phase = server.phase();

    let (stop, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(server.run(async {
        stop_rx.await.ok();
    }));

    phase.wait_for(|p| *p == Phase::Listening).await.unwrap();

    Running {
        addr,
        stop,
        phase,
        task,
    }
}

/// Router with a `/slow` endpoint that signals when entered and then sleeps.
fn slow_router(entered: Arc<Notify>, delay: Duration) -> Router {
    Router::new().route(
        "/slow",
        get(move || {
            let entered = entered.clone();
            async move {
                entered.notify_one();
                tokio::time::sleep(delay).await;
                "done"
            }
        }),
    )
}

/// Test the item scenarios end to end over a real connection.
#[tokio::test]
async fn test_item_crud_over_http() {
    let server = start(create_router(AppState::default()), Duration::from_secs(5)).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/ping")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), r#"{"Ping":"Pong"}"#);

    let response = client.get(server.url("/items/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"id":1,"name":"second","description":"second item"}"#
    );

    let response = client
        .post(server.url("/items/"))
        .body(r#"{"name":"new_name","description":"new_description"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Item = response.json().await.unwrap();
    assert_eq!(
        created,
        Item {
            id: 2,
            name: "new_name".to_string(),
            description: "new_description".to_string(),
        }
    );

    let response = client.get(server.url("/items/999")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"error":"item with ID does not exist"}"#
    );

    let response = client.delete(server.url("/items/0")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get(server.url("/items/0")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(server.url("/nonexistent")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(server.url("/items/")).send().await.unwrap();
    let items: Vec<Item> = response.json().await.unwrap();
    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

/// Test that an in-flight request completes during the drain.
#[tokio::test]
async fn test_drain_waits_for_in_flight_request() {
    let entered = Arc::new(Notify::new());
    let server = start(
        slow_router(entered.clone(), Duration::from_millis(300)),
        Duration::from_secs(5),
    )
    .await;
    let mut phase = server.phase.clone();

    let url = server.url("/slow");
    let request = tokio::spawn(async move { reqwest::get(url).await?.text().await });

    entered.notified().await;
    server.stop.send(()).unwrap();

    phase.wait_for(|p| *p != Phase::Listening).await.unwrap();

    assert_eq!(request.await.unwrap().unwrap(), "done");
    server.task.await.unwrap().unwrap();
    assert_eq!(*phase.borrow(), Phase::Stopped);
}

/// Test that no new connections are accepted while draining.
#[tokio::test]
async fn test_draining_server_refuses_new_connections() {
    let entered = Arc::new(Notify::new());
    let server = start(
        slow_router(entered.clone(), Duration::from_secs(2)),
        Duration::from_secs(10),
    )
    .await;
    let mut phase = server.phase.clone();

    let url = server.url("/slow");
    let request = tokio::spawn(async move { reqwest::get(url).await?.text().await });

    entered.notified().await;
    server.stop.send(()).unwrap();
    phase.wait_for(|p| *p == Phase::Draining).await.unwrap();

    let addr = server.addr;
    let refused = tokio::time::timeout(Duration::from_secs(1), async move {
        while TcpStream::connect(addr).await.is_ok() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(refused.is_ok(), "draining server still accepted connections");
    assert_eq!(*phase.borrow(), Phase::Draining);

    assert_eq!(request.await.unwrap().unwrap(), "done");
    server.task.await.unwrap().unwrap();
}

/// Test that the drain gives up once the timeout elapses.
#[tokio::test]
async fn test_drain_timeout_abandons_slow_request() {
    let entered = Arc::new(Notify::new());
    let server = start(
        slow_router(entered.clone(), Duration::from_secs(30)),
        Duration::from_millis(200),
    )
    .await;

    let url = server.url("/slow");
    let _request = tokio::spawn(async move { reqwest::get(url).await });

    entered.notified().await;
    let started = Instant::now();
    server.stop.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("server did not stop after drain timeout");
    result.unwrap().unwrap();

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "stopped after {elapsed:?}");
}

/// Test that the listener is closed once the server stops.
#[tokio::test]
async fn test_stopped_server_refuses_connections() {
    let server = start(create_router(AppState::default()), Duration::from_secs(1)).await;
    let url = server.url("/ping");

    server.stop.send(()).unwrap();
    server.task.await.unwrap().unwrap();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    assert!(client.get(url).send().await.is_err());
}
