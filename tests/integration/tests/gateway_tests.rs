//! Gateway Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use bazaar_core::Role;
use integration_tests::{
    assert_json, check_test_env, fixtures::*, Closed, TestGateway, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

async fn start() -> (TestServer, TestGateway) {
    let server = TestServer::start().await.expect("Failed to start server");
    let gateway = TestGateway::start(server.config.clone())
        .await
        .expect("Failed to start gateway");
    (server, gateway)
}

#[tokio::test]
async fn test_identify_returns_ready() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway) = start().await;
    let user = server.seed_user(Role::Client).await.unwrap();

    let mut client = gateway.connect().await.unwrap();
    client
        .send(json!({ "op": "IDENTIFY", "d": { "token": format!("Bearer {}", user.token) } }))
        .await
        .unwrap();

    let ready = client.recv().await.unwrap();
    assert_eq!(ready["op"], "READY");
    assert_eq!(ready["d"]["user_id"], json!(user.id()));
    assert_eq!(ready["d"]["role"], "client");
}

#[tokio::test]
async fn test_bad_token_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let (_server, gateway) = start().await;

    let mut client = gateway.connect().await.unwrap();
    client
        .send(json!({ "op": "IDENTIFY", "d": { "token": "garbage" } }))
        .await
        .unwrap();

    let frame = client.recv().await.unwrap();
    assert_eq!(frame["op"], "INVALID_SESSION");
    assert_eq!(client.closed().await.unwrap(), Closed::Code(4004));
}

#[tokio::test]
async fn test_join_before_identify_closes() {
    if !check_test_env().await {
        return;
    }

    let (_server, gateway) = start().await;

    let mut client = gateway.connect().await.unwrap();
    client
        .send(json!({ "op": "JOIN_ROOM", "d": { "room_id": Uuid::new_v4() } }))
        .await
        .unwrap();

    assert_eq!(client.closed().await.unwrap(), Closed::Code(4003));
}

#[tokio::test]
async fn test_heartbeat_is_acked() {
    if !check_test_env().await {
        return;
    }

    let (_server, gateway) = start().await;

    let mut client = gateway.connect().await.unwrap();
    client.send(json!({ "op": "HEARTBEAT" })).await.unwrap();

    let ack = client.recv().await.unwrap();
    assert_eq!(ack["op"], "HEARTBEAT_ACK");
}

#[tokio::test]
async fn test_second_session_replaces_first() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway) = start().await;
    let user = server.seed_user(Role::Worker).await.unwrap();

    let mut first = gateway.identify(&user.token).await.unwrap();
    let mut second = gateway.identify(&user.token).await.unwrap();

    assert_eq!(first.closed().await.unwrap(), Closed::Code(4009));

    second.send(json!({ "op": "HEARTBEAT" })).await.unwrap();
    assert_eq!(second.recv().await.unwrap()["op"], "HEARTBEAT_ACK");
}

#[tokio::test]
async fn test_join_denied_for_unreadable_room() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway) = start().await;
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();

    let response = server
        .post_auth("/api/v1/channels", &admin.token, &CreateChannelRequest::private())
        .await
        .unwrap();
    let channel: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let mut socket = gateway.identify(&client.token).await.unwrap();
    assert_eq!(socket.join_room(channel.id).await.unwrap(), "room:join_denied");
}

#[tokio::test]
async fn test_new_message_reaches_watchers() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway) = start().await;
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();

    let response = server
        .post_auth("/api/v1/channels", &admin.token, &CreateChannelRequest::public())
        .await
        .unwrap();
    let channel: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let mut socket = gateway.identify(&client.token).await.unwrap();
    assert_eq!(socket.join_room(channel.id).await.unwrap(), "room:joined");

    let path = format!("/api/v1/rooms/{}/messages", channel.id);
    let response = server
        .post_auth(&path, &admin.token, &CreateMessageRequest::text("fresh stock"))
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let event = socket.recv_event("message:new").await.unwrap();
    assert_eq!(event["room_id"], json!(channel.id));
    assert_eq!(event["message"]["id"], json!(message.id));
}
