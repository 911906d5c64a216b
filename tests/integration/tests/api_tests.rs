//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use bazaar_core::Role;
use integration_tests::{assert_json, assert_status, check_test_env, fixtures::*, TestServer, TestUser};
use reqwest::StatusCode;
use uuid::Uuid;

async fn main_channel(server: &TestServer, staff: &TestUser) -> Uuid {
    let response = server.get_auth("/api/v1/catalog/post-rooms", &staff.token).await.unwrap();
    let rooms: Vec<PostRoomResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    rooms.first().expect("main channel exists").id
}

/// Submit and publish one item, returning the published entry
async fn publish_item(server: &TestServer, admin: &TestUser, quantity: i32) -> PublishedEntryResponse {
    let room_id = main_channel(server, admin).await;

    let response = server
        .post_auth(
            "/api/v1/catalog/items",
            &admin.token,
            &SubmitCatalogItemRequest::new(room_id, quantity),
        )
        .await
        .unwrap();
    let entry: QueueEntryResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let request = PublishQueueRequest {
        room_id: None,
        queue_ids: vec![entry.id],
    };
    let response = server
        .post_auth("/api/v1/catalog/queue/publish", &admin.token, &request)
        .await
        .unwrap();
    let mut published: PublishResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(published.published.len(), 1);
    published.published.remove(0)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Auth and User Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/v1/users/@me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.get_auth("/api/v1/users/@me", "not-a-jwt").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_get_current_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();

    let response = server.get_auth("/api/v1/users/@me", &client.token).await.unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(me.id, client.id());
    assert_eq!(me.email, client.user.email);
    assert_eq!(me.role, "client");
}

#[tokio::test]
async fn test_list_users_requires_staff() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();

    let response = server.get_auth("/api/v1/users", &client.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.get_auth("/api/v1/users", &admin.token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_admin_cannot_grant_creator() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let worker = server.seed_user(Role::Worker).await.unwrap();

    let path = format!("/api/v1/users/{}/role", worker.id());
    let response = server
        .put_auth(&path, &admin.token, &SetUserRoleRequest { role: "creator".into() })
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Room and Channel Tests
// ============================================================================

#[tokio::test]
async fn test_system_rooms_are_listed() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();

    let response = server.get_auth("/api/v1/rooms", &admin.token).await.unwrap();
    let rooms: Vec<RoomResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    for key in ["main_channel", "reserved_orders", "bug_reports"] {
        assert!(
            rooms.iter().any(|r| r.system_key.as_deref() == Some(key)),
            "{key} missing from room list"
        );
    }
}

#[tokio::test]
async fn test_client_cannot_see_reserved_orders() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();

    let response = server.get_auth("/api/v1/rooms", &client.token).await.unwrap();
    let rooms: Vec<RoomResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    assert!(rooms
        .iter()
        .all(|r| r.system_key.as_deref() != Some("reserved_orders")));
}

#[tokio::test]
async fn test_public_channel_read_only_for_clients() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();

    let response = server
        .post_auth("/api/v1/channels", &admin.token, &CreateChannelRequest::public())
        .await
        .unwrap();
    let channel: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(channel.kind, "channel");

    let path = format!("/api/v1/rooms/{}", channel.id);
    let response = server.get_auth(&path, &client.token).await.unwrap();
    let seen: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(seen.can_read);
    assert!(!seen.can_post);

    let path = format!("/api/v1/rooms/{}/messages", channel.id);
    let response = server
        .post_auth(&path, &client.token, &CreateMessageRequest::text("hi"))
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "CANNOT_POST_IN_ROOM");
}

#[tokio::test]
async fn test_private_channel_hidden_from_clients() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();

    let response = server
        .post_auth("/api/v1/channels", &admin.token, &CreateChannelRequest::private())
        .await
        .unwrap();
    let channel: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let path = format!("/api/v1/rooms/{}/messages", channel.id);
    let response = server.get_auth(&path, &client.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_system_room_cannot_be_deleted() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let creator = server.seed_user(Role::Creator).await.unwrap();
    let room_id = main_channel(&server, &creator).await;

    let path = format!("/api/v1/channels/{room_id}");
    let response = server.delete_auth(&path, &creator.token).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "SYSTEM_ROOM_PROTECTED");
}

#[tokio::test]
async fn test_group_room_membership() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let member = server.seed_user(Role::Client).await.unwrap();
    let outsider = server.seed_user(Role::Client).await.unwrap();

    let request = CreateRoomRequest {
        title: Some("Team".into()),
        members: vec![member.id()],
    };
    let response = server.post_auth("/api/v1/rooms", &admin.token, &request).await.unwrap();
    let room: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let path = format!("/api/v1/rooms/{}/messages", room.id);
    let response = server
        .post_auth(&path, &member.token, &CreateMessageRequest::text("hello team"))
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server.get_auth(&path, &outsider.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_message_edit_and_delete() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let other = server.seed_user(Role::Admin).await.unwrap();

    let response = server
        .post_auth("/api/v1/channels", &admin.token, &CreateChannelRequest::public())
        .await
        .unwrap();
    let channel: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let path = format!("/api/v1/rooms/{}/messages", channel.id);
    let response = server
        .post_auth(&path, &admin.token, &CreateMessageRequest::text("first"))
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(message.sender_id, Some(admin.id()));

    let edit_path = format!("/api/v1/messages/{}", message.id);
    let response = server
        .patch_auth(&edit_path, &other.token, &UpdateMessageRequest { text: "x".into() })
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .patch_auth(&edit_path, &admin.token, &UpdateMessageRequest { text: "edited".into() })
        .await
        .unwrap();
    let edited: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(edited.text, "edited");
    assert!(edited.edited);

    let response = server.delete_auth(&edit_path, &admin.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth(&path, &admin.token).await.unwrap();
    let history: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(history.iter().all(|m| m.id != message.id));
}

#[tokio::test]
async fn test_client_msg_id_is_idempotent() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();

    let response = server
        .post_auth("/api/v1/channels", &admin.token, &CreateChannelRequest::public())
        .await
        .unwrap();
    let channel: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let path = format!("/api/v1/rooms/{}/messages", channel.id);
    let request = CreateMessageRequest::idempotent("once");

    let response = server.post_auth(&path, &admin.token, &request).await.unwrap();
    let first: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let response = server.post_auth(&path, &admin.token, &request).await.unwrap();
    let second: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(first.id, second.id);
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[tokio::test]
async fn test_client_cannot_submit_items() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();
    let room_id = main_channel(&server, &admin).await;

    let response = server
        .post_auth(
            "/api/v1/catalog/items",
            &client.token,
            &SubmitCatalogItemRequest::new(room_id, 1),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_publish_allocates_code_and_posts() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();

    let published = publish_item(&server, &admin, 3).await;

    assert_eq!(published.item.status, "published");
    assert!(published.item.code.is_some_and(|c| c > 0));
    assert_eq!(published.message.kind.as_deref(), Some("catalog_product"));
    assert_eq!(
        published.message.meta["product_id"],
        serde_json::json!(published.item.id)
    );
}

#[tokio::test]
async fn test_worker_cannot_publish() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let worker = server.seed_user(Role::Worker).await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/catalog/queue/publish",
            &worker.token,
            &PublishQueueRequest::default(),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Cart and Reservation Tests
// ============================================================================

#[tokio::test]
async fn test_add_to_cart_reserves_stock() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();
    let published = publish_item(&server, &admin, 3).await;

    let request = AddToCartRequest {
        item_id: published.item.id,
        quantity: 2,
    };
    let response = server.post_auth("/api/v1/cart/items", &client.token, &request).await.unwrap();
    let added: AddToCartResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(added.available, 1);
    assert_eq!(added.cart_item.quantity, 2);
    assert_eq!(added.reservation.quantity, 2);
    assert!(!added.reservation.is_sent);
}

#[tokio::test]
async fn test_add_to_cart_out_of_stock() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();
    let published = publish_item(&server, &admin, 1).await;

    let request = AddToCartRequest {
        item_id: published.item.id,
        quantity: 5,
    };
    let response = server.post_auth("/api/v1/cart/items", &client.token, &request).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::CONFLICT).await.unwrap();

    assert_eq!(body.error.code, "OUT_OF_STOCK");
    let details = body.error.details.expect("stock details");
    assert_eq!(details["available"], 1);
    assert_eq!(details["requested"], 5);
}

#[tokio::test]
async fn test_cancel_returns_stock() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();
    let published = publish_item(&server, &admin, 2).await;

    let request = AddToCartRequest {
        item_id: published.item.id,
        quantity: 2,
    };
    let response = server.post_auth("/api/v1/cart/items", &client.token, &request).await.unwrap();
    let added: AddToCartResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(added.available, 0);

    let path = format!("/api/v1/cart/items/{}", added.cart_item.id);
    let response = server.delete_auth(&path, &client.token).await.unwrap();
    let cancelled: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cancelled["available"], 2);
}

#[tokio::test]
async fn test_dispatch_and_place() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();
    let published = publish_item(&server, &admin, 1).await;

    let request = AddToCartRequest {
        item_id: published.item.id,
        quantity: 1,
    };
    let response = server.post_auth("/api/v1/cart/items", &client.token, &request).await.unwrap();
    let added: AddToCartResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth("/api/v1/reservations/dispatch", &admin.token, &serde_json::json!({}))
        .await
        .unwrap();
    // Another test may have dispatched this reservation already
    let dispatched: DispatchResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!dispatched.room_id.is_nil());

    let placement = MarkPlacedRequest {
        reservation_id: Some(added.reservation.id),
        shelf_number: Some(12),
        ..MarkPlacedRequest::default()
    };
    let response = server
        .post_auth("/api/v1/reservations/placed", &admin.token, &placement)
        .await
        .unwrap();
    let placed: PlacementResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(placed.shelf_number, 12);
    assert!(placed.reservation.is_fulfilled);
}

#[tokio::test]
async fn test_dispatch_staffs_workers_added_after_startup() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    // Seeded straight into the users table, never through the role endpoint
    let worker = server.seed_user(Role::Worker).await.unwrap();

    let response = server
        .post_auth("/api/v1/reservations/dispatch", &admin.token, &serde_json::json!({}))
        .await
        .unwrap();
    let dispatched: DispatchResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth(&format!("/api/v1/rooms/{}/members", dispatched.room_id), &admin.token)
        .await
        .unwrap();
    let members: Vec<MemberResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    let own = members
        .iter()
        .find(|m| m.user_id == worker.id())
        .expect("worker joined the reserved-orders room");
    assert_eq!(own.role, "member");
    assert_eq!(own.room_id, dispatched.room_id);
}

#[tokio::test]
async fn test_cart_summary_reply() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();

    let response = server.get_auth("/api/v1/cart/summary", &client.token).await.unwrap();
    let summary: CartSummaryResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(summary.total_sum, 0.0);
    assert_eq!(summary.processed_sum, 0.0);
    assert!(!summary.reply.is_empty());
}

// ============================================================================
// Support Tests
// ============================================================================

#[tokio::test]
async fn test_bug_report_requires_staff() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let client = server.seed_user(Role::Client).await.unwrap();
    let admin = server.seed_user(Role::Admin).await.unwrap();
    let report = BugReportRequest {
        text: "Search returns stale items".into(),
    };

    let response = server
        .post_auth("/api/v1/support/bug-reports", &client.token, &report)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth("/api/v1/support/bug-reports", &admin.token, &report)
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(message.kind.as_deref(), Some("bug_report"));
}
