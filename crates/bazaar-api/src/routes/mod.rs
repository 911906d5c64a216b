//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers::{
    cart, catalog, channels, health, members, messages, reservations, rooms, support, users,
};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(room_routes())
        .merge(channel_routes())
        .merge(message_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(reservation_routes())
        .merge(support_routes())
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(users::get_current_user))
        .route("/users", get(users::list_users))
        .route("/users/:user_id/role", put(users::set_user_role))
}

fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route("/rooms/:room_id", get(rooms::get_room))
        .route(
            "/rooms/:room_id/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/rooms/:room_id/members/:user_id",
            patch(members::update_member).delete(members::remove_member),
        )
        .route(
            "/rooms/:room_id/messages",
            get(messages::get_messages).post(messages::create_message),
        )
}

/// Staff channel management
fn channel_routes() -> Router<AppState> {
    Router::new()
        .route("/channels", post(channels::create_channel))
        .route(
            "/channels/:room_id",
            patch(channels::update_channel).delete(channels::delete_channel),
        )
        .route("/channels/:room_id/overview", get(channels::get_overview))
        .route("/channels/:room_id/blacklist", post(channels::update_blacklist))
}

fn message_routes() -> Router<AppState> {
    Router::new().route(
        "/messages/:message_id",
        patch(messages::update_message).delete(messages::delete_message),
    )
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog/items", post(catalog::submit_item))
        .route("/catalog/items/:item_id", get(catalog::get_item))
        .route("/catalog/items/:item_id/requeue", post(catalog::requeue_item))
        .route("/catalog/items/:item_id/archive", post(catalog::archive_item))
        .route("/catalog/search", get(catalog::search_items))
        .route("/catalog/post-rooms", get(catalog::post_rooms))
        .route("/catalog/queue", get(catalog::pending_queue))
        .route("/catalog/queue/publish", post(catalog::publish_queue))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::get_cart))
        .route("/cart/summary", get(cart::get_summary))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/:cart_item_id", axum::routing::delete(cart::cancel_item))
        .route("/cart/items/:cart_item_id/status", put(cart::set_item_status))
}

fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route("/reservations/dispatch", post(reservations::dispatch))
        .route("/reservations/placed", post(reservations::mark_placed))
}

fn support_routes() -> Router<AppState> {
    Router::new().route("/support/bug-reports", post(support::submit_bug_report))
}
