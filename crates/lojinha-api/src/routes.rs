use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{require_admin, require_auth, require_bot_token};
use crate::{AppState, admin, auth, bot, inventory, profile, raffles, ranking, store};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth/request-code", post(auth::request_code))
        .route("/auth/login", post(auth::login))
        .route("/products", get(store::list_products))
        .route("/ranking", get(ranking::ranking));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/me", get(profile::me).patch(profile::update_me))
        .route("/me/items", get(profile::my_items))
        .route("/me/items/{product_id}/activate", post(inventory::activate))
        .route("/me/badges", get(profile::my_badges))
        .route("/me/transactions", get(profile::my_transactions))
        .route("/me/boosts", get(profile::my_boosts))
        .route("/me/emojis", get(profile::my_emojis))
        .route("/me/daily", post(profile::claim_daily))
        .route("/products/{product_id}/buy", post(store::buy))
        .route("/raffles", get(raffles::list_raffles))
        .route("/raffles/{raffle_id}/enter", post(raffles::enter))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Layers run bottom-up: auth first, then the admin check.
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{user_id}/coins", post(admin::adjust_coins))
        .route("/admin/users/{user_id}/ban", post(admin::toggle_ban))
        .route("/admin/products", get(admin::list_products).post(admin::create_product))
        .route("/admin/products/{product_id}", delete(admin::delete_product))
        .route("/admin/raffles", get(admin::list_raffles).post(admin::create_raffle))
        .route("/admin/raffles/{raffle_id}/draw", post(admin::draw))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let bot_routes = Router::new()
        .route("/bot/messages", post(bot::message))
        .route("/bot/daily", post(bot::daily))
        .route("/bot/users/{number}/coins", get(bot::coins))
        .route("/bot/users/{number}/boosts", get(bot::active_boosts))
        .route(
            "/bot/users/{number}/inventory/boosts",
            get(bot::inventory_boosts),
        )
        .route("/bot/users/{number}/emojis", get(bot::emojis))
        .route(
            "/bot/users/{number}/boosts/{product_id}/activate",
            post(bot::activate_boost),
        )
        .route("/bot/milestones", get(bot::milestone_list))
        .route("/bot/ranking/coins", get(bot::coin_ranking))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bot_token));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .merge(bot_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
