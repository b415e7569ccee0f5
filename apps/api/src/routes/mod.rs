pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::chat::handlers as chat;
use crate::gigs::handlers as gigs;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session & onboarding
        .route("/api/session", get(auth::handle_get_session))
        .route("/api/user/type", put(auth::handle_set_user_type))
        .route(
            "/api/profile",
            get(profiles::handle_get_profile).put(profiles::handle_put_profile),
        )
        .route(
            "/api/user/professional-profile",
            post(profiles::handle_professional_profile),
        )
        .route("/api/survey", get(profiles::handle_get_survey))
        .route("/api/majors", get(profiles::handle_get_majors))
        // Gig board
        .route("/api/gigs", get(gigs::handle_list_gigs))
        .route("/api/gigs/:id", get(gigs::handle_get_gig))
        // Mentor chat
        .route("/api/mentors", get(chat::handle_list_mentors))
        .route("/api/chat/:vertical", post(chat::handle_chat))
        .route("/api/chat-cs", post(chat::handle_chat_cs))
        .route("/api/chat-health", post(chat::handle_chat_health))
        .route("/api/chat-finance", post(chat::handle_chat_finance))
        .with_state(state)
}
