use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use skyfare_core::Booking;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserBookings {
    pub user_id: Uuid,
    pub count: usize,
    pub bookings: Vec<Booking>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/users/{user_id}/bookings", get(user_bookings))
}

async fn user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserBookings>, AppError> {
    let bookings = state.bookings.bookings_for_user(user_id).await?;
    Ok(Json(UserBookings {
        user_id,
        count: bookings.len(),
        bookings,
    }))
}
