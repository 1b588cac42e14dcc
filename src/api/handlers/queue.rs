//! Waiting-queue inspection.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{QueueResponse, WaitingParticipantResponse};
use crate::app_state::AppState;
use crate::domain::ParticipantId;
use crate::error::GatewayError;

/// `GET /queue`: List participants waiting for an opponent.
#[utoipa::path(
    get,
    path = "/api/v1/queue",
    tag = "Queue",
    summary = "Inspect the waiting queue",
    description = "Returns the ids of all participants currently waiting to be paired, in arrival order.",
    responses(
        (status = 200, description = "Waiting participants", body = QueueResponse),
    )
)]
pub async fn get_queue(State(state): State<AppState>) -> impl IntoResponse {
    let participants: Vec<String> = state
        .coordinator
        .registry()
        .waiting_ids()
        .await
        .into_iter()
        .map(|id| id.to_string())
        .collect();

    Json(QueueResponse {
        waiting: participants.len(),
        participants,
    })
}

/// `GET /queue/{id}`: Look up one waiting participant.
#[utoipa::path(
    get,
    path = "/api/v1/queue/{id}",
    tag = "Queue",
    summary = "Inspect a waiting participant",
    params(("id" = String, Path, description = "Participant id")),
    responses(
        (status = 200, description = "Participant is waiting", body = WaitingParticipantResponse),
        (status = 404, description = "Participant is not waiting", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_waiting_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WaitingParticipantResponse>, GatewayError> {
    let id = ParticipantId::new(id);
    let found = state.coordinator.registry().get(&id).await;
    let Some(participant) = found else {
        return Err(GatewayError::ParticipantNotFound(id));
    };

    Ok(Json(WaitingParticipantResponse {
        id: participant.id().to_string(),
        tags: participant.tags().to_vec(),
        waited_secs: participant.joined_at().elapsed().as_secs(),
    }))
}

/// Queue routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/queue", get(get_queue))
        .route("/queue/{id}", get(get_waiting_participant))
}
