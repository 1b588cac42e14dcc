//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{QueueResponse, WaitingParticipantResponse};
use super::handlers::system::HealthResponse;
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "matchmaking-gateway",
        description = "Pairs waiting participants by shared interest tags. Pairing happens over the `/ws` WebSocket; these endpoints are for operations."
    ),
    paths(
        super::handlers::system::health_handler,
        super::handlers::queue::get_queue,
        super::handlers::queue::get_waiting_participant,
    ),
    components(schemas(HealthResponse, QueueResponse, WaitingParticipantResponse, ErrorResponse, ErrorBody)),
    tags(
        (name = "System", description = "Service health"),
        (name = "Queue", description = "Waiting participants"),
    )
)]
pub struct ApiDoc;
