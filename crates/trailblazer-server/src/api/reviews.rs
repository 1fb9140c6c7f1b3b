use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use trailblazer_core::{NewReview, Review, ReviewerProfile};

use crate::middleware::RequestId;
use crate::realtime::review_updates;

use super::{map_db_error, parse_shoe_id, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PostReviewRequest {
    #[serde(flatten)]
    pub profile: ReviewerProfile,
    #[serde(default)]
    pub content: String,
}

/// GET /api/v1/shoes/{id}/reviews: newest first.
pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Review>>>, ApiError> {
    let id = parse_shoe_id(&req_id.0, &id)?;
    let reviews = state.catalog.list_reviews(id).await;
    Ok(Json(ApiResponse::new(reviews, req_id.0)))
}

/// POST /api/v1/shoes/{id}/reviews: add a review, then signal subscribers.
pub(super) async fn post_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<PostReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ApiError> {
    let rid = req_id.0;
    let shoe_id = parse_shoe_id(&rid, &id)?;

    if body.profile.user_id.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "unauthorized",
            "sign in before posting a review",
        ));
    }
    let review = NewReview::from_profile(shoe_id, body.profile, &body.content)
        .ok_or_else(|| ApiError::invalid_field(rid.clone(), "content", "content is required"))?;

    state
        .catalog
        .get_shoe(shoe_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let added = state
        .catalog
        .add_review(review)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let listeners = state.events.review_added(shoe_id);
    tracing::debug!(%shoe_id, listeners, "published reviewAdded");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(added, rid))))
}

/// GET /api/v1/shoes/{id}/reviews/events: SSE stream of `reviews` events.
///
/// The current list is sent on connect; afterwards every `reviewAdded`
/// signal for this shoe produces the re-read list once the refetch delay has
/// passed.
pub(super) async fn review_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let shoe_id = parse_shoe_id(&req_id.0, &id)?;

    // Subscribe before the snapshot so nothing published in between is lost.
    let receiver = state.events.subscribe();
    let snapshot = state.catalog.list_reviews(shoe_id).await;
    let updates = review_updates(
        state.catalog.clone(),
        receiver,
        shoe_id,
        state.refetch_delay,
    );

    let events = stream::once(async move { snapshot })
        .chain(updates)
        .filter_map(|reviews| async move {
            match Event::default().event("reviews").json_data(&reviews) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode reviews event");
                    None
                }
            }
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
