//! JSON contracts for request bodies and response payloads.

use mover_engine::{
    ClientId, EstimateId, MoverId, MoverSearchParams, NewMoveRequest, PageParams, Pagination,
    Review, ReviewId, ToggleAction, ToggleOutcome,
};
use mover_server::routes::{CreateEstimateRequest, CreateReviewRequest, HealthResponse};
use serde_json::json;

#[test]
fn create_review_body_is_camel_case() {
    let body: CreateReviewRequest = serde_json::from_value(json!({
        "estimateId": "0b8f7a1e-5a3b-4d7c-9c55-4f1d0c2a9e11",
        "rating": 4,
        "content": "Quick and careful with fragile boxes"
    }))
    .unwrap();
    assert_eq!(body.estimate_id, "0b8f7a1e-5a3b-4d7c-9c55-4f1d0c2a9e11");
    assert_eq!(body.rating, 4);

    // Ratings are integers.
    let fractional = serde_json::from_value::<CreateReviewRequest>(json!({
        "estimateId": "x",
        "rating": 4.5,
        "content": "Quick and careful with fragile boxes"
    }));
    assert!(fractional.is_err());
}

#[test]
fn estimate_comment_is_optional() {
    let body: CreateEstimateRequest =
        serde_json::from_value(json!({ "requestId": "r", "price": 120000 })).unwrap();
    assert_eq!(body.price, 120_000);
    assert!(body.comment.is_empty());

    let negative =
        serde_json::from_value::<CreateEstimateRequest>(json!({ "requestId": "r", "price": -5 }));
    assert!(negative.is_err());
}

#[test]
fn move_request_rejects_unknown_move_type() {
    let body = json!({
        "moveType": "castle",
        "moveDate": 1_800_000_000_000u64,
        "departure": "Seoul",
        "arrival": "Busan"
    });
    assert!(serde_json::from_value::<NewMoveRequest>(body).is_err());
}

#[test]
fn query_parameters_stay_raw_strings() {
    let params: MoverSearchParams = serde_json::from_value(json!({
        "search": "van",
        "sortBy": "highRating",
        "page": "0"
    }))
    .unwrap();
    assert_eq!(params.sort_by.as_deref(), Some("highRating"));
    assert_eq!(params.page.as_deref(), Some("0"));
    assert!(params.limit.is_none());

    let params: PageParams = serde_json::from_value(json!({})).unwrap();
    assert_eq!(params, PageParams::default());
}

#[test]
fn toggle_outcome_shape() {
    let outcome = ToggleOutcome {
        action: ToggleAction::Removed,
        is_favorite: false,
        favorite_count: 3,
    };
    assert_eq!(
        serde_json::to_value(outcome).unwrap(),
        json!({ "action": "removed", "isFavorite": false, "favoriteCount": 3 })
    );
}

#[test]
fn review_and_pagination_shapes() {
    let review = Review {
        id: ReviewId::new(),
        estimate_id: EstimateId::new(),
        mover_id: MoverId::new(),
        client_id: ClientId::new(),
        rating: 5,
        content: "Arrived early and wrapped everything".into(),
        created_at: 1_706_745_600_000,
        updated_at: 1_706_745_600_000,
    };
    let value = serde_json::to_value(&review).unwrap();
    for key in [
        "id",
        "estimateId",
        "moverId",
        "clientId",
        "rating",
        "content",
        "createdAt",
        "updatedAt",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }

    let pagination = Pagination {
        page: 1,
        limit: 6,
        total_pages: 0,
    };
    assert_eq!(
        serde_json::to_value(pagination).unwrap(),
        json!({ "page": 1, "limit": 6, "totalPages": 0 })
    );
}

#[test]
fn health_response_names_the_backend() {
    let health: HealthResponse = serde_json::from_value(json!({
        "status": "ok",
        "version": "0.1.0",
        "backend": "postgres"
    }))
    .unwrap();
    assert_eq!(health.backend, "postgres");
}
