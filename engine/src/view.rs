//! Response shapes returned by engine operations.
//!
//! Views carry viewer-scoped flags and joined display fields on top of the
//! stored entities. They serialize to the JSON contracts of the HTTP surface.

use crate::{
    pagination::Pagination, Estimate, MoveType, Mover, Review, ReviewId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// A mover as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverView {
    #[serde(flatten)]
    pub mover: Mover,
    pub is_favorite: bool,
}

/// A mover in the viewer's own favorites list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteMoverView {
    #[serde(flatten)]
    pub mover: Mover,
    /// Always true: every entry of a favorites list is liked
    pub is_liked: bool,
    pub favorited_at: Timestamp,
}

/// A review with the display name of the other party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mover_nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

/// A confirmed, unreviewed estimate with its request details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritableEstimateView {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub move_type: MoveType,
    pub move_date: Timestamp,
    pub departure: String,
    pub arrival: String,
    pub mover_nickname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub reviews: Vec<ReviewView>,
    pub total: u64,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePage {
    pub estimates: Vec<WritableEstimateView>,
    pub total: u64,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePage {
    pub movers: Vec<FavoriteMoverView>,
    pub total: u64,
    pub pagination: Pagination,
}

/// A page of the mover directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverPage {
    pub movers: Vec<MoverView>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
    pub pagination: Pagination,
}

/// What a favorite toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// Result of a favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub is_favorite: bool,
    pub favorite_count: u64,
}

/// Acknowledgement of a review deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedReview {
    pub deleted: bool,
    pub review_id: ReviewId,
}
