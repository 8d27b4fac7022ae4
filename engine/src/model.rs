//! Entity types owned by the record store.

use crate::{
    aggregate::MoverAggregates, error::Result, ClientId, Error, EstimateId, MoverId, RequestId,
    ReviewId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Largest quote price a backend can store.
pub const MAX_PRICE: u64 = i64::MAX as u64;

/// Check a quote price: positive and storable.
pub fn validate_price(price: u64) -> Result<()> {
    if price == 0 {
        return Err(Error::invalid_field("price", "must be greater than zero"));
    }
    if price > MAX_PRICE {
        return Err(Error::invalid_field("price", format!("must be at most {MAX_PRICE}")));
    }
    Ok(())
}

/// Largest timestamp a backend can store.
pub const MAX_TIMESTAMP: Timestamp = i64::MAX as u64;

/// Upper bound on a mover's years of experience.
pub const MAX_CAREER_YEARS: u32 = 100;

/// Kind of move a client is requesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveType {
    Small,
    Home,
    Office,
}

impl MoveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveType::Small => "small",
            MoveType::Home => "home",
            MoveType::Office => "office",
        }
    }
}

impl std::str::FromStr for MoveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(MoveType::Small),
            "home" => Ok(MoveType::Home),
            "office" => Ok(MoveType::Office),
            other => Err(Error::invalid_field(
                "moveType",
                format!("unknown move type '{other}'"),
            )),
        }
    }
}

/// A customer of the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: Timestamp,
}

/// Editable client fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientProfile {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_field("name", "must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(Error::invalid_field("email", "must be an email address"));
        }
        Ok(())
    }
}

/// A service provider.
///
/// The aggregate counters are derived from related rows and are only ever
/// written by the store's aggregate refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub id: MoverId,
    pub nickname: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub description: String,
    /// Years of experience
    pub career: u32,
    #[serde(default)]
    pub service_types: Vec<MoveType>,
    #[serde(default)]
    pub service_regions: Vec<String>,
    #[serde(flatten)]
    pub aggregates: MoverAggregates,
    pub created_at: Timestamp,
}

/// Editable mover fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverProfile {
    pub nickname: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub career: u32,
    #[serde(default)]
    pub service_types: Vec<MoveType>,
    #[serde(default)]
    pub service_regions: Vec<String>,
}

impl MoverProfile {
    pub fn validate(&self) -> Result<()> {
        if self.nickname.trim().is_empty() {
            return Err(Error::invalid_field("nickname", "must not be empty"));
        }
        if self.career > MAX_CAREER_YEARS {
            return Err(Error::invalid_field(
                "career",
                format!("must be at most {MAX_CAREER_YEARS} years"),
            ));
        }
        Ok(())
    }
}

/// A client's move request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub id: RequestId,
    pub client_id: ClientId,
    pub move_type: MoveType,
    /// Planned move date (milliseconds since epoch)
    pub move_date: Timestamp,
    pub departure: String,
    pub arrival: String,
    pub created_at: Timestamp,
}

/// Input for a new move request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMoveRequest {
    pub move_type: MoveType,
    pub move_date: Timestamp,
    pub departure: String,
    pub arrival: String,
}

impl NewMoveRequest {
    pub fn validate(&self) -> Result<()> {
        if self.departure.trim().is_empty() {
            return Err(Error::invalid_field("departure", "must not be empty"));
        }
        if self.arrival.trim().is_empty() {
            return Err(Error::invalid_field("arrival", "must not be empty"));
        }
        if self.move_date > MAX_TIMESTAMP {
            return Err(Error::invalid_field("moveDate", "is out of range"));
        }
        Ok(())
    }
}

/// One mover's quote against one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub id: EstimateId,
    pub request_id: RequestId,
    pub mover_id: MoverId,
    pub client_id: ClientId,
    pub price: u64,
    pub comment: String,
    pub is_client_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A client's review of a confirmed estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub estimate_id: EstimateId,
    pub mover_id: MoverId,
    pub client_id: ClientId,
    pub rating: u8,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A client's saved mover. Existence is the whole state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub client_id: ClientId,
    pub mover_id: MoverId,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mover_serializes_aggregates_inline() {
        let mover = Mover {
            id: MoverId::new(),
            nickname: "Swift Haul".into(),
            introduction: String::new(),
            description: String::new(),
            career: 4,
            service_types: vec![MoveType::Home],
            service_regions: vec!["Seoul".into()],
            aggregates: MoverAggregates {
                review_count: 2,
                average_review_rating: 4.5,
                estimate_count: 3,
                favorite_count: 1,
            },
            created_at: 1000,
        };

        let value = serde_json::to_value(&mover).unwrap();
        assert_eq!(value["reviewCount"], json!(2));
        assert_eq!(value["averageReviewRating"], json!(4.5));
        assert_eq!(value["favoriteCount"], json!(1));
        assert_eq!(value["serviceTypes"], json!(["home"]));
    }

    #[test]
    fn profile_validation() {
        let profile = ClientProfile {
            name: "  ".into(),
            email: "a@b.c".into(),
            phone: None,
        };
        assert!(profile.validate().is_err());

        let profile = MoverProfile {
            nickname: "Careful Crew".into(),
            introduction: String::new(),
            description: String::new(),
            career: 0,
            service_types: vec![],
            service_regions: vec![],
        };
        assert!(profile.validate().is_ok());

        let veteran = MoverProfile {
            career: MAX_CAREER_YEARS + 1,
            ..profile
        };
        let err = veteran.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: "career", .. }));
    }

    #[test]
    fn move_date_must_fit_storage() {
        let request = NewMoveRequest {
            move_type: MoveType::Small,
            move_date: MAX_TIMESTAMP + 1,
            departure: "Mapo-gu".into(),
            arrival: "Suwon".into(),
        };
        let err = request.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: "moveDate", .. }));
    }

    #[test]
    fn move_type_parsing() {
        assert_eq!("office".parse::<MoveType>().unwrap(), MoveType::Office);
        assert!("castle".parse::<MoveType>().is_err());
    }
}
