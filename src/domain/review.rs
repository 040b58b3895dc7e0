use crate::error::MarketError;
use serde::{Deserialize, Serialize};

/// A star rating between 1 and 5, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, MarketError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MarketError::ValidationError(format!(
                "Rating must be between 1 and 5, got {value}"
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = MarketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Feedback left by one party of a completed borrow request for the other.
///
/// At most one review per (request, reviewer) pair; the reviewee's trust
/// score is recomputed from these.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Review {
    pub request_id: u64,
    pub reviewer: u64,
    pub reviewee: u64,
    pub rating: Rating,
    pub comment: Option<String>,
}

impl Review {
    pub fn new(
        request_id: u64,
        reviewer: u64,
        reviewee: u64,
        rating: Rating,
        comment: Option<String>,
    ) -> Self {
        Self {
            request_id,
            reviewer,
            reviewee,
            rating,
            comment,
        }
    }
}
