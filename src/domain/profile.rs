use crate::domain::review::Rating;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A member of the marketplace.
///
/// Tracks the reputation derived from reviews: `trust_score` is the running
/// average of all ratings received, absent until the first review lands.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub trust_score: Option<Decimal>,
    pub total_ratings: u32,
}

impl Profile {
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            trust_score: None,
            total_ratings: 0,
        }
    }

    /// Folds a freshly received rating into the running average.
    pub fn record_rating(&mut self, rating: Rating) {
        let count = Decimal::from(self.total_ratings);
        let prev = self.trust_score.unwrap_or(Decimal::ZERO);
        let next = (prev * count + Decimal::from(rating.value())) / (count + Decimal::ONE);
        self.trust_score = Some(next);
        self.total_ratings += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_profile_has_no_score() {
        let profile = Profile::new(1, "Alice".to_string());
        assert_eq!(profile.trust_score, None);
        assert_eq!(profile.total_ratings, 0);
    }

    #[test]
    fn test_first_rating_sets_score() {
        let mut profile = Profile::new(1, "Alice".to_string());
        profile.record_rating(Rating::new(4).unwrap());
        assert_eq!(profile.trust_score, Some(dec!(4)));
        assert_eq!(profile.total_ratings, 1);
    }

    #[test]
    fn test_running_average() {
        let mut profile = Profile::new(1, "Alice".to_string());
        profile.record_rating(Rating::new(4).unwrap());
        profile.record_rating(Rating::new(5).unwrap());
        assert_eq!(profile.trust_score, Some(dec!(4.5)));
        assert_eq!(profile.total_ratings, 2);

        profile.record_rating(Rating::new(3).unwrap());
        assert_eq!(profile.trust_score, Some(dec!(4)));
        assert_eq!(profile.total_ratings, 3);
    }
}
