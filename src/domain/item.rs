use crate::domain::money::{Money, Rate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Books,
    Electronics,
    Notes,
    Bikes,
    SportsEquipment,
    Tools,
    Clothing,
    Furniture,
    #[default]
    Other,
    Services,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
}

/// A listing: a physical good rented per day, or a service billed per hour.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Item {
    pub id: u64,
    pub owner: u64,
    pub title: String,
    pub category: ItemCategory,
    pub condition: ItemCondition,
    pub rate: Rate,
    pub deposit: Option<Money>,
    pub is_service: bool,
    pub is_available: bool,
}

impl Item {
    pub fn new_item(
        id: u64,
        owner: u64,
        title: String,
        category: ItemCategory,
        rate: Rate,
        deposit: Option<Money>,
    ) -> Self {
        Self {
            id,
            owner,
            title,
            category,
            condition: ItemCondition::default(),
            rate,
            deposit,
            is_service: false,
            is_available: true,
        }
    }

    pub fn new_service(id: u64, owner: u64, title: String, rate: Rate) -> Self {
        Self {
            id,
            owner,
            title,
            category: ItemCategory::Services,
            condition: ItemCondition::default(),
            rate,
            deposit: None,
            is_service: true,
            is_available: true,
        }
    }

    /// Billing unit used when rendering rates and offers.
    pub fn rate_unit(&self) -> &'static str {
        if self.is_service { "hour" } else { "day" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_item_defaults() {
        let item = Item::new_item(
            1,
            10,
            "Cordless drill".to_string(),
            ItemCategory::Tools,
            Rate::new(dec!(6.0)).unwrap(),
            None,
        );
        assert!(item.is_available);
        assert!(!item.is_service);
        assert_eq!(item.rate_unit(), "day");
    }

    #[test]
    fn test_service_listing() {
        let service = Item::new_service(
            2,
            10,
            "Calculus tutoring".to_string(),
            Rate::new(dec!(15.0)).unwrap(),
        );
        assert_eq!(service.category, ItemCategory::Services);
        assert_eq!(service.rate_unit(), "hour");
    }
}
