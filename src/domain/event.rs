use crate::domain::item::ItemCategory;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Join,
    ListItem,
    ListService,
    Request,
    Message,
    Image,
    Offer,
    AcceptOffer,
    Accept,
    Reject,
    Cancel,
    RequestPayment,
    Pay,
    Complete,
    Sweep,
    Review,
}

/// One row of the marketplace event stream.
///
/// Which optional columns are required depends on the event kind; the engine
/// validates per event. `actor` is the profile acting, `request` and `item`
/// reference entities by id.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct MarketEvent {
    pub event: EventKind,
    pub actor: Option<u64>,
    pub request: Option<u64>,
    pub item: Option<u64>,
    pub amount: Option<Decimal>,
    pub days: Option<u32>,
    pub date: Option<NaiveDate>,
    pub rating: Option<u8>,
    pub category: Option<ItemCategory>,
    pub deposit: Option<Decimal>,
    pub note: Option<String>,
}
