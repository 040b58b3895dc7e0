use crate::domain::conversation::Message;
use crate::domain::item::Item;
use crate::domain::money::Money;
use crate::domain::notification::Notification;
use crate::domain::profile::Profile;
use crate::domain::request::{BorrowRequest, RequestStatus};
use crate::domain::review::Review;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn store(&self, profile: Profile) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<Profile>>;
    async fn get_all(&self) -> Result<Vec<Profile>>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn store(&self, item: Item) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<Item>>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn store(&self, request: BorrowRequest) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<BorrowRequest>>;
    async fn get_all(&self) -> Result<Vec<BorrowRequest>>;
}

/// Message log of the 1:1 conversation attached to each request.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn append(&self, message: Message) -> Result<()>;
    async fn messages(&self, request_id: u64) -> Result<Vec<Message>>;
    /// The most recent offer message in the conversation, if any.
    async fn latest_offer(&self, request_id: u64) -> Result<Option<Message>>;
    /// Marks every message not sent by `reader` as read.
    async fn mark_read(&self, request_id: u64, reader: u64) -> Result<()>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn push(&self, notification: Notification) -> Result<()>;
    async fn for_user(&self, user: u64) -> Result<Vec<Notification>>;
    async fn unread_count(&self, user: u64) -> Result<usize>;
    async fn mark_all_read(&self, user: u64) -> Result<()>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn store(&self, review: Review) -> Result<()>;
    async fn exists(&self, request_id: u64, reviewer: u64) -> Result<bool>;
    async fn for_request(&self, request_id: u64) -> Result<Vec<Review>>;
}

/// A state change worth pushing to live subscribers, the in-process stand-in
/// for the hosted backend's change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    RequestChanged {
        request_id: u64,
        status: RequestStatus,
    },
    MessagePosted {
        request_id: u64,
        message_id: u64,
    },
    NotificationCreated {
        user: u64,
        notification_id: u64,
    },
}

pub trait ChangeFeed: Send + Sync {
    /// Best-effort publish; dropped when nobody is subscribed.
    fn publish(&self, event: ChangeEvent);
}

/// A checkout handle minted by the payment collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub checkout_url: String,
    pub amount: Money,
}

/// Seam to the external payment-intent creation endpoint.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, request_id: u64, total: Money) -> Result<PaymentIntent>;
}

pub type ProfileStoreBox = Box<dyn ProfileStore>;
pub type ItemStoreBox = Box<dyn ItemStore>;
pub type RequestStoreBox = Box<dyn RequestStore>;
pub type ConversationStoreBox = Box<dyn ConversationStore>;
pub type NotificationStoreBox = Box<dyn NotificationStore>;
pub type ReviewStoreBox = Box<dyn ReviewStore>;
pub type ChangeFeedBox = Box<dyn ChangeFeed>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;

/// The storage backends behind one engine instance.
pub struct MarketStores {
    pub profiles: ProfileStoreBox,
    pub items: ItemStoreBox,
    pub requests: RequestStoreBox,
    pub conversations: ConversationStoreBox,
    pub notifications: NotificationStoreBox,
    pub reviews: ReviewStoreBox,
}
