use crate::domain::conversation::{Message, MessageKind};
use crate::domain::item::Item;
use crate::domain::notification::Notification;
use crate::domain::ports::{
    ConversationStore, ItemStore, MarketStores, NotificationStore, ProfileStore, RequestStore,
    ReviewStore,
};
use crate::domain::profile::Profile;
use crate::domain::request::BorrowRequest;
use crate::domain::review::Review;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for member profiles.
///
/// Uses `Arc<RwLock<HashMap>>` to allow shared concurrent access. Ideal for
/// tests or one-shot replays where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<u64, Profile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn store(&self, profile: Profile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id, profile);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for listings.
#[derive(Default, Clone)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<u64, Item>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn store(&self, item: Item) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert(item.id, item);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }
}

/// A thread-safe in-memory store for borrow requests.
#[derive(Default, Clone)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<HashMap<u64, BorrowRequest>>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn store(&self, request: BorrowRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<BorrowRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<BorrowRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.values().cloned().collect())
    }
}

/// A thread-safe in-memory message log, one conversation per request.
#[derive(Default, Clone)]
pub struct InMemoryConversationStore {
    messages: Arc<RwLock<HashMap<u64, Vec<Message>>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, message: Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages.entry(message.request_id).or_default().push(message);
        Ok(())
    }

    async fn messages(&self, request_id: u64) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&request_id).cloned().unwrap_or_default())
    }

    async fn latest_offer(&self, request_id: u64) -> Result<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages
            .get(&request_id)
            .and_then(|log| {
                log.iter()
                    .rev()
                    .find(|message| message.kind == MessageKind::Offer)
            })
            .cloned())
    }

    async fn mark_read(&self, request_id: u64, reader: u64) -> Result<()> {
        let mut messages = self.messages.write().await;
        if let Some(log) = messages.get_mut(&request_id) {
            for message in log.iter_mut() {
                if message.sender != Some(reader) {
                    message.is_read = true;
                }
            }
        }
        Ok(())
    }
}

/// A thread-safe in-memory notification inbox.
#[derive(Default, Clone)]
pub struct InMemoryNotificationStore {
    notifications: Arc<RwLock<HashMap<u64, Vec<Notification>>>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn push(&self, notification: Notification) -> Result<()> {
        let mut notifications = self.notifications.write().await;
        notifications
            .entry(notification.user)
            .or_default()
            .push(notification);
        Ok(())
    }

    async fn for_user(&self, user: u64) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&user).cloned().unwrap_or_default())
    }

    async fn unread_count(&self, user: u64) -> Result<usize> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .get(&user)
            .map(|inbox| inbox.iter().filter(|n| !n.is_read).count())
            .unwrap_or(0))
    }

    async fn mark_all_read(&self, user: u64) -> Result<()> {
        let mut notifications = self.notifications.write().await;
        if let Some(inbox) = notifications.get_mut(&user) {
            for notification in inbox.iter_mut() {
                notification.is_read = true;
            }
        }
        Ok(())
    }
}

/// A thread-safe in-memory review store, keyed by (request, reviewer).
#[derive(Default, Clone)]
pub struct InMemoryReviewStore {
    reviews: Arc<RwLock<HashMap<(u64, u64), Review>>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn store(&self, review: Review) -> Result<()> {
        let mut reviews = self.reviews.write().await;
        reviews.insert((review.request_id, review.reviewer), review);
        Ok(())
    }

    async fn exists(&self, request_id: u64, reviewer: u64) -> Result<bool> {
        let reviews = self.reviews.read().await;
        Ok(reviews.contains_key(&(request_id, reviewer)))
    }

    async fn for_request(&self, request_id: u64) -> Result<Vec<Review>> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .values()
            .filter(|review| review.request_id == request_id)
            .cloned()
            .collect())
    }
}

/// Boxes a full set of in-memory stores for engine construction.
pub fn stores() -> MarketStores {
    MarketStores {
        profiles: Box::new(InMemoryProfileStore::new()),
        items: Box::new(InMemoryItemStore::new()),
        requests: Box::new(InMemoryRequestStore::new()),
        conversations: Box::new(InMemoryConversationStore::new()),
        notifications: Box::new(InMemoryNotificationStore::new()),
        reviews: Box::new(InMemoryReviewStore::new()),
    }
}
