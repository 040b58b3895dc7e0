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
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for member profiles.
pub const CF_PROFILES: &str = "profiles";
/// Column Family for listings.
pub const CF_ITEMS: &str = "items";
/// Column Family for borrow requests.
pub const CF_REQUESTS: &str = "requests";
/// Column Family for conversation messages, keyed by (request, message).
pub const CF_MESSAGES: &str = "messages";
/// Column Family for notifications, keyed by (user, notification).
pub const CF_NOTIFICATIONS: &str = "notifications";
/// Column Family for reviews, keyed by (request, reviewer).
pub const CF_REVIEWS: &str = "reviews";

const ALL_CFS: [&str; 6] = [
    CF_PROFILES,
    CF_ITEMS,
    CF_REQUESTS,
    CF_MESSAGES,
    CF_NOTIFICATIONS,
    CF_REVIEWS,
];

/// A persistent store implementation using RocksDB.
///
/// Handles storage for every marketplace entity using separate Column
/// Families. Composite keys are big-endian id pairs so that a request's
/// messages (and a user's notifications) sit in one contiguous key range.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksMarketStore {
    db: Arc<DB>,
}

impl RocksMarketStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Boxes this store as every backend of a `MarketStores` bundle.
    pub fn into_stores(self) -> MarketStores {
        MarketStores {
            profiles: Box::new(self.clone()),
            items: Box::new(self.clone()),
            requests: Box::new(self.clone()),
            conversations: Box::new(self.clone()),
            notifications: Box::new(self.clone()),
            reviews: Box::new(self),
        }
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            MarketError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value).map_err(|e| {
            MarketError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {e}"),
            )))
        })?;
        self.db.put_cf(&cf, key, bytes)?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(&cf, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = entry?;
            values.push(decode(&value)?);
        }
        Ok(values)
    }

    /// All values whose key starts with the given 8-byte id prefix.
    fn scan_prefix<T: DeserializeOwned>(&self, cf_name: &str, prefix: u64) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let prefix = prefix.to_be_bytes();
        let mut values = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));
        for entry in iter {
            let (key, value) = entry?;
            if !key.starts_with(&prefix) {
                break;
            }
            values.push(decode(&value)?);
        }
        Ok(values)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        MarketError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {e}"),
        )))
    })
}

fn pair_key(left: u64, right: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&left.to_be_bytes());
    key[8..].copy_from_slice(&right.to_be_bytes());
    key
}

#[async_trait]
impl ProfileStore for RocksMarketStore {
    async fn store(&self, profile: Profile) -> Result<()> {
        self.put(CF_PROFILES, &profile.id.to_be_bytes(), &profile)
    }

    async fn get(&self, id: u64) -> Result<Option<Profile>> {
        self.read(CF_PROFILES, &id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Profile>> {
        self.scan_all(CF_PROFILES)
    }
}

#[async_trait]
impl ItemStore for RocksMarketStore {
    async fn store(&self, item: Item) -> Result<()> {
        self.put(CF_ITEMS, &item.id.to_be_bytes(), &item)
    }

    async fn get(&self, id: u64) -> Result<Option<Item>> {
        self.read(CF_ITEMS, &id.to_be_bytes())
    }
}

#[async_trait]
impl RequestStore for RocksMarketStore {
    async fn store(&self, request: BorrowRequest) -> Result<()> {
        self.put(CF_REQUESTS, &request.id.to_be_bytes(), &request)
    }

    async fn get(&self, id: u64) -> Result<Option<BorrowRequest>> {
        self.read(CF_REQUESTS, &id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<BorrowRequest>> {
        self.scan_all(CF_REQUESTS)
    }
}

#[async_trait]
impl ConversationStore for RocksMarketStore {
    async fn append(&self, message: Message) -> Result<()> {
        let key = pair_key(message.request_id, message.id);
        self.put(CF_MESSAGES, &key, &message)
    }

    async fn messages(&self, request_id: u64) -> Result<Vec<Message>> {
        self.scan_prefix(CF_MESSAGES, request_id)
    }

    async fn latest_offer(&self, request_id: u64) -> Result<Option<Message>> {
        let messages: Vec<Message> = self.scan_prefix(CF_MESSAGES, request_id)?;
        Ok(messages
            .into_iter()
            .rev()
            .find(|message| message.kind == MessageKind::Offer))
    }

    async fn mark_read(&self, request_id: u64, reader: u64) -> Result<()> {
        let messages: Vec<Message> = self.scan_prefix(CF_MESSAGES, request_id)?;
        for mut message in messages {
            if message.sender != Some(reader) && !message.is_read {
                message.is_read = true;
                let key = pair_key(message.request_id, message.id);
                self.put(CF_MESSAGES, &key, &message)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for RocksMarketStore {
    async fn push(&self, notification: Notification) -> Result<()> {
        let key = pair_key(notification.user, notification.id);
        self.put(CF_NOTIFICATIONS, &key, &notification)
    }

    async fn for_user(&self, user: u64) -> Result<Vec<Notification>> {
        self.scan_prefix(CF_NOTIFICATIONS, user)
    }

    async fn unread_count(&self, user: u64) -> Result<usize> {
        let inbox: Vec<Notification> = self.scan_prefix(CF_NOTIFICATIONS, user)?;
        Ok(inbox.iter().filter(|n| !n.is_read).count())
    }

    async fn mark_all_read(&self, user: u64) -> Result<()> {
        let inbox: Vec<Notification> = self.scan_prefix(CF_NOTIFICATIONS, user)?;
        for mut notification in inbox {
            if !notification.is_read {
                notification.is_read = true;
                let key = pair_key(notification.user, notification.id);
                self.put(CF_NOTIFICATIONS, &key, &notification)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for RocksMarketStore {
    async fn store(&self, review: Review) -> Result<()> {
        let key = pair_key(review.request_id, review.reviewer);
        self.put(CF_REVIEWS, &key, &review)
    }

    async fn exists(&self, request_id: u64, reviewer: u64) -> Result<bool> {
        let cf = self.cf(CF_REVIEWS)?;
        // Just check if the key exists without retrieving the value
        let result = self.db.get_pinned_cf(&cf, pair_key(request_id, reviewer))?;
        Ok(result.is_some())
    }

    async fn for_request(&self, request_id: u64) -> Result<Vec<Review>> {
        self.scan_prefix(CF_REVIEWS, request_id)
    }
}
