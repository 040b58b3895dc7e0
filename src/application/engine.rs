use crate::domain::conversation::Message;
use crate::domain::event::{EventKind, MarketEvent};
use crate::domain::item::Item;
use crate::domain::money::Money;
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::ports::{ChangeEvent, ChangeFeedBox, MarketStores, PaymentGatewayBox};
use crate::domain::profile::Profile;
use crate::domain::request::BorrowRequest;
use crate::domain::review::{Rating, Review};
use crate::error::{MarketError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Final state of the marketplace after an event stream has been replayed.
pub struct MarketSnapshot {
    pub requests: Vec<BorrowRequest>,
    pub profiles: Vec<Profile>,
}

/// The main entry point for the marketplace application.
///
/// `MarketEngine` replays marketplace events against the configured storage
/// backends and publishes every resulting state change on the change feed.
/// It ensures sequential consistency by awaiting storage operations for each
/// event.
///
/// Malformed events (missing required fields, out-of-range values) are
/// reported as errors; events that are well-formed but invalid for the
/// current state (wrong actor, closed request, unknown reference) are
/// logged and dropped, so one bad row never poisons a replay.
pub struct MarketEngine {
    stores: MarketStores,
    feed: ChangeFeedBox,
    gateway: PaymentGatewayBox,
    seq: AtomicU64,
}

impl MarketEngine {
    pub fn new(stores: MarketStores, feed: ChangeFeedBox, gateway: PaymentGatewayBox) -> Self {
        Self {
            stores,
            feed,
            gateway,
            seq: AtomicU64::new(0),
        }
    }

    /// Submits one event for processing.
    pub async fn process_event(&self, event: MarketEvent) -> Result<()> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        match event.event {
            EventKind::Join => self.handle_join(&event).await,
            EventKind::ListItem => self.handle_list(&event, false).await,
            EventKind::ListService => self.handle_list(&event, true).await,
            EventKind::Request => self.handle_request(&event, seq).await,
            EventKind::Message => self.handle_message(&event, seq, false).await,
            EventKind::Image => self.handle_message(&event, seq, true).await,
            EventKind::Offer => self.handle_offer(&event, seq).await,
            EventKind::AcceptOffer => self.handle_accept_offer(&event, seq).await,
            EventKind::Accept => self.handle_decision(&event, seq, true).await,
            EventKind::Reject => self.handle_decision(&event, seq, false).await,
            EventKind::Cancel => self.handle_cancel(&event, seq).await,
            EventKind::RequestPayment => self.handle_request_payment(&event, seq).await,
            EventKind::Pay => self.handle_pay(&event, seq).await,
            EventKind::Complete => self.handle_complete(&event, seq).await,
            EventKind::Sweep => self.handle_sweep(&event, seq).await,
            EventKind::Review => self.handle_review(&event, seq).await,
        }
    }

    /// Consumes the engine and returns the final marketplace state.
    pub async fn into_results(self) -> Result<MarketSnapshot> {
        Ok(MarketSnapshot {
            requests: self.stores.requests.get_all().await?,
            profiles: self.stores.profiles.get_all().await?,
        })
    }

    async fn handle_join(&self, event: &MarketEvent) -> Result<()> {
        let actor = require(event.actor, "actor", "join")?;
        let name = event
            .note
            .clone()
            .unwrap_or_else(|| default_name(actor));
        let profile = match self.stores.profiles.get(actor).await? {
            Some(mut existing) => {
                existing.name = name;
                existing
            }
            None => Profile::new(actor, name),
        };
        self.stores.profiles.store(profile).await
    }

    async fn handle_list(&self, event: &MarketEvent, is_service: bool) -> Result<()> {
        let actor = require(event.actor, "actor", "list")?;
        let item_id = require(event.item, "item", "list")?;
        let amount = require(event.amount, "amount", "list")?;
        let title = require(event.note.clone(), "note", "list")?;
        let rate = amount.try_into()?;

        // Ignore duplicate item ids
        if self.stores.items.get(item_id).await?.is_some() {
            debug!(item = item_id, "ignoring duplicate listing");
            return Ok(());
        }
        self.ensure_profile(actor).await?;

        let item = if is_service {
            Item::new_service(item_id, actor, title, rate)
        } else {
            let deposit = match event.deposit {
                Some(value) => Some(Money::new(value)?),
                None => None,
            };
            Item::new_item(
                item_id,
                actor,
                title,
                event.category.unwrap_or_default(),
                rate,
                deposit,
            )
        };
        self.stores.items.store(item).await
    }

    async fn handle_request(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "request")?;
        let request_id = require(event.request, "request", "request")?;
        let item_id = require(event.item, "item", "request")?;
        let days = require(event.days, "days", "request")?;
        let start_date = require(event.date, "date", "request")?;

        // Ignore duplicate request ids
        if self.stores.requests.get(request_id).await?.is_some() {
            debug!(request = request_id, "ignoring duplicate request id");
            return Ok(());
        }
        let Some(item) = self.stores.items.get(item_id).await? else {
            debug!(item = item_id, "ignoring request for unknown item");
            return Ok(());
        };
        let borrower = self.ensure_profile(actor).await?;

        let request = match BorrowRequest::open(
            request_id,
            &item,
            actor,
            start_date,
            days,
            event.note.clone(),
            seq,
        ) {
            Ok(request) => request,
            Err(e) => {
                debug!(request = request_id, error = %e, "rejecting borrow request");
                return Ok(());
            }
        };

        let status = request.status;
        let owner = request.owner;
        self.stores.requests.store(request).await?;
        self.feed.publish(ChangeEvent::RequestChanged {
            request_id,
            status,
        });
        self.notify(
            seq,
            owner,
            NotificationKind::Request,
            "New borrow request",
            format!("{} wants to borrow \"{}\"", borrower.name, item.title),
            Some(request_id),
        )
        .await
    }

    async fn handle_message(&self, event: &MarketEvent, seq: u64, is_image: bool) -> Result<()> {
        let actor = require(event.actor, "actor", "message")?;
        let request_id = require(event.request, "request", "message")?;
        let content = require(event.note.clone(), "note", "message")?;

        let Some(mut request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring message for unknown request");
            return Ok(());
        };
        let Some(counterparty) = request.counterparty(actor) else {
            debug!(request = request_id, actor, "sender is not a participant");
            return Ok(());
        };
        let prior_status = request.status;
        if let Err(e) = request.note_message(seq) {
            debug!(request = request_id, error = %e, "ignoring message");
            return Ok(());
        }

        let message = if is_image {
            Message::image(seq, request_id, actor, content.clone())
        } else {
            Message::text(seq, request_id, actor, content.clone())
        };
        self.stores.conversations.append(message).await?;
        let status = request.status;
        self.stores.requests.store(request).await?;

        self.feed.publish(ChangeEvent::MessagePosted {
            request_id,
            message_id: seq,
        });
        if status != prior_status {
            self.feed.publish(ChangeEvent::RequestChanged {
                request_id,
                status,
            });
        }
        self.notify(
            seq,
            counterparty,
            NotificationKind::Message,
            "New message",
            content,
            Some(request_id),
        )
        .await
    }

    async fn handle_offer(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "offer")?;
        let request_id = require(event.request, "request", "offer")?;
        let amount = require(event.amount, "amount", "offer")?;
        let days = require(event.days, "days", "offer")?;
        let rate = amount.try_into()?;

        let Some(mut request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring offer for unknown request");
            return Ok(());
        };
        let Some(counterparty) = request.counterparty(actor) else {
            debug!(request = request_id, actor, "sender is not a participant");
            return Ok(());
        };
        if let Err(e) = request.note_offer(days, seq) {
            debug!(request = request_id, error = %e, "ignoring offer");
            return Ok(());
        }

        let unit = self.rate_unit(request.item_id).await?;
        let message = Message::offer(seq, request_id, actor, rate, days, unit);
        let preview = message.content.clone();
        self.stores.conversations.append(message).await?;
        let status = request.status;
        self.stores.requests.store(request).await?;

        self.feed.publish(ChangeEvent::MessagePosted {
            request_id,
            message_id: seq,
        });
        self.feed.publish(ChangeEvent::RequestChanged {
            request_id,
            status,
        });
        self.notify(
            seq,
            counterparty,
            NotificationKind::Offer,
            "New counter-offer",
            preview,
            Some(request_id),
        )
        .await
    }

    async fn handle_accept_offer(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "accept_offer")?;
        let request_id = require(event.request, "request", "accept_offer")?;

        let Some(mut request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring acceptance of unknown request");
            return Ok(());
        };
        if request.counterparty(actor).is_none() {
            debug!(request = request_id, actor, "sender is not a participant");
            return Ok(());
        }
        let Some(offer) = self.stores.conversations.latest_offer(request_id).await? else {
            debug!(request = request_id, "no offer to accept");
            return Ok(());
        };
        if offer.sender == Some(actor) {
            debug!(request = request_id, actor, "cannot accept own offer");
            return Ok(());
        }
        let (Some(rate), Some(days)) = (offer.offer_rate, offer.offer_days) else {
            debug!(request = request_id, "offer message carries no terms");
            return Ok(());
        };
        if let Err(e) = request.accept_terms(rate, days, seq) {
            debug!(request = request_id, error = %e, "ignoring offer acceptance");
            return Ok(());
        }

        let unit = self.rate_unit(request.item_id).await?;
        let terms = format!("Offer accepted! Final terms: ${rate}/{unit} for {days} days");
        self.stores
            .conversations
            .append(Message::system(seq, request_id, terms.clone()))
            .await?;
        let status = request.status;
        self.stores.requests.store(request).await?;

        self.feed.publish(ChangeEvent::MessagePosted {
            request_id,
            message_id: seq,
        });
        self.feed.publish(ChangeEvent::RequestChanged {
            request_id,
            status,
        });
        if let Some(sender) = offer.sender {
            self.notify(
                seq,
                sender,
                NotificationKind::Offer,
                "Offer accepted",
                terms,
                Some(request_id),
            )
            .await?;
        }
        Ok(())
    }

    async fn handle_decision(&self, event: &MarketEvent, seq: u64, accept: bool) -> Result<()> {
        let kind = if accept { "accept" } else { "reject" };
        let actor = require(event.actor, "actor", kind)?;
        let request_id = require(event.request, "request", kind)?;

        let Some(mut request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring decision on unknown request");
            return Ok(());
        };
        if actor != request.owner {
            debug!(request = request_id, actor, "only the owner decides");
            return Ok(());
        }
        let outcome = if accept {
            request.accept(seq)
        } else {
            request.reject(seq)
        };
        if let Err(e) = outcome {
            debug!(request = request_id, error = %e, "ignoring decision");
            return Ok(());
        }

        let verdict = if accept {
            "Request accepted by owner"
        } else {
            "Request rejected by owner"
        };
        self.stores
            .conversations
            .append(Message::system(seq, request_id, verdict.to_string()))
            .await?;
        let status = request.status;
        let borrower = request.borrower;
        self.stores.requests.store(request).await?;

        self.feed.publish(ChangeEvent::RequestChanged {
            request_id,
            status,
        });
        let title = if accept {
            "Request accepted"
        } else {
            "Request declined"
        };
        self.notify(
            seq,
            borrower,
            NotificationKind::Request,
            title,
            verdict.to_string(),
            Some(request_id),
        )
        .await
    }

    async fn handle_cancel(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "cancel")?;
        let request_id = require(event.request, "request", "cancel")?;

        let Some(mut request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring cancel of unknown request");
            return Ok(());
        };
        if actor != request.borrower {
            debug!(request = request_id, actor, "only the borrower cancels");
            return Ok(());
        }
        if let Err(e) = request.cancel(seq) {
            debug!(request = request_id, error = %e, "ignoring cancel");
            return Ok(());
        }

        let status = request.status;
        let owner = request.owner;
        self.stores.requests.store(request).await?;
        self.feed.publish(ChangeEvent::RequestChanged {
            request_id,
            status,
        });
        self.notify(
            seq,
            owner,
            NotificationKind::Request,
            "Request cancelled",
            "The borrower withdrew the request".to_string(),
            Some(request_id),
        )
        .await
    }

    async fn handle_request_payment(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "request_payment")?;
        let request_id = require(event.request, "request", "request_payment")?;

        let Some(request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring payment request for unknown request");
            return Ok(());
        };
        if actor != request.owner {
            debug!(request = request_id, actor, "only the owner requests payment");
            return Ok(());
        }
        if !request.payment_due() {
            debug!(request = request_id, "no payment due");
            return Ok(());
        }

        let message = Message::payment_request(seq, request_id, actor, request.total_cost);
        let preview = message.content.clone();
        self.stores.conversations.append(message).await?;

        self.feed.publish(ChangeEvent::MessagePosted {
            request_id,
            message_id: seq,
        });
        self.notify(
            seq,
            request.borrower,
            NotificationKind::Payment,
            "Payment requested",
            preview,
            Some(request_id),
        )
        .await
    }

    async fn handle_pay(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "pay")?;
        let request_id = require(event.request, "request", "pay")?;

        let Some(mut request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring payment for unknown request");
            return Ok(());
        };
        if actor != request.borrower {
            debug!(request = request_id, actor, "only the borrower pays");
            return Ok(());
        }
        if !request.payment_due() {
            debug!(request = request_id, "ignoring payment, none due");
            return Ok(());
        }

        let intent = self
            .gateway
            .create_intent(request_id, request.total_cost)
            .await?;
        debug!(request = request_id, intent = %intent.id, url = %intent.checkout_url, "payment intent created");
        if let Err(e) = request.settle_payment(seq) {
            debug!(request = request_id, error = %e, "ignoring payment");
            return Ok(());
        }

        let status = request.status;
        let owner = request.owner;
        let total = request.total_cost;
        self.stores.requests.store(request).await?;
        self.feed.publish(ChangeEvent::RequestChanged {
            request_id,
            status,
        });
        self.notify(
            seq,
            owner,
            NotificationKind::Payment,
            "Payment received",
            format!("Payment of ${total} received (intent {})", intent.id),
            Some(request_id),
        )
        .await
    }

    async fn handle_complete(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "complete")?;
        let request_id = require(event.request, "request", "complete")?;

        let Some(mut request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring completion of unknown request");
            return Ok(());
        };
        let Some(counterparty) = request.counterparty(actor) else {
            debug!(request = request_id, actor, "actor is not a participant");
            return Ok(());
        };
        let returned = event.date.unwrap_or_else(|| request.end_date());
        if let Err(e) = request.complete(returned, seq) {
            debug!(request = request_id, error = %e, "ignoring completion");
            return Ok(());
        }

        let status = request.status;
        self.stores.requests.store(request).await?;
        self.feed.publish(ChangeEvent::RequestChanged {
            request_id,
            status,
        });
        self.notify(
            seq,
            counterparty,
            NotificationKind::Request,
            "Order completed",
            "The rental was marked as returned".to_string(),
            Some(request_id),
        )
        .await
    }

    async fn handle_sweep(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let today = require(event.date, "date", "sweep")?;
        for mut request in self.stores.requests.get_all().await? {
            if request.mark_overdue(today, seq) {
                let request_id = request.id;
                let status = request.status;
                self.stores.requests.store(request).await?;
                self.feed.publish(ChangeEvent::RequestChanged {
                    request_id,
                    status,
                });
            }
        }
        Ok(())
    }

    async fn handle_review(&self, event: &MarketEvent, seq: u64) -> Result<()> {
        let actor = require(event.actor, "actor", "review")?;
        let request_id = require(event.request, "request", "review")?;
        let rating = Rating::new(require(event.rating, "rating", "review")?)?;

        let Some(request) = self.stores.requests.get(request_id).await? else {
            debug!(request = request_id, "ignoring review of unknown request");
            return Ok(());
        };
        let Some(reviewee) = request.counterparty(actor) else {
            debug!(request = request_id, actor, "reviewer is not a participant");
            return Ok(());
        };
        if !request.reviewable() {
            debug!(request = request_id, "request is not completed yet");
            return Ok(());
        }
        if self.stores.reviews.exists(request_id, actor).await? {
            debug!(request = request_id, actor, "duplicate review ignored");
            return Ok(());
        }

        let review = Review::new(request_id, actor, reviewee, rating, event.note.clone());
        self.stores.reviews.store(review).await?;

        let mut profile = self.ensure_profile(reviewee).await?;
        profile.record_rating(rating);
        self.stores.profiles.store(profile).await?;

        self.notify(
            seq,
            reviewee,
            NotificationKind::Review,
            "New review",
            format!("You received a {}-star review", rating.value()),
            Some(request_id),
        )
        .await
    }

    /// Fetches a profile, registering a placeholder one on first sight.
    async fn ensure_profile(&self, id: u64) -> Result<Profile> {
        if let Some(profile) = self.stores.profiles.get(id).await? {
            return Ok(profile);
        }
        let profile = Profile::new(id, default_name(id));
        self.stores.profiles.store(profile.clone()).await?;
        Ok(profile)
    }

    async fn rate_unit(&self, item_id: u64) -> Result<&'static str> {
        Ok(self
            .stores
            .items
            .get(item_id)
            .await?
            .map(|item| item.rate_unit())
            .unwrap_or("day"))
    }

    async fn notify(
        &self,
        seq: u64,
        user: u64,
        kind: NotificationKind,
        title: &str,
        body: String,
        related_request: Option<u64>,
    ) -> Result<()> {
        self.ensure_profile(user).await?;
        let notification = Notification::new(seq, user, kind, title, body, related_request);
        self.stores.notifications.push(notification).await?;
        self.feed.publish(ChangeEvent::NotificationCreated {
            user,
            notification_id: seq,
        });
        Ok(())
    }
}

fn default_name(id: u64) -> String {
    format!("member-{id}")
}

fn require<T>(value: Option<T>, field: &str, event: &str) -> Result<T> {
    value.ok_or_else(|| {
        MarketError::ValidationError(format!("{event} event is missing the {field} field"))
    })
}
