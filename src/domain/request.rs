use crate::domain::item::Item;
use crate::domain::money::{Money, Rate};
use crate::error::MarketError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Negotiating,
    Accepted,
    Rejected,
    Cancelled,
    Active,
    Completed,
    Overdue,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Negotiating => "negotiating",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Active => "active",
            RequestStatus::Completed => "completed",
            RequestStatus::Overdue => "overdue",
        }
    }

    /// Whether the negotiation chat is still open for new messages.
    pub fn is_open_for_chat(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Negotiating)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
}

/// A proposed rental of an item or service between two members.
///
/// Owns the status state machine: every transition is a method returning
/// `Result`, so an invalid step can never be written back to storage. The
/// negotiated rate and duration are recorded only when an offer is accepted
/// and `total_cost` is recomputed at that moment, so the total always equals
/// the effective rate times the effective duration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BorrowRequest {
    pub id: u64,
    pub item_id: u64,
    pub borrower: u64,
    pub owner: u64,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub listing_rate: Rate,
    pub negotiated_rate: Option<Rate>,
    pub negotiated_days: Option<u32>,
    pub total_cost: Money,
    pub payment_status: PaymentStatus,
    pub actual_return_date: Option<NaiveDate>,
    /// Engine sequence number of the last activity, used for ordering.
    pub last_activity: u64,
}

impl BorrowRequest {
    pub fn open(
        id: u64,
        item: &Item,
        borrower: u64,
        start_date: NaiveDate,
        duration_days: u32,
        message: Option<String>,
        seq: u64,
    ) -> Result<Self, MarketError> {
        if item.owner == borrower {
            return Err(MarketError::ValidationError(
                "Cannot borrow your own listing".to_string(),
            ));
        }
        if !item.is_available {
            return Err(MarketError::ValidationError(format!(
                "Item {} is not available",
                item.id
            )));
        }
        if duration_days == 0 {
            return Err(MarketError::ValidationError(
                "Duration must be at least one day".to_string(),
            ));
        }
        Ok(Self {
            id,
            item_id: item.id,
            borrower,
            owner: item.owner,
            start_date,
            duration_days,
            message,
            status: RequestStatus::Pending,
            listing_rate: item.rate,
            negotiated_rate: None,
            negotiated_days: None,
            total_cost: item.rate.total_for_days(duration_days),
            payment_status: PaymentStatus::Pending,
            actual_return_date: None,
            last_activity: seq,
        })
    }

    pub fn effective_rate(&self) -> Rate {
        self.negotiated_rate.unwrap_or(self.listing_rate)
    }

    pub fn effective_days(&self) -> u32 {
        self.negotiated_days.unwrap_or(self.duration_days)
    }

    pub fn end_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.effective_days())))
            .unwrap_or(NaiveDate::MAX)
    }

    /// The other side of the transaction, or `None` for a non-participant.
    pub fn counterparty(&self, user: u64) -> Option<u64> {
        if user == self.borrower {
            Some(self.owner)
        } else if user == self.owner {
            Some(self.borrower)
        } else {
            None
        }
    }

    pub fn payment_due(&self) -> bool {
        self.status == RequestStatus::Accepted && self.payment_status == PaymentStatus::Pending
    }

    /// A plain chat message landed; a pending request moves into negotiation.
    pub fn note_message(&mut self, seq: u64) -> Result<(), MarketError> {
        if !self.status.is_open_for_chat() {
            return Err(self.transition_error("message"));
        }
        self.status = RequestStatus::Negotiating;
        self.touch(seq);
        Ok(())
    }

    /// A counter-offer landed in the chat. The proposed terms live on the
    /// offer message until accepted; the request only moves into
    /// negotiation so the listing terms stay effective.
    pub fn note_offer(&mut self, days: u32, seq: u64) -> Result<(), MarketError> {
        if !self.status.is_open_for_chat() {
            return Err(self.transition_error("offer"));
        }
        if days == 0 {
            return Err(MarketError::ValidationError(
                "Offer duration must be at least one day".to_string(),
            ));
        }
        self.status = RequestStatus::Negotiating;
        self.touch(seq);
        Ok(())
    }

    /// Locks in the given offer terms and recomputes the total.
    pub fn accept_terms(&mut self, rate: Rate, days: u32, seq: u64) -> Result<(), MarketError> {
        if self.status != RequestStatus::Negotiating {
            return Err(self.transition_error("accept offer on"));
        }
        self.negotiated_rate = Some(rate);
        self.negotiated_days = Some(days);
        self.total_cost = rate.total_for_days(days);
        self.status = RequestStatus::Accepted;
        self.touch(seq);
        Ok(())
    }

    /// Direct acceptance by the owner, without an offer exchange.
    pub fn accept(&mut self, seq: u64) -> Result<(), MarketError> {
        if self.status != RequestStatus::Pending {
            return Err(self.transition_error("accept"));
        }
        self.status = RequestStatus::Accepted;
        self.touch(seq);
        Ok(())
    }

    pub fn reject(&mut self, seq: u64) -> Result<(), MarketError> {
        if !self.status.is_open_for_chat() {
            return Err(self.transition_error("reject"));
        }
        self.status = RequestStatus::Rejected;
        self.touch(seq);
        Ok(())
    }

    pub fn cancel(&mut self, seq: u64) -> Result<(), MarketError> {
        if !self.status.is_open_for_chat() {
            return Err(self.transition_error("cancel"));
        }
        self.status = RequestStatus::Cancelled;
        self.touch(seq);
        Ok(())
    }

    /// Payment cleared: the rental becomes active.
    pub fn settle_payment(&mut self, seq: u64) -> Result<(), MarketError> {
        if !self.payment_due() {
            return Err(self.transition_error("pay"));
        }
        self.payment_status = PaymentStatus::Completed;
        self.status = RequestStatus::Active;
        self.touch(seq);
        Ok(())
    }

    /// The item came back (possibly late).
    pub fn complete(&mut self, returned: NaiveDate, seq: u64) -> Result<(), MarketError> {
        if !matches!(self.status, RequestStatus::Active | RequestStatus::Overdue) {
            return Err(self.transition_error("complete"));
        }
        self.status = RequestStatus::Completed;
        self.actual_return_date = Some(returned);
        self.touch(seq);
        Ok(())
    }

    /// Flags an active rental whose end date has passed. Returns whether the
    /// status changed.
    pub fn mark_overdue(&mut self, today: NaiveDate, seq: u64) -> bool {
        if self.status == RequestStatus::Active && self.end_date() < today {
            self.status = RequestStatus::Overdue;
            self.touch(seq);
            true
        } else {
            false
        }
    }

    pub fn reviewable(&self) -> bool {
        self.status == RequestStatus::Completed
    }

    fn touch(&mut self, seq: u64) {
        self.last_activity = seq;
    }

    fn transition_error(&self, action: &str) -> MarketError {
        MarketError::ValidationError(format!(
            "Cannot {action} request {} in status {}",
            self.id, self.status
        ))
    }
}
