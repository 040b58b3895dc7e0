use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Request,
    Message,
    Offer,
    Payment,
    Review,
}

/// An inbox entry for a member. Presentation (bell, toasts) is out of scope;
/// this is the durable record the realtime feed points at.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Notification {
    pub id: u64,
    pub user: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_request: Option<u64>,
    pub is_read: bool,
}

impl Notification {
    pub fn new(
        id: u64,
        user: u64,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        related_request: Option<u64>,
    ) -> Self {
        Self {
            id,
            user,
            kind,
            title: title.into(),
            body: body.into(),
            related_request,
            is_read: false,
        }
    }
}
