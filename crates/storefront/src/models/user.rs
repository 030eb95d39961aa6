//! User domain types.

use chrono::{DateTime, Utc};

use diamant_rouge_core::{Email, UserId};

/// A shopper account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
