use uuid::Uuid;

use crate::types::money::Cents;

/// Registered account. Username is stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub cash: Cents,
}
