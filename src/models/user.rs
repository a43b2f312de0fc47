use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::UserId;
use crate::models::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub birthday: NaiveDate,
    /// Outgoing friend edges (friend id -> confirmed). Filled in on read,
    /// never written through the identity store.
    #[serde(default, skip_deserializing)]
    pub friends: BTreeMap<UserId, bool>,
}

impl User {
    pub fn new(email: &str, login: &str, name: Option<&str>, birthday: NaiveDate) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            login: login.to_string(),
            name: name.map(str::to_string),
            birthday,
            friends: BTreeMap::new(),
        }
    }

    /// Name shown to other users, the login when no name was given
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "user";
}
