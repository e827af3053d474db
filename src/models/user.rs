use serde::{Deserialize, Serialize};

/// A registered customer as returned by the API. The password is never read back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response of both login endpoints: `{id, token?}` plus whatever else the server adds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub token: Option<String>,
}

pub const ADMIN_ROLE: &str = "ADMIN";

#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub id: i64,
    pub email: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminIdentity {
    pub id: i64,
    pub email: Option<String>,
    pub token: Option<String>,
}
