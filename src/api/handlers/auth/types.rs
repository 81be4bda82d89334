//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::session::{Principal, SessionTokens};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by both login and refresh; refresh reuses the same refresh-token
/// value it was called with.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionTokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<Uuid>,
}

impl From<SessionTokens> for SessionTokensResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            username: tokens.username,
            household_id: tokens.household_id,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub account_id: Uuid,
    pub username: String,
    pub device_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<Uuid>,
}

impl From<Principal> for MeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            account_id: principal.account_id,
            username: principal.username,
            device_id: principal.device_id,
            household_id: principal.household_id,
        }
    }
}
