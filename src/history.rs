//! Audit history entries
//!
//! Builds the rows written to the history table. Writing them is the store's
//! job; this module only fixes the action vocabulary and the detail format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions recorded in the history table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserLogin,
    PersonilImported,
    PersonilExported,
    PersonilCreated,
    PersonilUpdated,
    PersonilDeleted,
    OtpRequested,
    OtpVerified,
    DataExported,
    DataImported,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::UserCreated => "USER_CREATED",
            ActionType::UserUpdated => "USER_UPDATED",
            ActionType::UserDeleted => "USER_DELETED",
            ActionType::UserLogin => "USER_LOGIN",
            ActionType::PersonilImported => "PERSONIL_IMPORTED",
            ActionType::PersonilExported => "PERSONIL_EXPORTED",
            ActionType::PersonilCreated => "PERSONIL_CREATED",
            ActionType::PersonilUpdated => "PERSONIL_UPDATED",
            ActionType::PersonilDeleted => "PERSONIL_DELETED",
            ActionType::OtpRequested => "OTP_REQUESTED",
            ActionType::OtpVerified => "OTP_VERIFIED",
            ActionType::DataExported => "DATA_EXPORTED",
            ActionType::DataImported => "DATA_IMPORTED",
        }
    }
}

/// Row ready to hand to the history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub user_id: Option<u32>,
    pub personil_id: Option<u32>,
    pub action: ActionType,
    pub detail: Option<String>,
}

/// Builder for a history row
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    user_id: Option<u32>,
    personil_id: Option<u32>,
    action: ActionType,
    detail: Option<String>,
    request: Option<Value>,
    response: Option<Value>,
}

impl HistoryEntry {
    pub fn new(action: ActionType) -> Self {
        Self {
            user_id: None,
            personil_id: None,
            action,
            detail: None,
            request: None,
            response: None,
        }
    }

    pub fn by_user(mut self, user_id: u32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn for_personil(mut self, personil_id: Option<u32>) -> Self {
        self.personil_id = personil_id;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request(mut self, request: Value) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    /// Detail text: the plain detail, or `detail | Request: {..} | Response: {..}`
    /// when request or response data is attached
    pub fn detail_text(&self) -> Option<String> {
        if self.request.is_none() && self.response.is_none() {
            return self.detail.clone();
        }

        let mut parts = Vec::new();
        if let Some(detail) = &self.detail {
            parts.push(detail.clone());
        }
        if let Some(request) = &self.request {
            parts.push(format!("Request: {}", request));
        }
        if let Some(response) = &self.response {
            parts.push(format!("Response: {}", response));
        }
        Some(parts.join(" | "))
    }

    pub fn into_record(self) -> HistoryRecord {
        HistoryRecord {
            detail: self.detail_text(),
            user_id: self.user_id,
            personil_id: self.personil_id,
            action: self.action,
        }
    }
}
