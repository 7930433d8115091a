use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::meeting;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingCreateRequest {
    pub title: String,
    pub meeting_type: String,
    pub agenda: String,
    pub meeting_date: DateTime<Utc>,
    pub location: String,
    pub organizer_id: Uuid,
    #[serde(default)]
    pub attendees: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPublishRequest {
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingView {
    #[serde(flatten)]
    pub meeting: meeting::Model,
    pub attendees: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionCreateRequest {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRequest {
    pub document_type: String,
    pub document_id: Uuid,
    pub signer_id: Uuid,
    pub signature_hash: String,
    pub ip_address: Option<IpAddr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureFilter {
    pub signer_id: Option<Uuid>,
    pub document_type: Option<String>,
    pub document_id: Option<Uuid>,
}
