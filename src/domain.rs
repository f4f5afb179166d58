//! Batch lifecycle and user roles.
//!
//! DESIGN
//! ======
//! A batch moves strictly forward through
//! `harvested → processed → in_transit → delivered → verified`, one step at a
//! time. Who may take each step depends on the actor's role; `verified` is
//! only ever reached through a consumer scan, never set by hand.
//!
//! Both enums map onto Postgres enum types (`product_status`, `user_role`)
//! and cross the wire as their snake_case names.

use serde::{Deserialize, Serialize};

// =============================================================================
// BATCH STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
pub enum BatchStatus {
    Harvested,
    Processed,
    InTransit,
    Delivered,
    Verified,
}

impl BatchStatus {
    /// Every status in lifecycle order.
    pub const ALL: [BatchStatus; 5] = [
        BatchStatus::Harvested,
        BatchStatus::Processed,
        BatchStatus::InTransit,
        BatchStatus::Delivered,
        BatchStatus::Verified,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Harvested => "harvested",
            Self::Processed => "processed",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Verified => "verified",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "harvested" => Some(Self::Harvested),
            "processed" => Some(Self::Processed),
            "in_transit" => Some(Self::InTransit),
            "delivered" => Some(Self::Delivered),
            "verified" => Some(Self::Verified),
            _ => None,
        }
    }

    /// Translation key for the status badge.
    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Harvested => "status_harvested",
            Self::Processed => "status_processed",
            Self::InTransit => "status_in_transit",
            Self::Delivered => "status_delivered",
            Self::Verified => "status_verified",
        }
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Harvested => Some(Self::Processed),
            Self::Processed => Some(Self::InTransit),
            Self::InTransit => Some(Self::Delivered),
            Self::Delivered => Some(Self::Verified),
            Self::Verified => None,
        }
    }

    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Still moving through the chain. Counted as "active" on the farmer dashboard.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Delivered | Self::Verified)
    }

    /// Event type written to the timeline when a batch enters this status.
    #[must_use]
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Harvested => EVENT_HARVEST_REGISTERED,
            Self::Processed => "processed",
            Self::InTransit => "shipped",
            Self::Delivered => "delivered",
            Self::Verified => EVENT_CONSUMER_VERIFIED,
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const EVENT_HARVEST_REGISTERED: &str = "harvest_registered";
pub const EVENT_CONSUMER_VERIFIED: &str = "consumer_verified";

// =============================================================================
// USER ROLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Farmer,
    Distributor,
    Consumer,
}

impl UserRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Distributor => "distributor",
            Self::Consumer => "consumer",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "farmer" => Some(Self::Farmer),
            "distributor" => Some(Self::Distributor),
            "consumer" => Some(Self::Consumer),
            _ => None,
        }
    }

    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Farmer => "role_farmer",
            Self::Distributor => "role_distributor",
            Self::Consumer => "role_consumer",
        }
    }

    #[must_use]
    pub fn can_manage_farms(self) -> bool {
        self == Self::Farmer
    }

    #[must_use]
    pub fn can_register_batches(self) -> bool {
        self == Self::Farmer
    }

    #[must_use]
    pub fn can_edit_catalogue(self) -> bool {
        matches!(self, Self::Farmer | Self::Distributor)
    }

    /// Whether this role may move a batch *into* `target`.
    #[must_use]
    pub fn can_advance_to(self, target: BatchStatus) -> bool {
        matches!(
            (self, target),
            (Self::Farmer, BatchStatus::Processed)
                | (Self::Distributor, BatchStatus::Processed | BatchStatus::InTransit | BatchStatus::Delivered)
        )
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod tests;
