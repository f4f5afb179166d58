//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on extraction, role checks and localized
//! responses. Every service error implements [`crate::error::ErrorCode`].

pub mod batch;
pub mod dashboard;
pub mod email_auth;
pub mod event;
pub mod farm;
pub mod mailer;
pub mod product;
pub mod profile;
pub mod qr;
pub mod session;
pub mod sweeper;
pub mod validate;
pub mod verification;
