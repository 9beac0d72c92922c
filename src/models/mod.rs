// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod dashboard;
pub mod identity;
pub mod market;
pub mod user;

pub use dashboard::{Dashboard, DashboardSection, SectionType};
pub use identity::{ProviderIdentity, ProviderTokens};
pub use market::TrackedItem;
pub use user::{NewUser, User};
