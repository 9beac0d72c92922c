// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard layout returned to the frontend.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of tool a dashboard section links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SectionType {
    Market,
    Parser,
    Routine,
}

/// One tile on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardSection {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    /// Material icon name
    pub icon: String,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Dashboard {
    pub sections: Vec<DashboardSection>,
}
