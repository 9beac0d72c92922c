// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard layout.
//!
//! Only the market tool exists so far; the other sections are shown
//! disabled so the frontend can render them as "coming soon".

use crate::models::{Dashboard, DashboardSection, SectionType};

#[derive(Debug, Clone, Default)]
pub struct DashboardService;

impl DashboardService {
    pub fn new() -> Self {
        Self
    }

    /// Dashboard for `user_id`. The layout is currently the same for everyone.
    pub fn dashboard_for(&self, user_id: &str) -> Dashboard {
        tracing::debug!(user_id, "Building dashboard");

        Dashboard {
            sections: vec![
                section(
                    "market-1",
                    "Market Observer",
                    "Track Steam market prices and items",
                    SectionType::Market,
                    "shopping_cart",
                    true,
                ),
                section(
                    "parser-1",
                    "Media Parser",
                    "Content parsing and analytics",
                    SectionType::Parser,
                    "analytics",
                    false,
                ),
                section(
                    "routine-1",
                    "Routine Tasks",
                    "Automation of routine actions",
                    SectionType::Routine,
                    "assignment",
                    false,
                ),
            ],
        }
    }
}

fn section(
    id: &str,
    title: &str,
    description: &str,
    section_type: SectionType,
    icon: &str,
    is_enabled: bool,
) -> DashboardSection {
    DashboardSection {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        section_type,
        icon: icon.to_string(),
        is_enabled,
    }
}
