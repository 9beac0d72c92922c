// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Steam market items tracked per user.

use crate::models::TrackedItem;

/// Market tracking service.
///
/// There is no item storage yet, so every user sees one placeholder item.
#[derive(Debug, Clone, Default)]
pub struct MarketService;

impl MarketService {
    pub fn new() -> Self {
        Self
    }

    pub fn tracked_items(&self, user_id: &str) -> Vec<TrackedItem> {
        vec![TrackedItem {
            id: "item-1".to_string(),
            name: "Stub AK-47 | Redline".to_string(),
            user_id: user_id.to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_belong_to_requesting_user() {
        let items = MarketService::new().tracked_items("user-42");
        assert!(!items.is_empty());
        assert!(items.iter().all(|item| item.user_id == "user-42"));
    }
}
