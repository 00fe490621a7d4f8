//! Transient user-facing notifications.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
const MAX_NOTIFICATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    created: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= NOTIFICATION_TTL
    }
}

/// Queue of live notifications, newest last.
#[derive(Debug, Default)]
pub struct Notifications {
    items: VecDeque<Notification>,
}

impl Notifications {
    pub fn info(&mut self, title: &str, description: impl Into<String>) {
        self.push(title, description.into(), Variant::Default);
    }

    pub fn error(&mut self, title: &str, description: impl Into<String>) {
        self.push(title, description.into(), Variant::Destructive);
    }

    fn push(&mut self, title: &str, description: String, variant: Variant) {
        match variant {
            Variant::Default => log::info!("{title}: {description}"),
            Variant::Destructive => log::warn!("{title}: {description}"),
        }
        self.items.push_back(Notification {
            title: title.to_string(),
            description,
            variant,
            created: Instant::now(),
        });
        while self.items.len() > MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
    }

    /// Drops expired notifications.
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|item| !item.is_expired(now));
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Shortens `text` to `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
