//! Unread notification badge.
//!
//! Counts cart additions since the user last acknowledged them. The count
//! lives only as long as the process.

/// Counter shown on the notification badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationCounter(u32);

impl NotificationCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub const fn reset(&mut self) {
        self.0 = 0;
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}
