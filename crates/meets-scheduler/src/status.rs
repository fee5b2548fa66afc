//! Meet and attendee status definitions — the data model the scheduler reads.

use chrono::{DateTime, Utc};
use std::fmt;

/// Lifecycle state of a meet. Discriminants match the store's status lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeetStatus {
    /// Not yet published; invisible to the public.
    Draft = 1,
    /// Visible but signups not yet open.
    Published = 2,
    /// Accepting signups.
    Open = 3,
    /// No longer accepting signups.
    Closed = 4,
    /// Cancelled by the organizer.
    Cancelled = 5,
    /// Postponed by the organizer.
    Postponed = 6,
    /// The activity has ended.
    Completed = 7,
}

impl MeetStatus {
    pub const ALL: [MeetStatus; 7] = [
        Self::Draft,
        Self::Published,
        Self::Open,
        Self::Closed,
        Self::Cancelled,
        Self::Postponed,
        Self::Completed,
    ];

    /// `status_id` value in the store.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Position in the forward-only lifecycle. Closed, Cancelled and Postponed share a rank.
    pub fn rank(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Published => 1,
            Self::Open => 2,
            Self::Closed | Self::Cancelled | Self::Postponed => 3,
            Self::Completed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
            Self::Postponed => "postponed",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for MeetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attendee signup status, stored as text in `attendee.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeStatus {
    Pending,
    Confirmed,
    Waitlisted,
    Cancelled,
    Rejected,
    CheckedIn,
    Attended,
}

impl AttendeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Waitlisted => "waitlisted",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::CheckedIn => "checked-in",
            Self::Attended => "attended",
        }
    }
}

impl fmt::Display for AttendeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scheduler-relevant columns of a meet row.
#[derive(Debug, Clone)]
pub struct Meet {
    pub id: String,
    pub status: MeetStatus,
    /// When signups open (Published → Open).
    pub opening_date: Option<DateTime<Utc>>,
    /// Signup deadline (Open → Closed).
    pub closing_date: Option<DateTime<Utc>>,
    /// When the activity ends (→ Completed).
    pub end_time: Option<DateTime<Utc>>,
    /// Waitlist capacity (Open → Closed when reached).
    pub waitlist_size: Option<i32>,
}

impl Meet {
    pub fn new(id: &str, status: MeetStatus) -> Self {
        Self {
            id: id.to_string(),
            status,
            opening_date: None,
            closing_date: None,
            end_time: None,
            waitlist_size: None,
        }
    }

    pub fn opening(mut self, at: DateTime<Utc>) -> Self {
        self.opening_date = Some(at);
        self
    }

    pub fn closing(mut self, at: DateTime<Utc>) -> Self {
        self.closing_date = Some(at);
        self
    }

    pub fn ending(mut self, at: DateTime<Utc>) -> Self {
        self.end_time = Some(at);
        self
    }

    pub fn waitlist(mut self, size: i32) -> Self {
        self.waitlist_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_lookup_table() {
        let codes: Vec<i32> = MeetStatus::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(MeetStatus::from_code(3), Some(MeetStatus::Open));
        assert_eq!(MeetStatus::from_code(0), None);
        assert_eq!(MeetStatus::from_code(8), None);
    }

    #[test]
    fn test_rank_ordering() {
        assert!(MeetStatus::Draft.rank() < MeetStatus::Published.rank());
        assert!(MeetStatus::Published.rank() < MeetStatus::Open.rank());
        assert!(MeetStatus::Open.rank() < MeetStatus::Closed.rank());
        assert_eq!(MeetStatus::Closed.rank(), MeetStatus::Postponed.rank());
        assert!(MeetStatus::Cancelled.rank() < MeetStatus::Completed.rank());
    }

    #[test]
    fn test_display_matches_stored_text() {
        assert_eq!(MeetStatus::Completed.to_string(), "completed");
        assert_eq!(AttendeeStatus::CheckedIn.to_string(), "checked-in");
        assert_eq!(AttendeeStatus::Waitlisted.as_str(), "waitlisted");
    }
}
