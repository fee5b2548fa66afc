//! Lifecycle phases — the four bulk transition rules, applied in order.
//!
//! Each phase is one `UPDATE` whose `WHERE` clause re-checks the source state,
//! so a row already moved by a concurrent pass simply no longer matches.

use std::fmt;

use crate::status::{AttendeeStatus, MeetStatus};

/// SQL flavour, only the bind placeholder differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Placeholder for the single `now` parameter.
    fn now_param(self) -> &'static str {
        match self {
            Self::Sqlite => "?1",
            Self::Postgres => "$1",
        }
    }
}

/// One transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Published → Open once `opening_date` has passed.
    Open,
    /// Open → Closed once `closing_date` has passed.
    CloseByDate,
    /// Open → Closed once the waitlist holds `waitlist_size` attendees.
    CloseByWaitlist,
    /// Published/Open/Closed → Completed once `end_time` has passed.
    Archive,
}

impl Phase {
    /// Execution order within a pass.
    pub const ALL: [Phase; 4] = [
        Self::Open,
        Self::CloseByDate,
        Self::CloseByWaitlist,
        Self::Archive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::CloseByDate => "close_by_date",
            Self::CloseByWaitlist => "close_by_waitlist",
            Self::Archive => "archive",
        }
    }

    /// States a meet must be in for this phase to touch it.
    pub fn sources(self) -> &'static [MeetStatus] {
        match self {
            Self::Open => &[MeetStatus::Published],
            Self::CloseByDate | Self::CloseByWaitlist => &[MeetStatus::Open],
            Self::Archive => &[MeetStatus::Open, MeetStatus::Closed, MeetStatus::Published],
        }
    }

    pub fn target(self) -> MeetStatus {
        match self {
            Self::Open => MeetStatus::Open,
            Self::CloseByDate | Self::CloseByWaitlist => MeetStatus::Closed,
            Self::Archive => MeetStatus::Completed,
        }
    }

    /// The bulk statement for this phase. Binds exactly one parameter: `now`.
    pub fn statement(self, dialect: Dialect) -> String {
        let now = dialect.now_param();
        let target = self.target().code();
        let sources = self.source_list();
        match self {
            Self::Open => format!(
                "UPDATE meet SET status_id = {target}, updated_at = {now} \
                 WHERE status_id IN ({sources}) \
                 AND opening_date IS NOT NULL AND opening_date <= {now}"
            ),
            Self::CloseByDate => format!(
                "UPDATE meet SET status_id = {target}, updated_at = {now} \
                 WHERE status_id IN ({sources}) \
                 AND closing_date IS NOT NULL AND closing_date <= {now}"
            ),
            // LEFT JOIN so meets without waitlisted rows count as 0.
            Self::CloseByWaitlist => format!(
                "UPDATE meet SET status_id = {target}, updated_at = {now} \
                 WHERE id IN (\
                 SELECT m.id FROM meet m \
                 LEFT JOIN (\
                 SELECT meet_id, COUNT(*) AS waitlisted FROM attendee \
                 WHERE status = '{waitlisted}' GROUP BY meet_id\
                 ) w ON w.meet_id = m.id \
                 WHERE m.status_id IN ({sources}) \
                 AND m.waitlist_size IS NOT NULL \
                 AND COALESCE(w.waitlisted, 0) >= m.waitlist_size\
                 )",
                waitlisted = AttendeeStatus::Waitlisted.as_str(),
            ),
            Self::Archive => format!(
                "UPDATE meet SET status_id = {target}, updated_at = {now} \
                 WHERE status_id IN ({sources}) \
                 AND end_time IS NOT NULL AND end_time <= {now}"
            ),
        }
    }

    fn source_list(self) -> String {
        self.sources()
            .iter()
            .map(|s| s.code().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
