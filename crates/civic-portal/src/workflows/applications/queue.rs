use std::fmt;
use std::str::FromStr;

use super::domain::{ApplicationRecord, ApplicationStatus, UnknownStatus};

/// Status selector on the operator's filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    /// Buttons offered on the filter bar, in display order.
    pub const OPTIONS: [StatusFilter; 7] = [
        StatusFilter::All,
        StatusFilter::Only(ApplicationStatus::Pending),
        StatusFilter::Only(ApplicationStatus::Submitted),
        StatusFilter::Only(ApplicationStatus::InReview),
        StatusFilter::Only(ApplicationStatus::PendingConfirmation),
        StatusFilter::Only(ApplicationStatus::Confirmed),
        StatusFilter::Only(ApplicationStatus::Rejected),
    ];

    pub const fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn matches(self, status: ApplicationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        raw.parse().map(StatusFilter::Only)
    }
}

/// Operator-side narrowing of the listing by status and free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationQuery {
    pub status: StatusFilter,
    pub search: String,
}

impl ApplicationQuery {
    pub fn new(status: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            status,
            search: search.into(),
        }
    }

    /// Name matches case-insensitively, mobile by plain substring. A blank query matches all.
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        self.status.matches(record.status) && self.matches_search(record)
    }

    fn matches_search(&self, record: &ApplicationRecord) -> bool {
        let needle = self.search.trim();
        if needle.is_empty() {
            return true;
        }

        let lowered = needle.to_lowercase();
        let name_hit = record
            .applicant_name()
            .is_some_and(|name| name.to_lowercase().contains(&lowered));
        let mobile_hit = record
            .applicant_mobile()
            .is_some_and(|mobile| mobile.contains(needle));
        name_hit || mobile_hit
    }

    pub fn apply<'a>(&self, records: &'a [ApplicationRecord]) -> Vec<&'a ApplicationRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Count shown next to a filter button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub filter: StatusFilter,
    pub count: usize,
}

/// Counts over the unfiltered listing, one per filter-bar option.
pub fn status_counts(records: &[ApplicationRecord]) -> Vec<StatusCount> {
    StatusFilter::OPTIONS
        .into_iter()
        .map(|filter| StatusCount {
            filter,
            count: records
                .iter()
                .filter(|record| filter.matches(record.status))
                .count(),
        })
        .collect()
}
