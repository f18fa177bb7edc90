//! Aggregate statistics over one user's job applications.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of jobs in each pipeline status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub wishlist: u64,
    pub applied: u64,
    pub interview: u64,
    pub offered: u64,
    pub accepted: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.wishlist + self.applied + self.interview + self.offered + self.accepted
    }
}

/// A name with its occurrence count, used for the top-N lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RankedEntry {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalytics {
    pub total: u64,
    pub total_in_progress: u64,
    pub status_counts: StatusCounts,
    /// Percentages rounded to one decimal place.
    pub interview_rate: f64,
    pub offer_rate: f64,
    pub acceptance_rate: f64,
    pub this_week: u64,
    pub this_month: u64,
    pub top_companies: Vec<RankedEntry>,
    pub top_locations: Vec<RankedEntry>,
}
