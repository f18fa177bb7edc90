//! Analytics over a user's job list. Pure; nothing is persisted.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::models::{JobAnalytics, JobResponse, JobStatus, RankedEntry, StatusCounts};

/// Length of the top companies and top locations lists.
pub const TOP_N: usize = 5;

/// Percentage rounded to one decimal place; 0 when the denominator is 0.
fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let pct = numerator as f64 / denominator as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Count occurrences, then keep the most frequent. Ties keep first-seen order.
fn top_by_frequency(names: impl Iterator<Item = String>) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = Vec::new();
    for name in names {
        match entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.count += 1,
            None => entries.push(RankedEntry { name, count: 1 }),
        }
    }
    // sort_by is stable.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(TOP_N);
    entries
}

pub fn compute(jobs: &[JobResponse], now: DateTime<Utc>) -> JobAnalytics {
    let mut counts = StatusCounts::default();
    for job in jobs {
        match job.status {
            JobStatus::Wishlist => counts.wishlist += 1,
            JobStatus::Applied => counts.applied += 1,
            JobStatus::Interview => counts.interview += 1,
            JobStatus::Offered => counts.offered += 1,
            JobStatus::Accepted => counts.accepted += 1,
        }
    }

    let total = counts.total();
    let in_progress = total - counts.wishlist;
    let interviewed = counts.interview + counts.offered + counts.accepted;
    let offers = counts.offered + counts.accepted;

    let week_start = now - Duration::days(7);
    let this_week = jobs
        .iter()
        .filter(|j| j.application_date >= week_start && j.application_date <= now)
        .count() as u64;
    let this_month = jobs
        .iter()
        .filter(|j| {
            j.application_date.year() == now.year() && j.application_date.month() == now.month()
        })
        .count() as u64;

    JobAnalytics {
        total,
        total_in_progress: in_progress,
        interview_rate: rate(interviewed, in_progress),
        offer_rate: rate(offers, in_progress),
        acceptance_rate: rate(counts.accepted, offers),
        status_counts: counts,
        this_week,
        this_month,
        top_companies: top_by_frequency(jobs.iter().map(|j| j.company.clone())),
        top_locations: top_by_frequency(jobs.iter().map(|j| format!("{}, {}", j.city, j.country))),
    }
}
