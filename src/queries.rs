//! Aggregation queries over the tip collection
//!
//! Every function here is pure and recomputes its answer from the full tip
//! slice it is given. Nothing is cached and no aggregate is ever persisted,
//! so a crash between writes cannot leave a stale total behind.

use crate::store::{TipRecord, MICRO_ALGOS_PER_ALGO};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Maximum number of leaderboard entries
pub const LEADERBOARD_SIZE: usize = 10;

/// Number of tips shown in history lists
pub const RECENT_TIPS: usize = 10;

/// One row of a creator's leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// Sender wallet
    pub address: String,
    /// Total sent to the creator, in ALGO
    pub amount: f64,
}

pub fn tips_received_by<'a>(tips: &'a [TipRecord], wallet: &str) -> Vec<&'a TipRecord> {
    tips.iter().filter(|tip| tip.to == wallet).collect()
}

pub fn tips_sent_by<'a>(tips: &'a [TipRecord], wallet: &str) -> Vec<&'a TipRecord> {
    tips.iter().filter(|tip| tip.from == wallet).collect()
}

/// Sum of a tip selection, in ALGO
pub fn total_algo<'a>(tips: impl IntoIterator<Item = &'a TipRecord>) -> f64 {
    tips.into_iter().map(TipRecord::algo).sum()
}

/// Total received by `wallet`, in ALGO. Zero when nothing was received.
pub fn total_received(tips: &[TipRecord], wallet: &str) -> f64 {
    total_algo(tips_received_by(tips, wallet))
}

/// Total sent by `wallet`, in ALGO
pub fn total_sent(tips: &[TipRecord], wallet: &str) -> f64 {
    total_algo(tips_sent_by(tips, wallet))
}

/// Number of distinct senders that tipped `wallet`
pub fn supporter_count(tips: &[TipRecord], wallet: &str) -> usize {
    tips_received_by(tips, wallet)
        .into_iter()
        .map(|tip| tip.from.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Distinct recipients tipped by `wallet`, in address order
pub fn creators_supported(tips: &[TipRecord], wallet: &str) -> Vec<String> {
    tips_sent_by(tips, wallet)
        .into_iter()
        .map(|tip| tip.to.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Top senders to `wallet`
///
/// Amounts are summed per sender, sorted by total descending. Equal totals
/// are ordered by address ascending. At most [`LEADERBOARD_SIZE`] entries.
pub fn leaderboard(tips: &[TipRecord], wallet: &str) -> Vec<LeaderboardEntry> {
    // u128 so any number of u64 amounts sums without overflow
    let mut totals: BTreeMap<&str, u128> = BTreeMap::new();
    for tip in tips_received_by(tips, wallet) {
        *totals.entry(tip.from.as_str()).or_insert(0) += u128::from(tip.amount);
    }

    let mut ranked: Vec<(&str, u128)> = totals.into_iter().collect();
    // Stable sort over address-ordered input keeps ties in address order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(|(address, micro)| LeaderboardEntry {
            address: address.to_string(),
            amount: micro as f64 / MICRO_ALGOS_PER_ALGO as f64,
        })
        .collect()
}

/// Mean tip size in ALGO; zero for an empty selection
pub fn average_tip(tips: &[&TipRecord]) -> f64 {
    if tips.is_empty() {
        return 0.0;
    }
    total_algo(tips.iter().copied()) / tips.len() as f64
}

/// Sum of tips at or after `since_ms`, in ALGO
pub fn total_since(tips: &[&TipRecord], since_ms: i64) -> f64 {
    total_algo(tips.iter().copied().filter(|tip| tip.timestamp >= since_ms))
}

/// Start of the calendar month containing `now` (UTC), in milliseconds
pub fn month_start_ms(now: DateTime<Utc>) -> i64 {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}

/// Newest `limit` tips first
pub fn recent<'a>(tips: &[&'a TipRecord], limit: usize) -> Vec<&'a TipRecord> {
    let mut sorted = tips.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}

/// Aggregates shown on a creator page and dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorStats {
    pub total_received: f64,
    pub supporter_count: usize,
    pub tip_count: usize,
    pub average_tip: f64,
    pub this_month: f64,
}

impl CreatorStats {
    pub fn compute(tips: &[TipRecord], wallet: &str, now: DateTime<Utc>) -> Self {
        let received = tips_received_by(tips, wallet);
        Self {
            total_received: total_algo(received.iter().copied()),
            supporter_count: supporter_count(tips, wallet),
            tip_count: received.len(),
            average_tip: average_tip(&received),
            this_month: total_since(&received, month_start_ms(now)),
        }
    }
}

/// Aggregates shown on a supporter page and dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupporterStats {
    pub total_sent: f64,
    pub creators_supported: usize,
    pub tip_count: usize,
    pub average_tip: f64,
    pub this_month: f64,
}

impl SupporterStats {
    pub fn compute(tips: &[TipRecord], wallet: &str, now: DateTime<Utc>) -> Self {
        let sent = tips_sent_by(tips, wallet);
        Self {
            total_sent: total_algo(sent.iter().copied()),
            creators_supported: creators_supported(tips, wallet).len(),
            tip_count: sent.len(),
            average_tip: average_tip(&sent),
            this_month: total_since(&sent, month_start_ms(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip(from: &str, to: &str, algo: u64, timestamp: i64) -> TipRecord {
        TipRecord::new(from, to, algo * 1_000_000, format!("TX{}", timestamp)).timestamp(timestamp)
    }

    #[test]
    fn test_empty_collection() {
        let tips: Vec<TipRecord> = Vec::new();
        assert_eq!(total_received(&tips, "C"), 0.0);
        assert_eq!(supporter_count(&tips, "C"), 0);
        assert!(leaderboard(&tips, "C").is_empty());
        assert_eq!(average_tip(&[]), 0.0);
    }

    #[test]
    fn test_filters_by_direction() {
        let tips = vec![tip("A", "C", 1, 1), tip("C", "A", 2, 2), tip("B", "C", 3, 3)];

        assert_eq!(tips_received_by(&tips, "C").len(), 2);
        assert_eq!(tips_sent_by(&tips, "C").len(), 1);
        assert_eq!(total_received(&tips, "C"), 4.0);
        assert_eq!(total_sent(&tips, "C"), 2.0);
    }

    #[test]
    fn test_total_matches_per_tip_sum() {
        let tips = vec![
            TipRecord::new("A", "C", 123_456, "1"),
            TipRecord::new("B", "C", 7_000_001, "2"),
            TipRecord::new("A", "X", 999, "3"),
        ];
        let expected: f64 = tips_received_by(&tips, "C")
            .iter()
            .map(|t| t.amount as f64 / 1e6)
            .sum();
        assert_eq!(total_received(&tips, "C"), expected);
    }

    #[test]
    fn test_supporter_count_is_distinct() {
        let tips = vec![tip("A", "C", 1, 1), tip("A", "C", 1, 2), tip("B", "C", 1, 3)];
        assert_eq!(supporter_count(&tips, "C"), 2);
    }

    #[test]
    fn test_leaderboard_groups_sender() {
        let tips = vec![tip("S", "C", 3, 1), tip("S", "C", 7, 2)];
        let board = leaderboard(&tips, "C");
        assert_eq!(
            board,
            vec![LeaderboardEntry {
                address: "S".to_string(),
                amount: 10.0
            }]
        );
    }

    #[test]
    fn test_leaderboard_huge_amounts_do_not_overflow() {
        let half = u64::MAX / 2 + 1;
        let tips = vec![
            TipRecord::new("S", "C", half, "T1").timestamp(1),
            TipRecord::new("S", "C", half, "T2").timestamp(2),
            TipRecord::new("R", "C", 1, "T3").timestamp(3),
        ];

        let board = leaderboard(&tips, "C");
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].address, "S");
        assert!(board[0].amount > u64::MAX as f64 / 1_000_000.0);
    }

    #[test]
    fn test_leaderboard_sorted_and_capped() {
        let mut tips = Vec::new();
        for i in 0..15u64 {
            tips.push(tip(&format!("SENDER{:02}", i), "C", i + 1, i as i64));
        }
        tips.push(tip("SENDER00", "C", 100, 99));

        let board = leaderboard(&tips, "C");
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert!(board.windows(2).all(|w| w[0].amount >= w[1].amount));
        assert_eq!(board[0].address, "SENDER00");
        assert_eq!(board[0].amount, 101.0);
    }

    #[test]
    fn test_leaderboard_contains_all_distinct_senders() {
        let tips = vec![
            tip("A", "C", 5, 1),
            tip("B", "C", 2, 2),
            tip("A", "C", 1, 3),
            tip("D", "C", 9, 4),
            tip("B", "X", 50, 5),
        ];
        let mut addresses: Vec<String> = leaderboard(&tips, "C").into_iter().map(|e| e.address).collect();
        addresses.sort();
        assert_eq!(addresses, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_leaderboard_ties_break_by_address() {
        let tips = vec![tip("ZED", "C", 5, 1), tip("AMY", "C", 5, 2), tip("MAX", "C", 5, 3)];
        let board = leaderboard(&tips, "C");
        let order: Vec<&str> = board.iter().map(|e| e.address.as_str()).collect();
        assert_eq!(order, vec!["AMY", "MAX", "ZED"]);
    }

    #[test]
    fn test_creators_supported() {
        let tips = vec![tip("F", "C2", 1, 1), tip("F", "C1", 1, 2), tip("F", "C2", 1, 3)];
        assert_eq!(creators_supported(&tips, "F"), vec!["C1", "C2"]);
    }

    #[test]
    fn test_recent_newest_first() {
        let tips: Vec<TipRecord> = (0..15).map(|i| tip("A", "C", 1, i)).collect();
        let received = tips_received_by(&tips, "C");
        let latest = recent(&received, RECENT_TIPS);
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].timestamp, 14);
        assert_eq!(latest[9].timestamp, 5);
    }

    #[test]
    fn test_month_start() {
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 15, 30, 0).unwrap();
        let start = month_start_ms(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().timestamp_millis());
    }

    #[test]
    fn test_creator_stats() {
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 0, 0, 0).unwrap();
        let this_month = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap().timestamp_millis();
        let last_month = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap().timestamp_millis();
        let tips = vec![tip("A", "C", 2, last_month), tip("B", "C", 4, this_month)];

        let stats = CreatorStats::compute(&tips, "C", now);
        assert_eq!(stats.total_received, 6.0);
        assert_eq!(stats.supporter_count, 2);
        assert_eq!(stats.average_tip, 3.0);
        assert_eq!(stats.this_month, 4.0);
    }

    #[test]
    fn test_supporter_stats() {
        let now = Utc::now();
        let tips = vec![tip("F", "C1", 1, 1), tip("F", "C2", 3, 2), tip("X", "C1", 9, 3)];

        let stats = SupporterStats::compute(&tips, "F", now);
        assert_eq!(stats.total_sent, 4.0);
        assert_eq!(stats.creators_supported, 2);
        assert_eq!(stats.tip_count, 2);
        assert_eq!(stats.average_tip, 2.0);
        assert_eq!(stats.this_month, 0.0);
    }
}
