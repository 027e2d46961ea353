//! Dashboard for the connected wallet
//!
//! A wallet holding both a creator and a supporter profile sees the creator
//! dashboard. Which one should win is not settled; creator first matches the
//! site's current behavior.

use crate::queries::{self, CreatorStats, LeaderboardEntry, SupporterStats};
use crate::store::{CreatorProfile, RecordStore, SupporterProfile};
use crate::views::format::embed_code;
use crate::views::profile::{received_lines, sent_lines, supported_creators, SupportedCreator, TipLine};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CreatorDashboard {
    pub creator: CreatorProfile,
    pub stats: CreatorStats,
    pub recent_tips: Vec<TipLine>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub embed_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupporterDashboard {
    pub supporter: SupporterProfile,
    pub stats: SupporterStats,
    pub recent_tips: Vec<TipLine>,
    pub supported: Vec<SupportedCreator>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum DashboardView {
    /// Not connected, or the wallet has no profile yet
    NoProfile,
    Creator(Box<CreatorDashboard>),
    Supporter(Box<SupporterDashboard>),
}

impl DashboardView {
    pub fn load(
        store: &RecordStore,
        connected: Option<&str>,
        site_url: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let Some(wallet) = connected else {
            return DashboardView::NoProfile;
        };

        let tips = store.list_tips();

        if let Some(creator) = store.get_creator(wallet) {
            tracing::debug!(wallet, "Loading creator dashboard");
            return DashboardView::Creator(Box::new(CreatorDashboard {
                stats: CreatorStats::compute(&tips, wallet, now),
                recent_tips: received_lines(&tips, wallet, now),
                leaderboard: queries::leaderboard(&tips, wallet),
                embed_code: embed_code(site_url, wallet),
                creator,
            }));
        }

        if let Some(supporter) = store.get_supporter(wallet) {
            tracing::debug!(wallet, "Loading supporter dashboard");
            let creators = store.list_creators();
            return DashboardView::Supporter(Box::new(SupporterDashboard {
                stats: SupporterStats::compute(&tips, wallet, now),
                recent_tips: sent_lines(&creators, &tips, wallet, now),
                supported: supported_creators(&creators, &tips, wallet),
                supporter,
            }));
        }

        DashboardView::NoProfile
    }
}
