//! Creator and supporter pages
//!
//! Navigation mirrors the site: an explicit wallet selects the page subject;
//! without one the first stored profile is shown, and with an empty store a
//! demo profile is synthesized. An explicit wallet with no profile yields
//! `None`.

use crate::queries::{
    self, CreatorStats, LeaderboardEntry, SupporterStats, RECENT_TIPS,
};
use crate::store::{CreatorProfile, RecordStore, SupporterProfile, TipRecord, DEFAULT_AVATAR_URL};
use crate::views::format::{embed_code, format_address, format_relative};
use crate::wallet::generate_demo_profile_wallet;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One line of a tip history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TipLine {
    /// Who sent or received the tip, ready to display
    pub counterparty: String,
    pub amount: f64,
    pub when: String,
    pub timestamp: i64,
    pub tx_id: String,
}

impl TipLine {
    pub fn new(tip: &TipRecord, counterparty: String, now: DateTime<Utc>) -> Self {
        Self {
            counterparty,
            amount: tip.algo(),
            when: format_relative(tip.timestamp, now),
            timestamp: tip.timestamp,
            tx_id: tip.tx_id.clone(),
        }
    }
}

/// A creator a supporter has tipped, with the total sent to them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportedCreator {
    pub wallet: String,
    pub name: String,
    pub category: String,
    pub avatar_url: String,
    pub total_sent: f64,
}

/// Creators tipped by `supporter` that have a profile, in store order
pub fn supported_creators(
    creators: &[CreatorProfile],
    tips: &[TipRecord],
    supporter: &str,
) -> Vec<SupportedCreator> {
    let sent = queries::tips_sent_by(tips, supporter);

    creators
        .iter()
        .filter_map(|creator| {
            let to_creator: Vec<&TipRecord> = sent
                .iter()
                .copied()
                .filter(|tip| tip.to == creator.wallet)
                .collect();
            if to_creator.is_empty() {
                return None;
            }
            Some(SupportedCreator {
                wallet: creator.wallet.clone(),
                name: creator.name.clone(),
                category: creator.category.clone(),
                avatar_url: creator.avatar_url.clone(),
                total_sent: queries::total_algo(to_creator),
            })
        })
        .collect()
}

/// Recent tips received, labelled by sender
pub fn received_lines(tips: &[TipRecord], wallet: &str, now: DateTime<Utc>) -> Vec<TipLine> {
    let received = queries::tips_received_by(tips, wallet);
    queries::recent(&received, RECENT_TIPS)
        .into_iter()
        .map(|tip| TipLine::new(tip, format_address(&tip.from), now))
        .collect()
}

/// Recent tips sent, labelled by creator name when the recipient has a
/// profile, else by short address
pub fn sent_lines(
    creators: &[CreatorProfile],
    tips: &[TipRecord],
    wallet: &str,
    now: DateTime<Utc>,
) -> Vec<TipLine> {
    let sent = queries::tips_sent_by(tips, wallet);
    queries::recent(&sent, RECENT_TIPS)
        .into_iter()
        .map(|tip| {
            let label = creators
                .iter()
                .find(|c| c.wallet == tip.to)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format_address(&tip.to));
            TipLine::new(tip, label, now)
        })
        .collect()
}

/// Creator page
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub creator: CreatorProfile,
    /// Synthesized because the store holds no creators
    pub is_demo: bool,
    pub stats: CreatorStats,
    pub recent_tips: Vec<TipLine>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub embed_code: String,
}

impl ProfileView {
    pub fn load(
        store: &RecordStore,
        requested: Option<&str>,
        connected: Option<&str>,
        site_url: &str,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let (creator, is_demo) = match requested {
            Some(wallet) => (store.get_creator(wallet)?, false),
            None => match store.list_creators().into_iter().next() {
                Some(first) => (first, false),
                None => (demo_creator(connected, now), true),
            },
        };

        Some(Self::build(store, creator, is_demo, site_url, now))
    }

    fn build(
        store: &RecordStore,
        creator: CreatorProfile,
        is_demo: bool,
        site_url: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let tips = store.list_tips();
        Self {
            stats: CreatorStats::compute(&tips, &creator.wallet, now),
            recent_tips: received_lines(&tips, &creator.wallet, now),
            leaderboard: queries::leaderboard(&tips, &creator.wallet),
            embed_code: embed_code(site_url, &creator.wallet),
            creator,
            is_demo,
        }
    }
}

fn demo_creator(connected: Option<&str>, now: DateTime<Utc>) -> CreatorProfile {
    let wallet = connected
        .map(str::to_string)
        .unwrap_or_else(generate_demo_profile_wallet);

    let mut creator = CreatorProfile::new(
        wallet,
        "Demo Artist",
        "Artist",
        "Digital artist creating stunning visual experiences. Support my work with a tip!",
    )
    .avatar(DEFAULT_AVATAR_URL)
    .created_at(now.timestamp_millis());

    for (color, n) in [("667eea", 1), ("764ba2", 2), ("f093fb", 3), ("4facfe", 4)] {
        creator = creator.portfolio_item(format!(
            "https://via.placeholder.com/400x400/{}/ffffff?text=Art+{}",
            color, n
        ));
    }
    creator
}

/// Supporter page
#[derive(Debug, Clone, Serialize)]
pub struct SupporterProfileView {
    pub supporter: SupporterProfile,
    pub is_demo: bool,
    pub stats: SupporterStats,
    pub supported: Vec<SupportedCreator>,
    pub recent_tips: Vec<TipLine>,
}

impl SupporterProfileView {
    pub fn load(
        store: &RecordStore,
        requested: Option<&str>,
        connected: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let (supporter, is_demo) = match requested {
            Some(wallet) => (store.get_supporter(wallet)?, false),
            None => match store.list_supporters().into_iter().next() {
                Some(first) => (first, false),
                None => (demo_supporter(connected, now), true),
            },
        };

        let tips = store.list_tips();
        let creators = store.list_creators();

        Some(Self {
            stats: SupporterStats::compute(&tips, &supporter.wallet, now),
            supported: supported_creators(&creators, &tips, &supporter.wallet),
            recent_tips: sent_lines(&creators, &tips, &supporter.wallet, now),
            supporter,
            is_demo,
        })
    }
}

fn demo_supporter(connected: Option<&str>, now: DateTime<Utc>) -> SupporterProfile {
    let wallet = connected
        .map(str::to_string)
        .unwrap_or_else(generate_demo_profile_wallet);

    SupporterProfile::new(
        wallet,
        "Demo Supporter",
        "Passionate supporter of creative talent. I love discovering and backing amazing artists!",
    )
    .avatar(DEFAULT_AVATAR_URL)
    .created_at(now.timestamp_millis())
}
