//! Browse pages for creators and supporters

use crate::queries;
use crate::store::{CreatorProfile, RecordStore, SupporterProfile, TipRecord};
use crate::views::format::truncate_bio;
use clap::ValueEnum;
use serde::Serialize;
use std::cmp::Ordering;

/// Ordering for the creator listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CreatorSort {
    /// Newest profile first
    #[default]
    Recent,
    /// Most ALGO received first
    Tips,
    /// Most distinct supporters first
    Supporters,
}

/// Ordering for the supporter listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SupporterSort {
    #[default]
    Recent,
    /// Most ALGO sent first
    Tips,
    /// Most creators supported first
    Creators,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatorCard {
    pub creator: CreatorProfile,
    pub bio_preview: String,
    pub total_received: f64,
    pub supporter_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupporterCard {
    pub supporter: SupporterProfile,
    pub bio_preview: String,
    pub total_sent: f64,
    pub creators_supported: usize,
}

/// A filtered, sorted listing. `total` is the count before filtering.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Listing<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

pub fn creator_cards(
    creators: Vec<CreatorProfile>,
    tips: &[TipRecord],
    category: Option<&str>,
    sort: CreatorSort,
) -> Listing<CreatorCard> {
    let total = creators.len();

    let mut items: Vec<CreatorCard> = creators
        .into_iter()
        .filter(|c| category.map_or(true, |cat| c.category == cat))
        .map(|creator| CreatorCard {
            bio_preview: truncate_bio(&creator.bio),
            total_received: queries::total_received(tips, &creator.wallet),
            supporter_count: queries::supporter_count(tips, &creator.wallet),
            creator,
        })
        .collect();

    match sort {
        CreatorSort::Recent => items.sort_by(|a, b| b.creator.created_at.cmp(&a.creator.created_at)),
        CreatorSort::Tips => items.sort_by(|a, b| descending(a.total_received, b.total_received)),
        CreatorSort::Supporters => items.sort_by(|a, b| b.supporter_count.cmp(&a.supporter_count)),
    }

    Listing { items, total }
}

pub fn supporter_cards(
    supporters: Vec<SupporterProfile>,
    tips: &[TipRecord],
    search: Option<&str>,
    sort: SupporterSort,
) -> Listing<SupporterCard> {
    let total = supporters.len();
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut items: Vec<SupporterCard> = supporters
        .into_iter()
        .filter(|s| match &needle {
            Some(needle) => {
                s.display_name.to_lowercase().contains(needle.as_str())
                    || s.bio.to_lowercase().contains(needle.as_str())
            }
            None => true,
        })
        .map(|supporter| SupporterCard {
            bio_preview: truncate_bio(&supporter.bio),
            total_sent: queries::total_sent(tips, &supporter.wallet),
            creators_supported: queries::creators_supported(tips, &supporter.wallet).len(),
            supporter,
        })
        .collect();

    match sort {
        SupporterSort::Recent => {
            items.sort_by(|a, b| b.supporter.created_at.cmp(&a.supporter.created_at))
        }
        SupporterSort::Tips => items.sort_by(|a, b| descending(a.total_sent, b.total_sent)),
        SupporterSort::Creators => {
            items.sort_by(|a, b| b.creators_supported.cmp(&a.creators_supported))
        }
    }

    Listing { items, total }
}

/// Creator listing read from the store
pub fn creator_listing(
    store: &RecordStore,
    category: Option<&str>,
    sort: CreatorSort,
) -> Listing<CreatorCard> {
    creator_cards(store.list_creators(), &store.list_tips(), category, sort)
}

/// Supporter listing read from the store
pub fn supporter_listing(
    store: &RecordStore,
    search: Option<&str>,
    sort: SupporterSort,
) -> Listing<SupporterCard> {
    supporter_cards(store.list_supporters(), &store.list_tips(), search, sort)
}
