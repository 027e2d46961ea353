//! Page View Models
//!
//! Each page of the tip jar is built here from the record store and the
//! aggregation queries. The CLI renders these as tables or JSON.
//!
//! - **profile**: creator and supporter pages
//! - **dashboard**: the connected wallet's own page
//! - **listing**: browse creators and supporters
//! - **forms**: create or edit a profile
//! - **notice**: transient status messages
//! - **format**: display helpers

pub mod format;

mod dashboard;
mod forms;
mod listing;
mod notice;
mod profile;

pub use dashboard::{CreatorDashboard, DashboardView, SupporterDashboard};
pub use forms::{
    avatar_data_url, mime_from_extension, CreatorForm, FormError, SupporterForm,
    AVATAR_MIME_TYPES, MAX_AVATAR_BYTES,
};
pub use listing::{
    creator_cards, creator_listing, supporter_cards, supporter_listing, CreatorCard, CreatorSort,
    Listing, SupporterCard, SupporterSort,
};
pub use notice::{Notice, NoticeKind};
pub use profile::{
    received_lines, sent_lines, supported_creators, ProfileView, SupportedCreator,
    SupporterProfileView, TipLine,
};
