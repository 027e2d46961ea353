//! Tip Jar CLI
//!
//! Command-line front end for the Creator Tip Jar:
//! - Connect and disconnect a wallet
//! - Send tips
//! - Create creator and supporter profiles
//! - Browse profiles, dashboards and leaderboards

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tipjar::config::{generate_default_config, Config, LoggingConfig};
use tipjar::store::{FileBackend, RecordStore};
use tipjar::tips::TipSender;
use tipjar::views::format::{embed_code, format_address, format_algo, format_date, profile_url};
use tipjar::views::{
    avatar_data_url, creator_listing, mime_from_extension, supporter_listing, CreatorForm,
    CreatorSort, DashboardView, Notice, ProfileView, SupportedCreator, SupporterForm,
    SupporterProfileView, SupporterSort, TipLine,
};
use tipjar::wallet::{build_provider, WalletSession};
use tipjar::LeaderboardEntry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tipjar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tip creators with ALGO and track your support")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Config file (default: <config dir>/tipjar/config.toml or ./tipjar.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overrides the config file
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect a wallet
    Connect,

    /// Disconnect the current wallet
    Disconnect,

    /// Show the connected wallet
    Whoami,

    /// Send a tip
    Tip {
        /// Recipient wallet
        to: String,
        /// Amount in ALGO
        amount: f64,
    },

    /// Create or update your creator profile
    CreatorProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        bio: String,
        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,
        /// Portfolio item URL (repeatable)
        #[arg(long = "portfolio")]
        portfolio: Vec<String>,
    },

    /// Create or update your supporter profile
    SupporterProfile {
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        bio: String,
        /// Social media link
        #[arg(long)]
        social: Option<String>,
        /// Avatar image file (JPG, PNG, GIF or WebP, max 5MB)
        #[arg(long)]
        avatar: Option<PathBuf>,
    },

    /// Show a creator page
    Profile {
        /// Creator wallet (default: first creator)
        wallet: Option<String>,
    },

    /// Show a supporter page
    Supporter {
        /// Supporter wallet (default: first supporter)
        wallet: Option<String>,
    },

    /// Show your dashboard
    Dashboard,

    /// List creators
    Creators {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum, default_value_t = CreatorSort::Recent)]
        sort: CreatorSort,
    },

    /// List supporters
    Supporters {
        /// Case-insensitive search over name and bio
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = SupporterSort::Recent)]
        sort: SupporterSort,
    },

    /// Show the top supporters of a creator
    Leaderboard {
        wallet: String,
    },

    /// Print the embeddable widget for a creator
    Embed {
        /// Creator wallet (default: connected wallet)
        wallet: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tipjar={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.store.data_dir = dir.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_notice(notice: &Notice, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(notice),
        OutputFormat::Table => {
            println!("{}", notice);
            Ok(())
        }
    }
}

fn print_tip_lines(title: &str, lines: &[TipLine]) {
    println!();
    println!("{}:", title);
    if lines.is_empty() {
        println!("  No tips yet");
        return;
    }
    println!("  {:<16} {:>14} {:<10} {}", "Who", "Amount", "When", "Tx");
    println!("  {}", "-".repeat(60));
    for line in lines {
        println!(
            "  {:<16} {:>14} {:<10} {}",
            line.counterparty,
            format_algo(line.amount),
            line.when,
            line.tx_id
        );
    }
}

fn print_leaderboard(entries: &[LeaderboardEntry]) {
    println!();
    println!("Top supporters:");
    if entries.is_empty() {
        println!("  No supporters yet");
        return;
    }
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "  #{:<3} {:<16} {:>14}",
            rank + 1,
            format_address(&entry.address),
            format_algo(entry.amount)
        );
    }
}

fn print_supported(creators: &[SupportedCreator]) {
    println!();
    println!("Creators supported:");
    if creators.is_empty() {
        println!("  None yet");
        return;
    }
    for creator in creators {
        println!(
            "  {:<24} {:<12} {:>14}",
            creator.name,
            creator.category,
            format_algo(creator.total_sent)
        );
    }
}

fn read_avatar(path: &Path) -> anyhow::Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let Some(mime) = mime_from_extension(ext) else {
        bail!("Unsupported avatar file {:?}; use JPG, PNG, GIF or WebP", path);
    };
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(avatar_data_url(&bytes, mime)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let store_path = config.store.path();
    tracing::debug!("Store file: {:?}", store_path);
    let store = RecordStore::new(Arc::new(FileBackend::open(&store_path)?));

    let provider = build_provider(&config, &store)?;
    let session = WalletSession::init(store.clone(), provider).await;
    let connected = session.connected();
    let now = Utc::now();
    let site = config.app.site_url.as_str();
    let dismiss = config.app.message_dismiss_secs;

    match cli.command {
        Commands::Connect => {
            let notice = match session.connect().await {
                Ok(handle) => Notice::success(format!(
                    "Connected {} ({})",
                    format_address(&handle.address),
                    handle.kind
                )),
                Err(e) => {
                    tracing::error!("Connect failed: {}", e);
                    Notice::error("Failed to connect wallet. Please try again.")
                }
            };
            print_notice(&notice.dismiss_secs(dismiss), cli.format)?;
        }

        Commands::Disconnect => {
            session.disconnect().await?;
            print_notice(&Notice::info("Wallet disconnected").dismiss_secs(dismiss), cli.format)?;
        }

        Commands::Whoami => match (session.handle(), cli.format) {
            (Some(handle), OutputFormat::Json) => print_json(&handle)?,
            (Some(handle), OutputFormat::Table) => {
                println!("{} ({})", handle.address, handle.kind);
            }
            (None, _) => print_notice(&Notice::info("No wallet connected"), cli.format)?,
        },

        Commands::Tip { to, amount } => {
            let sender = TipSender::from_config(store.clone(), &config.app);
            match sender.send(&session, &to, amount).await {
                Ok(tip) => {
                    if cli.format == OutputFormat::Json {
                        print_json(&tip)?;
                    } else {
                        println!("{}", Notice::tip_sent(tip.algo()).dismiss_secs(dismiss));
                        println!("  Tx: {}", tip.tx_id);
                        println!("  Explorer: {}", config.network.explorer_tx_url(&tip.tx_id));
                    }
                }
                Err(e) => {
                    print_notice(&Notice::tip_failed(&e).dismiss_secs(dismiss), cli.format)?;
                    std::process::exit(1);
                }
            }
        }

        Commands::CreatorProfile {
            name,
            category,
            bio,
            avatar,
            portfolio,
        } => {
            let form = CreatorForm {
                name,
                category,
                bio,
                avatar_url: avatar,
                portfolio: portfolio.join("\n"),
            };
            let notice = match form.submit(&store, connected.as_deref()) {
                Ok(profile) => Notice::success(format!(
                    "Profile saved: {}",
                    profile_url(site, &profile.wallet)
                )),
                Err(e) => Notice::error(e.to_string()),
            };
            print_notice(&notice.dismiss_secs(dismiss), cli.format)?;
        }

        Commands::SupporterProfile {
            display_name,
            bio,
            social,
            avatar,
        } => {
            let avatar_url = avatar.as_deref().map(read_avatar).transpose()?;
            let form = SupporterForm {
                display_name,
                bio,
                social_media: social,
                avatar_url,
            };
            let notice = match form.submit(&store, connected.as_deref()) {
                Ok(_) => Notice::success("Supporter profile saved"),
                Err(e) => Notice::error(e.to_string()),
            };
            print_notice(&notice.dismiss_secs(dismiss), cli.format)?;
        }

        Commands::Profile { wallet } => {
            let Some(view) =
                ProfileView::load(&store, wallet.as_deref(), connected.as_deref(), site, now)
            else {
                bail!("Creator not found");
            };
            if cli.format == OutputFormat::Json {
                return print_json(&view);
            }

            let creator = &view.creator;
            println!("{} ({})", creator.name, creator.category);
            if view.is_demo {
                println!("  [demo profile]");
            }
            println!("  Wallet: {}", creator.wallet);
            println!("  {}", creator.bio);
            println!();
            println!("  Total received: {}", format_algo(view.stats.total_received));
            println!("  Supporters:     {}", view.stats.supporter_count);
            if !creator.portfolio.is_empty() {
                println!();
                println!("Portfolio:");
                for item in &creator.portfolio {
                    println!("  {}", item);
                }
            }
            print_tip_lines("Recent tips", &view.recent_tips);
            print_leaderboard(&view.leaderboard);

            let presets: Vec<String> = config.app.preset_amounts.iter().map(|a| a.to_string()).collect();
            println!();
            println!("Tip with: tipjar tip {} <{}>", creator.wallet, presets.join("|"));
        }

        Commands::Supporter { wallet } => {
            let Some(view) =
                SupporterProfileView::load(&store, wallet.as_deref(), connected.as_deref(), now)
            else {
                bail!("Supporter not found");
            };
            if cli.format == OutputFormat::Json {
                return print_json(&view);
            }

            let supporter = &view.supporter;
            println!("{}", supporter.display_name);
            if view.is_demo {
                println!("  [demo profile]");
            }
            println!("  Wallet: {}", supporter.wallet);
            println!("  {}", supporter.bio);
            if let Some(social) = &supporter.social_media {
                println!("  {}", social);
            }
            println!();
            println!("  Total sent:         {}", format_algo(view.stats.total_sent));
            println!("  Creators supported: {}", view.stats.creators_supported);
            println!("  Average tip:        {}", format_algo(view.stats.average_tip));
            print_supported(&view.supported);
            print_tip_lines("Recent tips", &view.recent_tips);
        }

        Commands::Dashboard => {
            let view = DashboardView::load(&store, connected.as_deref(), site, now);
            if cli.format == OutputFormat::Json {
                return print_json(&view);
            }

            match view {
                DashboardView::NoProfile => {
                    let text = if connected.is_some() {
                        "No profile yet. Create one with `tipjar creator-profile` or `tipjar supporter-profile`"
                    } else {
                        "Please connect your wallet first"
                    };
                    println!("{}", Notice::info(text));
                }
                DashboardView::Creator(dash) => {
                    println!("Creator dashboard: {}", dash.creator.name);
                    println!();
                    println!("  Total received: {}", format_algo(dash.stats.total_received));
                    println!("  Supporters:     {}", dash.stats.supporter_count);
                    println!("  Average tip:    {}", format_algo(dash.stats.average_tip));
                    println!("  This month:     {}", format_algo(dash.stats.this_month));
                    print_tip_lines("Recent tips", &dash.recent_tips);
                    print_leaderboard(&dash.leaderboard);
                    println!();
                    println!("Embed code:");
                    println!("  {}", dash.embed_code);
                }
                DashboardView::Supporter(dash) => {
                    println!("Supporter dashboard: {}", dash.supporter.display_name);
                    println!();
                    println!("  Total sent:         {}", format_algo(dash.stats.total_sent));
                    println!("  Creators supported: {}", dash.stats.creators_supported);
                    println!("  Average tip:        {}", format_algo(dash.stats.average_tip));
                    println!("  This month:         {}", format_algo(dash.stats.this_month));
                    print_tip_lines("Recent tips", &dash.recent_tips);
                    print_supported(&dash.supported);
                }
            }
        }

        Commands::Creators { category, sort } => {
            let listing = creator_listing(&store, category.as_deref(), sort);
            if cli.format == OutputFormat::Json {
                return print_json(&listing);
            }

            if listing.is_empty() {
                println!("No creators found.");
                return Ok(());
            }
            println!(
                "{:<24} {:<12} {:>14} {:>10} {:<16}",
                "Name", "Category", "Received", "Supporters", "Joined"
            );
            println!("{}", "-".repeat(82));
            for card in &listing.items {
                println!(
                    "{:<24} {:<12} {:>14} {:>10} {:<16}",
                    card.creator.name,
                    card.creator.category,
                    format_algo(card.total_received),
                    card.supporter_count,
                    format_date(card.creator.created_at)
                );
                println!("  {}", card.bio_preview);
            }
            println!();
            println!("{} of {} creators", listing.items.len(), listing.total);
        }

        Commands::Supporters { search, sort } => {
            let listing = supporter_listing(&store, search.as_deref(), sort);
            if cli.format == OutputFormat::Json {
                return print_json(&listing);
            }

            if listing.is_empty() {
                println!("No supporters found.");
                return Ok(());
            }
            println!("{:<24} {:>14} {:>10} {:<16}", "Name", "Sent", "Creators", "Wallet");
            println!("{}", "-".repeat(70));
            for card in &listing.items {
                println!(
                    "{:<24} {:>14} {:>10} {:<16}",
                    card.supporter.display_name,
                    format_algo(card.total_sent),
                    card.creators_supported,
                    format_address(&card.supporter.wallet)
                );
                println!("  {}", card.bio_preview);
            }
            println!();
            println!("{} of {} supporters", listing.items.len(), listing.total);
        }

        Commands::Leaderboard { wallet } => {
            let entries = tipjar::queries::leaderboard(&store.list_tips(), &wallet);
            if cli.format == OutputFormat::Json {
                return print_json(&entries);
            }
            print_leaderboard(&entries);
        }

        Commands::Embed { wallet } => {
            let Some(wallet) = wallet.or(connected) else {
                bail!("Please connect your wallet first or pass a creator wallet");
            };
            let code = embed_code(site, &wallet);
            if cli.format == OutputFormat::Json {
                return print_json(&serde_json::json!({ "wallet": wallet, "embed": code }));
            }
            println!("{}", code);
        }

        // Written above, before the store is opened
        Commands::Config { .. } => {}
    }

    Ok(())
}
