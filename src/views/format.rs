//! Display helpers shared by every page

use chrono::{DateTime, Utc};

/// Shorten an address to `ABCDEF...WXYZ`. Addresses of ten characters or
/// fewer are returned unchanged.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Coarse relative time: "Just now", "5m ago", "3h ago", "2d ago"
pub fn format_relative(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let diff = now.timestamp_millis() - timestamp_ms;

    if diff < 60_000 {
        "Just now".to_string()
    } else if diff < 3_600_000 {
        format!("{}m ago", diff / 60_000)
    } else if diff < 86_400_000 {
        format!("{}h ago", diff / 3_600_000)
    } else {
        format!("{}d ago", diff / 86_400_000)
    }
}

/// Absolute UTC date for a millisecond timestamp
pub fn format_date(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// ALGO amount with two decimals
pub fn format_algo(amount: f64) -> String {
    format!("{:.2} ALGO", amount)
}

/// First `max` characters of `text`, with "..." when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}

/// Bio preview used on listing cards
pub fn truncate_bio(bio: &str) -> String {
    truncate(bio, 100)
}

/// Link to a creator page
pub fn profile_url(site_url: &str, wallet: &str) -> String {
    format!(
        "{}/profile.html?creator={}",
        site_url.trim_end_matches('/'),
        urlencoding::encode(wallet)
    )
}

/// Link to a supporter page
pub fn supporter_url(site_url: &str, wallet: &str) -> String {
    format!(
        "{}/supporter-profile.html?supporter={}",
        site_url.trim_end_matches('/'),
        urlencoding::encode(wallet)
    )
}

/// Embeddable tip widget for a creator
pub fn embed_code(site_url: &str, wallet: &str) -> String {
    format!(
        r#"<iframe src="{}/widget.html?creator={}" width="320" height="400" frameborder="0" style="border-radius: 12px; box-shadow: 0 4px 6px rgba(0,0,0,0.1);"></iframe>"#,
        site_url.trim_end_matches('/'),
        urlencoding::encode(wallet)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_address() {
        let address = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        assert_eq!(format_address(address), "ABCDEF...WXYZ");
        assert_eq!(format_address("SHORT"), "SHORT");
        assert_eq!(format_address(""), "");
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let ms = now.timestamp_millis();

        assert_eq!(format_relative(ms - 30_000, now), "Just now");
        assert_eq!(format_relative(ms + 5_000, now), "Just now");
        assert_eq!(format_relative(ms - 5 * 60_000, now), "5m ago");
        assert_eq!(format_relative(ms - 3 * 3_600_000, now), "3h ago");
        assert_eq!(format_relative(ms - 2 * 86_400_000, now), "2d ago");
    }

    #[test]
    fn test_format_algo_and_date() {
        assert_eq!(format_algo(10.0), "10.00 ALGO");
        assert_eq!(format_algo(0.126), "0.13 ALGO");
        assert_eq!(format_date(0), "1970-01-01 00:00 UTC");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short bio", 100), "short bio");
        let long = "x".repeat(120);
        let cut = truncate(&long, 100);
        assert_eq!(cut.len(), 103);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_bio(&long), cut);
    }

    #[test]
    fn test_embed_code() {
        let code = embed_code("https://tips.example/", "WALLET");
        assert!(code.starts_with(r#"<iframe src="https://tips.example/widget.html?creator=WALLET""#));
        assert!(code.ends_with("</iframe>"));
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            profile_url("http://localhost:8000", "W"),
            "http://localhost:8000/profile.html?creator=W"
        );
        assert_eq!(
            supporter_url("http://localhost:8000", "W"),
            "http://localhost:8000/supporter-profile.html?supporter=W"
        );
    }
}
