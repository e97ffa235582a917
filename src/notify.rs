//! Notification sink.
//!
//! Posts a short summary of a finished discovery run to a Telegram chat.
//! Strictly fire-and-forget: every failure mode is logged and counted, and
//! nothing here can affect the discovery result that was already returned.

use reqwest::Client;

use crate::config::NotifyConfig;
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::models::DiscoverySummary;

const API_BASE: &str = "https://api.telegram.org";

/// Renders the human-readable summary line sent to the sink.
fn format_summary(summary: &DiscoverySummary) -> String {
    let top: Vec<&str> = summary
        .stores
        .iter()
        .take(5)
        .map(|s| s.url.as_str())
        .collect();
    let mut text = format!(
        "Discovery finished at {}: {} stores found ({} queries, budget {})",
        summary.finished_at,
        summary.stores_found,
        summary.queries.len(),
        summary.max_results
    );
    if !top.is_empty() {
        text.push_str("\nTop results:\n");
        text.push_str(&top.join("\n"));
    }
    text
}

/// Sends the summary message. Failures increment `NotifyError` and are
/// otherwise swallowed.
pub async fn send_summary_notification(
    client: &Client,
    config: &NotifyConfig,
    summary: &DiscoverySummary,
    stats: &ProcessingStats,
) {
    send_to(API_BASE, client, config, summary, stats).await;
}

async fn send_to(
    base: &str,
    client: &Client,
    config: &NotifyConfig,
    summary: &DiscoverySummary,
    stats: &ProcessingStats,
) {
    let text = format_summary(summary);
    let url = format!("{}/bot{}/sendMessage", base, config.token);

    let result = client
        .get(&url)
        .query(&[("chat_id", config.chat_id.as_str()), ("text", text.as_str())])
        .send()
        .await;

    match result {
        Ok(resp) if resp.status().is_success() => {
            log::debug!("Notification delivered to chat {}", config.chat_id);
        }
        Ok(resp) => {
            stats.increment_error(ErrorType::NotifyError);
            log::warn!("Notification sink returned HTTP {}", resp.status());
        }
        Err(e) => {
            stats.increment_error(ErrorType::NotifyError);
            log::warn!("Notification delivery failed: {}", e);
        }
    }
}
