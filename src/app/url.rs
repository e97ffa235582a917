//! URL validation and normalization utilities.

use log::warn;

/// Maximum URL length (2048 characters) to prevent abuse via extremely long
/// URLs. This matches common browser and server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Validates and normalizes a URL.
///
/// Adds an https:// prefix if missing, then validates that the URL is
/// syntactically valid and uses an http/https scheme. Rejects URLs longer than
/// `MAX_URL_LENGTH`. Logs a warning and returns `None` if the URL is invalid,
/// too long, or uses an unsupported scheme.
///
/// # Arguments
///
/// * `url` - The URL string to validate and normalize
///
/// # Returns
///
/// `Some(normalized_url)` if the URL is valid and should be processed, `None` otherwise.
pub fn validate_and_normalize_url(url: &str) -> Option<String> {
    if url.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {}): {}...",
            url.len(),
            MAX_URL_LENGTH,
            &url[..50.min(url.len())]
        );
        return None;
    }

    let normalized = if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://{url}")
    } else {
        url.to_string()
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping normalized URL exceeding maximum length ({} > {})",
            normalized.len(),
            MAX_URL_LENGTH,
        );
        return None;
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" => Some(normalized),
            _ => {
                warn!("Skipping unsupported scheme for URL: {url}");
                None
            }
        },
        Err(_) => {
            warn!("Skipping invalid URL: {url}");
            None
        }
    }
}
