//! Randomized User-Agent pool.
//!
//! Every outbound request carries a User-Agent drawn at random from a fixed
//! pool of current desktop and mobile browser strings. Rotating the UA per
//! request (rather than per client) reduces trivial bot fingerprinting on
//! both search engines and probed stores.

use rand::prelude::IndexedRandom;

/// Browser User-Agent strings used for outbound requests.
///
/// Kept to mainstream, current-ish browser versions; exotic strings attract
/// more scrutiny from anti-bot layers than they deflect.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:132.0) Gecko/20100101 Firefox/132.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:132.0) Gecko/20100101 Firefox/132.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36",
];

/// Supplies randomized User-Agent strings.
///
/// A fixed override (from `Config::user_agent`) disables randomization, which
/// is useful for reproducible test runs.
#[derive(Debug, Clone, Default)]
pub struct UserAgentPool {
    fixed: Option<String>,
}

impl UserAgentPool {
    /// Creates a pool that randomizes across the built-in browser strings.
    pub fn new() -> Self {
        Self { fixed: None }
    }

    /// Creates a pool that always returns the given string.
    pub fn fixed(user_agent: impl Into<String>) -> Self {
        Self {
            fixed: Some(user_agent.into()),
        }
    }

    /// Creates a pool from an optional override.
    pub fn from_override(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) => Self::fixed(ua),
            None => Self::new(),
        }
    }

    /// Returns a User-Agent string for one outbound request.
    pub fn pick(&self) -> &str {
        if let Some(ref ua) = self.fixed {
            return ua;
        }
        let mut rng = rand::rng();
        USER_AGENTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }
}
