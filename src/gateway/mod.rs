//! Payment-gateway fingerprinting.
//!
//! Detects which payment processors a page integrates, plus ancillary
//! payment/security attributes (CAPTCHA, Cloudflare, 3-D Secure/VBV,
//! authentication flow). Detection is three cumulative layers over a static
//! signature table: canonical-name substrings, known integration variants,
//! and regex patterns for embedded SDK script URLs.

mod signatures;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

pub use signatures::{
    GatewaySignature, AUTH_MARKERS, GATEWAY_REGEX_SIGNATURES, GATEWAY_SIGNATURES,
    PAYMENT_INDICATORS, PROTECTION_SIGNATURES,
};

/// 3-D Secure / Verified-by-Visa markers, tolerant of a separating space or
/// hyphen.
static VBV_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    match Regex::new(r"(?i)3-?d[\s-]?secure|vbv|verified[\s-]?by[\s-]?visa|threed[\s-]?secure") {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!("Invalid VBV regex: {}", e);
            None
        }
    }
});

/// Returns the set of payment gateways detected in the page text.
///
/// Union of all three detection layers plus the generic payment-capability
/// labels. Empty text yields an empty set.
///
/// If a gateway's exact canonical name appears as a substring of the text,
/// that gateway is guaranteed to be in the result set.
pub fn find_gateways(raw_text: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    if raw_text.is_empty() {
        return found;
    }

    let text = raw_text.to_lowercase();

    // Layer 1 + 2: canonical names and known variants, lowercased substring
    for sig in GATEWAY_SIGNATURES {
        if text.contains(&sig.name.to_lowercase())
            || sig.variants.iter().any(|v| text.contains(v))
        {
            found.insert(sig.name.to_string());
        }
    }

    // Layer 3: SDK/endpoint regexes against the raw text
    for (re, name) in GATEWAY_REGEX_SIGNATURES.iter() {
        if re.is_match(raw_text) {
            found.insert(name.to_string());
        }
    }

    // Generic capability labels ("processor unknown" evidence)
    for (phrase, label) in PAYMENT_INDICATORS {
        if text.contains(phrase) {
            found.insert(label.to_string());
        }
    }

    found
}

/// Ancillary payment/security attributes detected alongside the gateway set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecuritySignals {
    pub has_captcha: bool,
    pub has_cloudflare: bool,
    pub has_vbv: bool,
    pub has_auth: bool,
}

impl SecuritySignals {
    /// Merges signals from a second scan (e.g. a checkout subpage) into this
    /// one. Presence anywhere counts.
    pub fn merge(&mut self, other: SecuritySignals) {
        self.has_captcha |= other.has_captcha;
        self.has_cloudflare |= other.has_cloudflare;
        self.has_vbv |= other.has_vbv;
        self.has_auth |= other.has_auth;
    }
}

/// Scans page text (and, when available, response headers) for ancillary
/// security attributes.
///
/// Cloudflare is recognized either by a body marker or by the `cf-ray`
/// response header. Empty text with no headers yields all-false.
pub fn detect_signals(raw_text: &str, headers: Option<&reqwest::header::HeaderMap>) -> SecuritySignals {
    let mut signals = SecuritySignals::default();

    let header_cloudflare = headers
        .map(|h| h.contains_key("cf-ray"))
        .unwrap_or(false);

    if raw_text.is_empty() {
        signals.has_cloudflare = header_cloudflare;
        return signals;
    }

    let text = raw_text.to_lowercase();

    signals.has_captcha = text.contains("captcha");
    signals.has_cloudflare = text.contains("cloudflare") || header_cloudflare;
    signals.has_vbv = VBV_REGEX
        .as_ref()
        .map(|re| re.is_match(raw_text))
        .unwrap_or(false);
    signals.has_auth = AUTH_MARKERS.iter().any(|m| text.contains(m));

    signals
}

/// Checks whether text matches the VBV/3-D Secure pattern.
pub fn has_vbv_marker(raw_text: &str) -> bool {
    VBV_REGEX
        .as_ref()
        .map(|re| re.is_match(raw_text))
        .unwrap_or(false)
}

/// Checks text for protection-layer signatures (CAPTCHA/WAF/DDoS challenge
/// markers). Used by the protection filter's probe pass.
pub fn has_protection_signature(raw_text: &str) -> bool {
    if raw_text.is_empty() {
        return false;
    }
    let text = raw_text.to_lowercase();
    PROTECTION_SIGNATURES.iter().any(|sig| text.contains(sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(find_gateways("").is_empty());
        let signals = detect_signals("", None);
        assert_eq!(signals, SecuritySignals::default());
    }

    #[test]
    fn test_canonical_name_substring_is_detected() {
        // Gateway union property: the exact canonical name in the text
        // guarantees membership in the result
        for sig in GATEWAY_SIGNATURES {
            let text = format!("we proudly accept {} at checkout", sig.name);
            let found = find_gateways(&text);
            assert!(
                found.contains(sig.name),
                "{} should be detected from its own name",
                sig.name
            );
        }
    }

    #[test]
    fn test_stripe_and_cvv_scenario() {
        let text = "Add to cart. Pay securely with Stripe. CVV required.";
        let found = find_gateways(text);
        assert!(found.contains("Stripe"));
        assert!(found.contains("Credit Card"));

        let signals = detect_signals(text, None);
        assert!(!signals.has_captcha);
    }

    #[test]
    fn test_variant_match_attributes_canonical_name() {
        let text = r#"<script src="https://www.paypalobjects.com/api/checkout.js"></script>"#;
        assert!(find_gateways(text).contains("PayPal"));
    }

    #[test]
    fn test_regex_sdk_match() {
        let text = r#"<script src="https://js.stripe.com/v3/"></script>"#;
        assert!(find_gateways(text).contains("Stripe"));
    }

    #[test]
    fn test_vbv_variants() {
        for text in [
            "protected by 3D Secure",
            "3-D Secure authentication",
            "3d-secure flow",
            "VBV enabled",
            "verified by visa",
            "threeD-SecureInfo",
        ] {
            assert!(has_vbv_marker(text), "{} should match VBV", text);
        }
        assert!(!has_vbv_marker("three dimensional security"));
    }

    #[test]
    fn test_cloudflare_header_detection() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("cf-ray", "8abc123-LHR".parse().unwrap());
        let signals = detect_signals("clean page text", Some(&headers));
        assert!(signals.has_cloudflare);

        let signals = detect_signals("clean page text", None);
        assert!(!signals.has_cloudflare);
    }

    #[test]
    fn test_auth_markers() {
        assert!(detect_signals("please login to continue", None).has_auth);
        assert!(detect_signals("visit my-account", None).has_auth);
        assert!(!detect_signals("a page about gardening", None).has_auth);
    }

    #[test]
    fn test_protection_signatures() {
        assert!(has_protection_signature("Checking your browser - Cloudflare"));
        assert!(has_protection_signature("please solve this CAPTCHA"));
        assert!(has_protection_signature("DDoS protection by"));
        assert!(!has_protection_signature("welcome to our shop"));
        assert!(!has_protection_signature(""));
    }

    #[test]
    fn test_signal_merge() {
        let mut a = SecuritySignals {
            has_captcha: false,
            has_cloudflare: true,
            has_vbv: false,
            has_auth: false,
        };
        let b = SecuritySignals {
            has_captcha: false,
            has_cloudflare: false,
            has_vbv: true,
            has_auth: false,
        };
        a.merge(b);
        assert!(a.has_cloudflare);
        assert!(a.has_vbv);
        assert!(!a.has_captcha);
    }
}
