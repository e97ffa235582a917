//! Static payment-gateway signature tables.
//!
//! Read-only reference data consulted by the fingerprinter. Three kinds of
//! evidence are tabulated per gateway: the canonical brand name, literal
//! substring variants (SDK hostnames, CSS class prefixes, platform slugs),
//! and regex patterns that match embedded checkout-SDK script URLs or
//! endpoint paths.

use std::sync::LazyLock;

use regex::Regex;

/// One gateway's detection signature.
pub struct GatewaySignature {
    /// Canonical gateway name reported in results
    pub name: &'static str,
    /// Literal lowercase substring variants; any hit attributes the gateway
    pub variants: &'static [&'static str],
}

/// Canonical gateways with their substring variants.
///
/// The variant lists favor integration footprints (script hosts, platform
/// slugs) over brand words alone, since brand words also appear in unrelated
/// marketing copy.
pub static GATEWAY_SIGNATURES: &[GatewaySignature] = &[
    GatewaySignature {
        name: "Stripe",
        variants: &["stripe", "js.stripe.com", "stripe.js", "sk_live_", "pk_live_"],
    },
    GatewaySignature {
        name: "PayPal",
        variants: &["paypal", "paypalobjects", "paypal.com/sdk"],
    },
    GatewaySignature {
        name: "Braintree",
        variants: &["braintree", "braintreegateway", "braintree-web"],
    },
    GatewaySignature {
        name: "Razorpay",
        variants: &["razorpay", "checkout.razorpay.com"],
    },
    GatewaySignature {
        name: "Square",
        variants: &["squareup", "square.com/payments", "squarecdn"],
    },
    GatewaySignature {
        name: "Adyen",
        variants: &["adyen", "checkoutshopper"],
    },
    GatewaySignature {
        name: "Authorize.Net",
        variants: &["authorize.net", "authorizenet", "authorize_net_cim_credit_card"],
    },
    GatewaySignature {
        name: "2Checkout",
        variants: &["2checkout", "2co.com", "verifone"],
    },
    GatewaySignature {
        name: "Mollie",
        variants: &["mollie", "mollie.com"],
    },
    GatewaySignature {
        name: "Klarna",
        variants: &["klarna", "klarnacdn"],
    },
    GatewaySignature {
        name: "Worldpay",
        variants: &["worldpay"],
    },
    GatewaySignature {
        name: "BlueSnap",
        variants: &["bluesnap"],
    },
    GatewaySignature {
        name: "Checkout.com",
        variants: &["checkout.com", "cko-session"],
    },
    GatewaySignature {
        name: "WooCommerce",
        variants: &["woocommerce", "wc-ajax", "wc_cart"],
    },
    GatewaySignature {
        name: "Shopify Payments",
        variants: &["shopify", "cdn.shopify.com", "shop_pay"],
    },
    GatewaySignature {
        name: "Google Pay",
        variants: &["google pay", "pay.google.com", "gpay"],
    },
    GatewaySignature {
        name: "Apple Pay",
        variants: &["apple pay", "apple-pay", "applepay"],
    },
    GatewaySignature {
        name: "eWAY",
        variants: &["eway", "ewaypayments"],
    },
];

/// Regex signatures targeting SDK script URLs and checkout endpoint paths.
///
/// Checked case-insensitively against the raw (non-lowercased) text so
/// version fragments like `/v3` survive intact.
pub static GATEWAY_REGEX_SIGNATURES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)js\.stripe\.com/v\d", "Stripe"),
        (r"(?i)paypal\.com/sdk/js", "PayPal"),
        (r"(?i)js\.braintreegateway\.com/web/\d", "Braintree"),
        (r"(?i)checkout\.razorpay\.com/v\d", "Razorpay"),
        (r"(?i)(sandbox\.)?web\.squarecdn\.com/v\d", "Square"),
        (r"(?i)checkoutshopper-(live|test)\.adyen\.com", "Adyen"),
        (r"(?i)js(test)?\.authorize\.net/v\d", "Authorize.Net"),
        (r"(?i)x\.klarnacdn\.net/kp/lib/v\d", "Klarna"),
        (r"(?i)pay\.google\.com/gp/p/js", "Google Pay"),
        (r"(?i)cdn\.checkout\.com", "Checkout.com"),
    ]
    .into_iter()
    .filter_map(|(pattern, name)| match Regex::new(pattern) {
        Ok(re) => Some((re, name)),
        Err(e) => {
            log::error!("Invalid gateway regex '{}': {}", pattern, e);
            None
        }
    })
    .collect()
});

/// Generic payment-capability indicators.
///
/// Each phrase maps to a descriptive label, not a specific processor: it
/// signals "payment capability present, processor unknown".
pub static PAYMENT_INDICATORS: &[(&str, &str)] = &[
    ("credit card", "Credit Card"),
    ("debit card", "Debit Card"),
    ("cvv", "Credit Card"),
    ("card number", "Credit Card"),
    ("payment gateway", "Payment Gateway"),
    ("secure payment", "Secure Payment"),
    ("payment method", "Payment Method"),
    ("pay with card", "Card Payment"),
];

/// Protection signatures scanned for by the protection filter.
pub static PROTECTION_SIGNATURES: &[&str] = &[
    "captcha",
    "cloudflare",
    "security check",
    "firewall",
    "ddos protection",
    "access denied",
    "attention required",
    "just a moment",
];

/// Substrings indicating an authentication flow on the page.
pub static AUTH_MARKERS: &[&str] = &[
    "login",
    "signin",
    "sign in",
    "register",
    "my-account",
    "password",
    "username",
];
