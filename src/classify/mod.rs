//! Store classification heuristics.
//!
//! Decides whether a fetched page looks like a genuine e-commerce store via a
//! deliberately permissive OR-of-thresholds over textual indicators and
//! structural DOM signals. False positives are acceptable: the verdict only
//! gates whether gateway fingerprinting proceeds, it is not a hard security
//! decision.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::config::{
    ACTION_ELEMENTS_THRESHOLD, INDICATOR_HITS_THRESHOLD, PRODUCT_ELEMENTS_THRESHOLD,
};

/// Lowercase phrases whose presence in page text indicates a store.
const STORE_INDICATORS: &[&str] = &[
    "add to cart",
    "add to bag",
    "add to basket",
    "buy now",
    "checkout",
    "check out",
    "shopping cart",
    "view cart",
    "my cart",
    "in stock",
    "out of stock",
    "free shipping",
    "shipping",
    "delivery",
    "product",
    "products",
    "shop now",
    "store",
    "sale",
    "discount",
    "price",
    "order now",
    "payment",
    "wishlist",
    "$",
    "€",
    "£",
];

/// Action words looked for in form/button/input attributes.
const ACTION_WORDS: &[&str] = &["add", "buy", "cart", "checkout", "shop"];

/// Commerce words looked for in block-element class attributes.
const PRODUCT_WORDS: &[&str] = &["product", "price", "cart", "item", "stock"];

/// Cart-glyph hints looked for in icon-element class attributes.
const CART_ICON_WORDS: &[&str] = &["cart", "bag", "basket", "trolley"];

fn parse_selector(s: &str) -> Selector {
    Selector::parse(s).unwrap_or_else(|e| {
        log::error!("Failed to parse selector '{}': {}", s, e);
        // Known-valid selector that matches nothing, so a bad selector string
        // degrades to a zero count instead of a panic
        Selector::parse("*:not(*)").expect("fallback selector is valid")
    })
}

static ACTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector("form, button, input"));
static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector("div, span"));
static ICON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector("i, svg"));

/// Counts store-indicator phrases present in the lowercased page text.
///
/// Each distinct phrase counts at most once; counting is monotone in the
/// text (adding content never lowers the count).
pub fn count_indicator_hits(raw_text: &str) -> usize {
    if raw_text.is_empty() {
        return 0;
    }
    let text = raw_text.to_lowercase();
    STORE_INDICATORS
        .iter()
        .filter(|phrase| text.contains(*phrase))
        .count()
}

fn attr_contains_any(value: Option<&str>, words: &[&str]) -> bool {
    match value {
        Some(v) => {
            let v = v.to_lowercase();
            words.iter().any(|w| v.contains(w))
        }
        None => false,
    }
}

/// Counts form/button/input elements whose `type` or `value` attribute
/// carries an action word (add/buy/cart/checkout/shop).
fn count_action_elements(document: &Html) -> usize {
    document
        .select(&ACTION_SELECTOR)
        .filter(|el| {
            attr_contains_any(el.value().attr("type"), ACTION_WORDS)
                || attr_contains_any(el.value().attr("value"), ACTION_WORDS)
                || attr_contains_any(el.value().attr("name"), ACTION_WORDS)
        })
        .count()
}

/// Counts div/span elements whose class attribute carries a commerce word.
fn count_product_elements(document: &Html) -> usize {
    document
        .select(&BLOCK_SELECTOR)
        .filter(|el| attr_contains_any(el.value().attr("class"), PRODUCT_WORDS))
        .count()
}

/// Counts icon elements whose class suggests a cart/bag glyph.
fn count_cart_icons(document: &Html) -> usize {
    document
        .select(&ICON_SELECTOR)
        .filter(|el| attr_contains_any(el.value().attr("class"), CART_ICON_WORDS))
        .count()
}

/// Classifies a fetched page as a real store or not.
///
/// Pure function of (document, text); repeated calls on the same input return
/// the same verdict. Empty text and an empty document always classify as
/// not-a-store.
///
/// Verdict: real store iff
/// `indicator_hits >= 3 OR action_elements > 2 OR product_elements > 3 OR cart_icons > 0`
/// (thresholds from `config::constants`, tunable).
pub fn classify(document: &Html, raw_text: &str) -> bool {
    let indicator_hits = count_indicator_hits(raw_text);
    let action_elements = count_action_elements(document);
    let product_elements = count_product_elements(document);
    let cart_icons = count_cart_icons(document);

    log::debug!(
        "classification signals: indicators={indicator_hits} actions={action_elements} \
         products={product_elements} icons={cart_icons}"
    );

    indicator_hits >= INDICATOR_HITS_THRESHOLD
        || action_elements > ACTION_ELEMENTS_THRESHOLD
        || product_elements > PRODUCT_ELEMENTS_THRESHOLD
        || cart_icons > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_not_a_store() {
        let document = Html::parse_document("");
        assert!(!classify(&document, ""));
    }

    #[test]
    fn test_four_indicator_phrases_classify_as_store() {
        // 4 distinct indicator phrases and no matching DOM elements
        let text = "checkout here. shipping is fast. great price. add to cart today";
        let document = Html::parse_document("<html><body><p>plain</p></body></html>");
        assert!(count_indicator_hits(text) >= 4);
        assert!(classify(&document, text));
    }

    #[test]
    fn test_two_indicators_not_enough() {
        let text = "fast shipping and a fair price";
        let document = Html::parse_document("<html><body></body></html>");
        assert!(!classify(&document, text));
    }

    #[test]
    fn test_indicator_counting_is_monotone() {
        let base = "fast shipping and a fair price";
        let extended = format!("{base} checkout now");
        assert!(count_indicator_hits(&extended) >= count_indicator_hits(base));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let html = "<div class='product-grid'><span class='price'>$5</span></div>";
        let text = "add to cart";
        let document = Html::parse_document(html);
        let first = classify(&document, text);
        for _ in 0..5 {
            assert_eq!(classify(&document, text), first);
        }
    }

    #[test]
    fn test_cart_icon_alone_is_enough() {
        let html = "<html><body><i class='fa fa-shopping-cart'></i></body></html>";
        let document = Html::parse_document(html);
        assert!(classify(&document, "nothing interesting here"));
    }

    #[test]
    fn test_action_elements_threshold() {
        let html = r#"
            <form><input type="submit" value="Add to cart"></form>
            <button name="buy-button">go</button>
            <input type="button" value="Checkout">
        "#;
        let document = Html::parse_document(html);
        // 3 action elements > threshold of 2
        assert!(classify(&document, ""));
    }

    #[test]
    fn test_product_elements_threshold() {
        let html = r#"
            <div class="product"></div>
            <div class="product-card"></div>
            <span class="price"></span>
            <span class="stock-level"></span>
        "#;
        let document = Html::parse_document(html);
        // 4 product elements > threshold of 3
        assert!(classify(&document, ""));
    }

    #[test]
    fn test_plain_article_page_is_not_a_store() {
        let html = r#"
            <html><body>
              <div class="article"><span class="byline">by someone</span></div>
              <p>A long essay about nothing commercial.</p>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        assert!(!classify(&document, "a long essay about nothing commercial"));
    }
}
