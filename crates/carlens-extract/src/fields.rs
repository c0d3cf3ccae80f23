//! Field extraction from free text.
//!
//! Every function here is total: a miss resolves to a documented default
//! instead of an error, because OCR output is noisy and a best-effort record
//! is more useful than a failed request.
//!
//! Matching runs on the lower-cased text, so keywords are case-insensitive.
//! Numbers accept a comma as the decimal separator (`4,5` is `4.5`); there is
//! no thousands separator.

use carlens_core::{ExtractedFields, MAX_RATING};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Price used when no price pattern matches.
pub const DEFAULT_PRICE: f64 = 50_000.0;

/// Rating used when no rating pattern matches.
pub const DEFAULT_RATING: f64 = 4.0;

/// Brand/model used when no label matches.
pub const UNKNOWN: &str = "Unknown";

/// Brand labels, in priority order.
pub const BRAND_KEYWORDS: &[&str] = &["marca", "brand"];

/// Model labels, in priority order.
pub const MODEL_KEYWORDS: &[&str] = &["modelo", "model"];

/// Currency symbol, currency word, price label.
static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:r|us)?\$\s*([0-9]+(?:[.,][0-9]+)?)",
        r"([0-9]+(?:[.,][0-9]+)?)\s*(?:reais|real|d[óo]lares|dollars?)\b",
        r"(?:preço|preco|price)[:\s]*([0-9]+(?:[.,][0-9]+)?)",
    ])
});

/// Rating label (with optional explicit scale), `x/5`, `x/10`.
static RATING_PATTERNS: LazyLock<Vec<(Regex, RatingScale)>> = LazyLock::new(|| {
    compile(&[
        r"(?:nota|rating|score)[:\s]*([0-9]+(?:[.,][0-9]+)?)(?:\s*/\s*(5|10)\b)?",
        r"([0-9]+(?:[.,][0-9]+)?)\s*/\s*5\b",
        r"([0-9]+(?:[.,][0-9]+)?)\s*/\s*10\b",
    ])
    .into_iter()
    .zip([RatingScale::Labeled, RatingScale::OutOfFive, RatingScale::OutOfTen])
    .collect()
});

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{4})-([0-9]{2})-([0-9]{2})\b").expect("valid regex"));

static DMY_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{2})/([0-9]{2})/([0-9]{4})\b").expect("valid regex"));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum RatingScale {
    /// Scale taken from an optional `/5` or `/10` suffix
    Labeled,
    OutOfFive,
    OutOfTen,
}

/// Extract every car field from `text`.
#[must_use]
pub fn extract_car_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        brand: extract_labeled_text(text, BRAND_KEYWORDS, UNKNOWN),
        model: extract_labeled_text(text, MODEL_KEYWORDS, UNKNOWN),
        price: extract_price(text),
        rating: extract_rating(text),
        launch_date: extract_launch_date(text),
    }
}

/// Return the rest of the line following the first keyword that appears.
///
/// Keywords are tried in order; the keyword may be followed by `:` and
/// whitespace (including a line break) before the value. The value is
/// trimmed and title-cased. A value that is blank after trimming counts as
/// a miss.
#[must_use]
pub fn extract_labeled_text(text: &str, keywords: &[&str], default: &str) -> String {
    let lowered = text.to_lowercase();

    for keyword in keywords {
        let pattern = format!(r"{}[:\s]*([^\n\r]+)", regex::escape(&keyword.to_lowercase()));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };

        if let Some(value) = re.captures(&lowered).and_then(|c| c.get(1)) {
            let value = value.as_str().trim();
            if !value.is_empty() {
                return title_case(value);
            }
        }
    }

    debug!("No label from {:?} found, using {:?}", keywords, default);
    default.to_string()
}

/// Extract a price, or [`DEFAULT_PRICE`].
#[must_use]
pub fn extract_price(text: &str) -> f64 {
    let lowered = text.to_lowercase();

    for re in PRICE_PATTERNS.iter() {
        if let Some(price) = re
            .captures(&lowered)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_decimal(m.as_str()))
        {
            return price;
        }
    }

    debug!("No price found, using default {}", DEFAULT_PRICE);
    DEFAULT_PRICE
}

/// Extract a rating normalized to `[0, 5]`, or [`DEFAULT_RATING`].
///
/// Values given out of 10 are halved before clamping.
#[must_use]
pub fn extract_rating(text: &str) -> f64 {
    let lowered = text.to_lowercase();

    for (re, scale) in RATING_PATTERNS.iter() {
        let Some(caps) = re.captures(&lowered) else {
            continue;
        };
        let Some(value) = caps.get(1).and_then(|m| parse_decimal(m.as_str())) else {
            continue;
        };

        let out_of_ten = match scale {
            RatingScale::Labeled => caps.get(2).is_some_and(|m| m.as_str() == "10"),
            RatingScale::OutOfFive => false,
            RatingScale::OutOfTen => true,
        };
        let normalized = if out_of_ten { value / 2.0 } else { value };
        return clamp_rating(normalized);
    }

    debug!("No rating found, using default {}", DEFAULT_RATING);
    DEFAULT_RATING
}

/// Extract the first valid `YYYY-MM-DD` or `DD/MM/YYYY` date.
#[must_use]
pub fn extract_launch_date(text: &str) -> Option<NaiveDate> {
    let iso = ISO_DATE.captures_iter(text).find_map(|c| {
        NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    });

    iso.or_else(|| {
        DMY_DATE.captures_iter(text).find_map(|c| {
            NaiveDate::from_ymd_opt(c[3].parse().ok()?, c[2].parse().ok()?, c[1].parse().ok()?)
        })
    })
}

/// Clamp into `[0, 5]`. Idempotent.
#[must_use]
pub fn clamp_rating(rating: f64) -> f64 {
    rating.clamp(0.0, MAX_RATING)
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse().ok()
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
