//! Field normalizers shared by construction, revision and row rehydration.
//!
//! Every field of a posting goes through exactly one of these:
//! - [`bounded_text`]: trim, sanitize, reject empty, reject over-long
//! - [`title_cased`]: bounded text, then lower-case + title-case
//! - [`one_of`]: trim, sanitize, reject empty, exact member of an enum
//! - [`identifier`]: canonical UUID
//! - [`timestamp`]: optional, defaults to now
//!
//! Search terms reuse [`search_term`] so the repository never sees raw input.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use uuid::Uuid;

use super::error::ValidationError;

/// How a text field is scrubbed before it is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// Drop markup tags and control characters.
    Text,
    /// Keep only characters legal in a URL.
    Url,
}

/// Constraint for one bounded text column.
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub field: &'static str,
    pub max: usize,
    pub sanitizer: Sanitizer,
}

impl TextRule {
    pub const fn text(field: &'static str, max: usize) -> Self {
        Self {
            field,
            max,
            sanitizer: Sanitizer::Text,
        }
    }

    pub const fn url(field: &'static str, max: usize) -> Self {
        Self {
            field,
            max,
            sanitizer: Sanitizer::Url,
        }
    }
}

pub fn sanitize(raw: &str, sanitizer: Sanitizer) -> String {
    match sanitizer {
        Sanitizer::Text => strip_markup(raw),
        Sanitizer::Url => raw.chars().filter(|c| is_url_char(*c)).collect(),
    }
}

/// Removes `<...>` tags (an unterminated `<` swallows the rest) and control
/// characters other than line breaks.
fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;

    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '\n' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=".contains(c)
}

fn scrub(raw: &str, sanitizer: Sanitizer) -> String {
    sanitize(raw.trim(), sanitizer).trim().to_string()
}

pub fn bounded_text(raw: &str, rule: TextRule) -> Result<String, ValidationError> {
    let value = scrub(raw, rule.sanitizer);

    if value.is_empty() {
        return Err(ValidationError::invalid(rule.field, "empty or insecure"));
    }
    if value.chars().count() > rule.max {
        return Err(ValidationError::OutOfRange {
            field: rule.field,
            max: rule.max,
        });
    }

    Ok(value)
}

pub fn title_cased(raw: &str, rule: TextRule) -> Result<String, ValidationError> {
    let value = bounded_text(raw, rule)?;
    let value = title_case(&value.to_lowercase());

    // Case mapping can change the length for a handful of scripts.
    if value.chars().count() > rule.max {
        return Err(ValidationError::OutOfRange {
            field: rule.field,
            max: rule.max,
        });
    }

    Ok(value)
}

/// Upper-cases the first character of every whitespace-separated word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

pub fn one_of<T: FromStr>(field: &'static str, raw: &str, allowed: &str) -> Result<T, ValidationError> {
    let value = scrub(raw, Sanitizer::Text);

    if value.is_empty() {
        return Err(ValidationError::invalid(field, "empty or insecure"));
    }

    value
        .parse::<T>()
        .map_err(|_| ValidationError::invalid(field, format!("must be one of {allowed}")))
}

pub fn identifier(field: &'static str, raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ValidationError::invalid(field, "not a valid uuid"))
}

/// `None` means "now". Accepted forms are RFC 3339 and
/// `YYYY-MM-DD HH:MM:SS[.ffffff]` read as UTC.
pub fn timestamp(field: &'static str, raw: Option<&str>) -> Result<DateTime<Utc>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(stored_precision(Utc::now()));
    };
    let raw = raw.trim();

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|n| n.and_utc()))
        .map_err(|_| ValidationError::invalid(field, "not a valid date/time"))?;

    storable(field, stored_precision(parsed))
}

// TIMESTAMPTZ bounds in unix seconds: 4713-11-24 BC up to (not including) 294277-01-01.
const MIN_STORABLE_SECS: i64 = -210_866_803_200;
const END_STORABLE_SECS: i64 = 9_224_318_016_000;

fn storable(field: &'static str, ts: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    if (MIN_STORABLE_SECS..END_STORABLE_SECS).contains(&ts.timestamp()) {
        Ok(ts)
    } else {
        Err(ValidationError::invalid(field, "date out of range"))
    }
}

/// The store keeps microseconds; anything finer would not round-trip.
pub fn stored_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Normalizes a free-form search term the same way text fields are.
pub fn search_term(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = scrub(raw, Sanitizer::Text);
    if value.is_empty() {
        return Err(ValidationError::invalid(field, "search term is empty or insecure"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR: TextRule = TextRule::text("animalColor", 25);

    #[test]
    fn bounded_text_trims_and_strips_tags() {
        assert_eq!(bounded_text(" Brown ", COLOR).unwrap(), "Brown");
        assert_eq!(bounded_text("<b>Black</b> and white", COLOR).unwrap(), "Black and white");
        assert_eq!(bounded_text("tan\u{0}\u{7}", COLOR).unwrap(), "tan");
    }

    #[test]
    fn bounded_text_rejects_markup_only_input() {
        assert!(matches!(
            bounded_text("  <br/>  ", COLOR),
            Err(ValidationError::InvalidInput { field: "animalColor", .. })
        ));
        assert!(matches!(
            bounded_text("<img src=x onerror=alert(1)", COLOR),
            Err(ValidationError::InvalidInput { .. })
        ));
        // tag contents survive, only the tags go
        assert_eq!(bounded_text("<i>alert(1)</i>", COLOR).unwrap(), "alert(1)");
    }

    #[test]
    fn bounded_text_limit_counts_characters() {
        assert!(bounded_text(&"é".repeat(25), COLOR).is_ok());
        assert_eq!(
            bounded_text(&"a".repeat(26), COLOR),
            Err(ValidationError::OutOfRange {
                field: "animalColor",
                max: 25
            })
        );
    }

    #[test]
    fn url_sanitizer_drops_spaces_and_non_ascii() {
        let rule = TextRule::url("animalImageUrl", 500);
        assert_eq!(
            bounded_text(" https://img.example.com/a b.jpg ", rule).unwrap(),
            "https://img.example.com/ab.jpg"
        );
        assert!(bounded_text("üï é", rule).is_err());
    }

    #[test]
    fn title_case_follows_whitespace() {
        assert_eq!(title_case("mr. whiskers"), "Mr. Whiskers");
        assert_eq!(title_case("o'malley  the\tcat"), "O'malley  The\tCat");
    }

    #[test]
    fn timestamp_accepts_both_formats() {
        let a = timestamp("animalDate", Some("2024-05-01T12:30:00Z")).unwrap();
        let b = timestamp("animalDate", Some("2024-05-01 12:30:00")).unwrap();
        assert_eq!(a, b);

        let c = timestamp("animalDate", Some("2024-05-01 12:30:00.123456")).unwrap();
        assert_eq!(c.timestamp_subsec_micros(), 123_456);

        assert!(timestamp("animalDate", Some("yesterday")).is_err());
    }

    #[test]
    fn timestamp_outside_storable_range_is_invalid() {
        assert_eq!(
            timestamp("animalDate", Some("-100000-01-01 00:00:00")),
            Err(ValidationError::invalid("animalDate", "date out of range"))
        );
        assert!(timestamp("animalDate", Some("-4000-06-01 00:00:00")).is_ok());

        let too_early = DateTime::from_timestamp(MIN_STORABLE_SECS - 1, 0).unwrap();
        assert!(storable("animalDate", too_early).is_err());
        let earliest = DateTime::from_timestamp(MIN_STORABLE_SECS, 0).unwrap();
        assert_eq!(storable("animalDate", earliest), Ok(earliest));
    }

    #[test]
    fn timestamp_defaults_to_now() {
        let before = Utc::now();
        let ts = timestamp("animalDate", None).unwrap();
        let after = Utc::now();
        assert!(ts <= after);
        assert!(before - ts < chrono::Duration::milliseconds(1));
    }

    #[test]
    fn identifier_rejects_garbage() {
        assert!(identifier("animalId", "not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(identifier("animalId", &format!(" {id} ")).unwrap(), id);
    }
}
