// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic US street address extraction from free-form SMS text.
//!
//! This is a pattern matcher, not a postal validator: abbreviations are kept
//! as typed and nothing is checked against a real address database. Only a
//! result with street, city, state, and ZIP all present is returned.

use std::sync::LazyLock;

use leadline_core::ParsedAddress;
use regex::Regex;

static ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("zip pattern is valid"));

static STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(AL|AK|AZ|AR|CA|CO|CT|DE|FL|GA|HI|ID|IL|IN|IA|KS|KY|LA|ME|MD|MA|MI|MN|MS|MO|MT|NE|NV|NH|NJ|NM|NY|NC|ND|OH|OK|OR|PA|RI|SC|SD|TN|TX|UT|VT|VA|WA|WV|WI|WY)\b",
    )
    .expect("state pattern is valid")
});

/// Segment separators: commas or runs of two or more whitespace characters.
static SEGMENT_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\s{2,}").expect("segment pattern is valid"));

/// Street-type words that end the street part of an unpunctuated address.
const STREET_SUFFIXES: &[&str] = &[
    "st", "street", "ave", "avenue", "av", "rd", "road", "blvd", "boulevard", "ln", "lane", "dr",
    "drive", "ct", "court", "way", "pl", "place", "hwy", "highway", "pkwy", "parkway", "cir",
    "circle", "ter", "terrace", "trl", "trail", "loop", "sq", "square", "pike", "fwy", "expy",
];

/// Extract a complete address, or `None` when any component is missing.
pub fn parse_address(text: &str) -> Option<ParsedAddress> {
    let flat = text.replace(['\r', '\n'], " ");
    let flat = flat.trim();

    // The ZIP usually closes the address; a house number can also be five digits.
    let zip = ZIP.captures_iter(flat).last()?;
    let zip_start = zip.get(0)?.start();
    let zip_code = zip.get(1)?.as_str().to_string();

    // Prefer the state token nearest the ZIP so words like "in" or "or"
    // earlier in the sentence are not taken for a state.
    let state_match = STATE
        .find_iter(flat)
        .filter(|m| m.end() <= zip_start)
        .last()
        .or_else(|| STATE.find(flat))?;
    let state = state_match.as_str().to_uppercase();

    let before_state = flat[..state_match.start()].trim();
    let segments: Vec<&str> = SEGMENT_SPLIT
        .split(before_state)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let (street, city) = match segments.as_slice() {
        [] => return None,
        [single] => split_on_suffix(single)?,
        [rest @ .., last] => (rest.join(", "), (*last).to_string()),
    };
    let street = from_house_number(&street);
    if street.is_empty() || city.is_empty() {
        return None;
    }

    Some(ParsedAddress::new(street, city, state, zip_code))
}

/// Split `"123 Main St Dallas"` after the last street-type word.
fn split_on_suffix(segment: &str) -> Option<(String, String)> {
    let words: Vec<&str> = segment.split_whitespace().collect();
    let suffix_at = words.iter().rposition(|w| {
        let bare = w.trim_end_matches('.').to_ascii_lowercase();
        STREET_SUFFIXES.contains(&bare.as_str())
    })?;
    if suffix_at + 1 >= words.len() {
        return None;
    }
    let street = words[..=suffix_at].join(" ");
    let city = words[suffix_at + 1..].join(" ");
    Some((street, city))
}

/// Drop leading words ("my address is") before the house number, if any.
fn from_house_number(street: &str) -> String {
    let words: Vec<&str> = street.split_whitespace().collect();
    match words
        .iter()
        .position(|w| w.starts_with(|c: char| c.is_ascii_digit()))
    {
        Some(0) | None => street.trim().to_string(),
        Some(i) => words[i..].join(" "),
    }
}
