//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Maximum message length the transport accepts in one send
pub const MAX_MESSAGE_LEN: usize = 4000;
/// Chunk size for follow-up parts of an oversized reply
pub const CHUNK_LEN: usize = 3500;
/// Maximum number of parts sent for one reply, summary included
pub const MAX_PARTS: usize = 3;
/// Number of leading lines kept in the summary part
pub const SUMMARY_LINES: usize = 15;
/// Marker appended to a truncated summary
pub const TRUNCATION_MARKER: &str = "📄 *[Content truncated for WhatsApp]*";

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format an uptime duration as a short human-readable string
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}

/// Truncate text to a maximum number of characters, char-boundary safe
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

/// Split text into fixed-size character chunks, preserving all content
pub fn chunk_by_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Split a reply for the transport's message-size limit.
///
/// Short replies pass through unchanged. Oversized replies become a truncated
/// summary (first lines plus a marker) followed by numbered follow-up parts of
/// `CHUNK_LEN` characters. The first chunk is skipped since the summary
/// already covers the head of the text, and at most `MAX_PARTS` messages are
/// produced so a single reply cannot flood the conversation. Content past the
/// cap is dropped.
pub fn split_for_transport(text: &str) -> Vec<String> {
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return vec![text.to_string()];
    }

    let summary_body: String = text
        .lines()
        .take(SUMMARY_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    let summary = format!(
        "{}\n\n{}",
        truncate_chars(&summary_body, CHUNK_LEN),
        TRUNCATION_MARKER
    );

    let mut messages = vec![summary];
    let chunks = chunk_by_chars(text, CHUNK_LEN);
    for (i, chunk) in chunks.iter().enumerate().take(MAX_PARTS).skip(1) {
        messages.push(format!("📄 *Part {}*\n\n{}", i + 1, chunk));
    }

    messages
}

/// Extract a moderation target (phone number or @display-name) from a command
/// argument string
pub fn extract_mentioned_user(text: &str) -> Option<String> {
    let mention_re = regex::Regex::new(r"@(\w+)").expect("valid regex");
    if let Some(caps) = mention_re.captures(text) {
        return Some(caps[1].to_string());
    }

    let phone_re = regex::Regex::new(r"\+?\d[\d\s\-]{6,}").expect("valid regex");
    phone_re.find(text).map(|m| m.as_str().trim().to_string())
}

/// Basic phone number shape validation
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() >= 10
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 5), "héllo");
        assert_eq!(truncate_chars(text, 100), text);
    }

    #[test]
    fn test_chunk_round_trip() {
        let text = "abcdef".repeat(2000); // 12000 chars
        let chunks = chunk_by_chars(&text, CHUNK_LEN);
        assert_eq!(chunks.concat(), text);
        assert!(chunks[..chunks.len() - 1]
            .iter()
            .all(|c| c.chars().count() == CHUNK_LEN));
    }

    #[test]
    fn test_short_reply_passes_through() {
        let text = "short reply";
        assert_eq!(split_for_transport(text), vec![text.to_string()]);
    }

    #[test]
    fn test_oversized_reply_is_split_and_capped() {
        let text: String = (0..12_000)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let messages = split_for_transport(&text);

        // Summary plus at most MAX_PARTS - 1 follow-ups
        assert_eq!(messages.len(), MAX_PARTS);
        assert!(messages[0].ends_with(TRUNCATION_MARKER));

        // Follow-up payloads reproduce the middle of the original, uncorrupted
        let chunks = chunk_by_chars(&text, CHUNK_LEN);
        for (i, msg) in messages.iter().enumerate().skip(1) {
            let expected = format!("📄 *Part {}*\n\n{}", i + 1, chunks[i]);
            assert_eq!(msg, &expected);
        }

        // Covered span is bounded; the tail is dropped, not corrupted
        let covered: String = chunks[1..MAX_PARTS].concat();
        let expected_span: String = text
            .chars()
            .skip(CHUNK_LEN)
            .take(covered.chars().count())
            .collect();
        assert_eq!(covered, expected_span);
    }

    #[test]
    fn test_split_multibyte_no_panic() {
        let text = "日本語のテキスト".repeat(1000);
        let messages = split_for_transport(&text);
        assert!(messages.len() <= MAX_PARTS);
    }

    #[test]
    fn test_extract_mentioned_user() {
        assert_eq!(
            extract_mentioned_user("@alice please"),
            Some("alice".to_string())
        );
        assert_eq!(
            extract_mentioned_user("+15551234567"),
            Some("+15551234567".to_string())
        );
        assert_eq!(extract_mentioned_user("no target"), None);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(90)), "1m 30s");
        assert_eq!(
            format_uptime(Duration::from_secs(3 * 3600 + 120)),
            "3h 2m 0s"
        );
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3600)),
            "2d 1h 0m"
        );
    }
}
