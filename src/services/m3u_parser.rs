//! M3U playlist parser
//!
//! Turns playlist text into [`ChannelRecord`]s. Entries are `#EXTINF:` lines of
//! the form
//!
//! ```text
//! #EXTINF:-1 tvg-id="us.abcnews@720p" tvg-logo="http://..." group-title="News",ABC News
//! http://stream.example.com/abc.m3u8
//! ```
//!
//! The attribute order (`tvg-id`, `tvg-logo`, `group-title`, name) is part of
//! the contract: lines that do not follow it are dropped.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ChannelRecord;

/// Number of header lines at the top of every playlist
const HEADER_LINES: usize = 3;

const EXTINF_PREFIX: &str = "#EXTINF:";

lazy_static! {
    /// Metadata line: tvg-id, tvg-logo, group-title and the display name
    static ref INFO_LINE_REGEX: Regex = Regex::new(
        r#"#EXTINF:-1\s+tvg-id="([^"]*)"\s+tvg-logo="([^"]*)"\s+group-title="([^"]*)"[^,]*,(.+)$"#
    )
    .unwrap();
    static ref HTTP_REFERRER_REGEX: Regex = Regex::new(r#"http-referrer="([^"]*)""#).unwrap();
    static ref HTTP_USER_AGENT_REGEX: Regex = Regex::new(r#"http-user-agent="([^"]*)""#).unwrap();
}

/// Result of one parse pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylist {
    pub channels: Vec<ChannelRecord>,
    /// `#EXTINF:` entries dropped because the line was malformed or had no URL
    pub skipped: usize,
}

/// Parse playlist text into channel records, in source order
pub fn parse_playlist(text: &str) -> Vec<ChannelRecord> {
    parse_playlist_with_stats(text).channels
}

/// Parse playlist text, also counting the entries that were dropped
pub fn parse_playlist_with_stats(text: &str) -> ParsedPlaylist {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut parsed = ParsedPlaylist::default();

    let mut i = HEADER_LINES;
    while i < lines.len() {
        let line = lines[i].trim();

        if line.starts_with(EXTINF_PREFIX) {
            let url_line = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
            match parse_entry(line, url_line) {
                Some(channel) => parsed.channels.push(channel),
                None => parsed.skipped += 1,
            }
        }

        // Skip the metadata run that follows (#EXTINF plus any #EXTVLCOPT etc)
        let mut step = 0;
        while i + step < lines.len() && lines[i + step].trim().starts_with('#') {
            step += 1;
        }
        i += step.max(1);
    }

    parsed
}

/// Build one record from a metadata line and the line that follows it
fn parse_entry(info_line: &str, url_line: &str) -> Option<ChannelRecord> {
    let caps = INFO_LINE_REGEX.captures(info_line)?;

    if url_line.is_empty() {
        return None;
    }

    let tvg_id = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let tvg_logo = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let group_title = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
    let name = caps.get(4).map(|m| m.as_str().trim()).unwrap_or_default();

    // A blank name leaves nothing to list the channel under
    if name.is_empty() {
        return None;
    }

    let (country_code, quality) = extract_country_and_quality(tvg_id);

    Some(ChannelRecord {
        id: tvg_id.to_string(),
        display_name: name.to_string(),
        logo_url: (!tvg_logo.is_empty()).then(|| tvg_logo.to_string()),
        group_label: group_title.to_string(),
        categories: parse_categories(group_title),
        country_code,
        quality,
        stream_url: url_line.to_string(),
        http_referrer: extract_attribute(info_line, &HTTP_REFERRER_REGEX),
        http_user_agent: extract_attribute(info_line, &HTTP_USER_AGENT_REGEX),
    })
}

/// Country code and quality from a tvg-id such as `abcnews.us@720p`
///
/// Uses the segment after the last `.`; the part before `@` is the country,
/// the part after it the quality. Never fails: missing pieces are empty.
/// An id written country-first (`us.abcnews@720p`) yields `abcnews`.
pub fn extract_country_and_quality(tvg_id: &str) -> (String, String) {
    let suffix = tvg_id.rsplit('.').next().unwrap_or_default();
    let mut parts = suffix.split('@');
    let country = parts.next().unwrap_or_default().to_string();
    let quality = parts.next().unwrap_or_default().to_string();
    (country, quality)
}

/// Categories of a group title: split on the letter `p`, empty fragments dropped
///
/// This reproduces the grouping convention of the upstream data literally,
/// so "Sports" becomes `["S", "orts"]`.
pub fn parse_categories(group_title: &str) -> Vec<String> {
    group_title
        .split('p')
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

fn extract_attribute(info_line: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(info_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "H1\nH2\nH3\n";

    fn entry(id: &str, group: &str, name: &str, url: &str) -> String {
        format!(
            "#EXTINF:-1 tvg-id=\"{}\" tvg-logo=\"http://x/logo.png\" group-title=\"{}\",{}\n{}\n",
            id, group, name, url
        )
    }

    #[test]
    fn test_single_entry_scenario() {
        let text = format!(
            "{}#EXTINF:-1 tvg-id=\"test.us@720p\" tvg-logo=\"http://x/logo.png\" group-title=\"Sports\",Test Channel\nhttp://stream/x.m3u8\n",
            HEADER
        );

        let channels = parse_playlist(&text);
        assert_eq!(channels.len(), 1);

        let channel = &channels[0];
        assert_eq!(channel.id, "test.us@720p");
        assert_eq!(channel.country_code, "us");
        assert_eq!(channel.quality, "720p");
        assert_eq!(channel.categories, vec!["S", "orts"]);
        assert_eq!(channel.display_name, "Test Channel");
        assert_eq!(channel.stream_url, "http://stream/x.m3u8");
        assert_eq!(channel.logo_url.as_deref(), Some("http://x/logo.png"));
        assert_eq!(channel.group_label, "Sports");
        assert_eq!(channel.http_referrer, None);
        assert_eq!(channel.http_user_agent, None);
    }

    #[test]
    fn test_entries_in_source_order() {
        let mut text = HEADER.to_string();
        text.push_str(&entry("a.us", "News", "Alpha", "http://a"));
        text.push_str(&entry("b.uk", "News", "Bravo", "http://b"));
        text.push_str(&entry("c.fr", "Movies", "Charlie", "http://c"));

        let ids: Vec<_> = parse_playlist(&text).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a.us", "b.uk", "c.fr"]);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let mut text = HEADER.to_string();
        text.push_str(&entry("a.us", "News", "Alpha", "http://a1"));
        text.push_str(&entry("a.us", "News", "Alpha", "http://a2"));

        let channels = parse_playlist(&text);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].stream_url, "http://a2");
    }

    #[test]
    fn test_header_lines_are_never_inspected() {
        let text = format!(
            "{}{}{}",
            entry("h.us", "News", "Hidden", "http://h"),
            "H3\n",
            entry("v.us", "News", "Visible", "http://v")
        );

        // First entry occupies lines 0-1 and line 2 is "H3": all header
        let channels = parse_playlist(&text);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].id, "v.us");
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let mut text = HEADER.to_string();
        text.push_str(&entry("a.us", "News", "Alpha", "http://a"));
        // missing tvg-logo
        text.push_str("#EXTINF:-1 tvg-id=\"bad.us\" group-title=\"News\",Broken\nhttp://bad\n");
        // attributes out of order
        text.push_str("#EXTINF:-1 group-title=\"News\" tvg-id=\"x.us\" tvg-logo=\"\",Swapped\nhttp://x\n");
        text.push_str(&entry("c.us", "News", "Charlie", "http://c"));

        let parsed = parse_playlist_with_stats(&text);
        let ids: Vec<_> = parsed.channels.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a.us", "c.us"]);
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_entry_without_url_is_dropped() {
        let mut text = HEADER.to_string();
        text.push_str("#EXTINF:-1 tvg-id=\"a.us\" tvg-logo=\"\" group-title=\"\",Alpha\n\n");
        text.push_str(&entry("b.us", "News", "Bravo", "http://b"));

        let parsed = parse_playlist_with_stats(&text);
        assert_eq!(parsed.channels.len(), 1);
        assert_eq!(parsed.channels[0].id, "b.us");
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_trailing_entry_without_url_line() {
        let text = format!("{}#EXTINF:-1 tvg-id=\"a.us\" tvg-logo=\"\" group-title=\"\",Alpha", HEADER);
        assert!(parse_playlist(&text).is_empty());
    }

    #[test]
    fn test_url_is_line_right_after_extinf() {
        let mut text = HEADER.to_string();
        text.push_str("#EXTINF:-1 tvg-id=\"a.us\" tvg-logo=\"\" group-title=\"News\",Alpha\n");
        text.push_str("#EXTVLCOPT:http-referrer=http://ref\n");
        text.push_str("http://a\n");
        text.push_str(&entry("b.us", "News", "Bravo", "http://b"));

        let channels = parse_playlist(&text);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].stream_url, "#EXTVLCOPT:http-referrer=http://ref");
        assert_eq!(channels[1].id, "b.us");
    }

    #[test]
    fn test_http_headers_are_extracted() {
        let text = format!(
            "{}#EXTINF:-1 tvg-id=\"a.us\" tvg-logo=\"\" group-title=\"News\" http-referrer=\"http://ref/\" http-user-agent=\"Mozilla/5.0\",Alpha\nhttp://a\n",
            HEADER
        );

        let channels = parse_playlist(&text);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].http_referrer.as_deref(), Some("http://ref/"));
        assert_eq!(channels[0].http_user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(channels[0].logo_url, None);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "H1\r\nH2\r\nH3\r\n#EXTINF:-1 tvg-id=\"a.us\" tvg-logo=\"\" group-title=\"News\",Alpha\r\nhttp://a\r\n";
        let channels = parse_playlist(text);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].display_name, "Alpha");
        assert_eq!(channels[0].stream_url, "http://a");
    }

    #[test]
    fn test_empty_and_header_only_input() {
        assert!(parse_playlist("").is_empty());
        assert!(parse_playlist("#EXTM3U\n").is_empty());
        assert!(parse_playlist(HEADER).is_empty());
    }

    #[test]
    fn test_extract_country_and_quality() {
        assert_eq!(
            extract_country_and_quality("abcnews.us@720p"),
            ("us".to_string(), "720p".to_string())
        );
        assert_eq!(
            extract_country_and_quality("abcnews.us"),
            ("us".to_string(), String::new())
        );
        assert_eq!(extract_country_and_quality(""), (String::new(), String::new()));
        assert_eq!(
            extract_country_and_quality("ABC.news.UK@SD"),
            ("UK".to_string(), "SD".to_string())
        );
        // no dot: the whole id is the segment
        assert_eq!(
            extract_country_and_quality("plain"),
            ("plain".to_string(), String::new())
        );
    }

    #[test]
    fn test_country_comes_from_last_segment() {
        assert_eq!(
            extract_country_and_quality("us.abcnews@720p"),
            ("abcnews".to_string(), "720p".to_string())
        );
        assert_eq!(
            extract_country_and_quality("us.abcnews"),
            ("abcnews".to_string(), String::new())
        );
    }

    #[test]
    fn test_blank_name_is_skipped() {
        let mut text = HEADER.to_string();
        text.push_str("#EXTINF:-1 tvg-id=\"a.us\" tvg-logo=\"\" group-title=\"News\",   \nhttp://a\n");
        text.push_str(&entry("b.us", "News", "Bravo", "http://b"));

        let parsed = parse_playlist_with_stats(&text);
        assert_eq!(parsed.channels.len(), 1);
        assert_eq!(parsed.channels[0].id, "b.us");
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_parse_categories_splits_on_letter_p() {
        assert_eq!(parse_categories("News"), vec!["News"]);
        assert_eq!(parse_categories("Sports"), vec!["S", "orts"]);
        assert_eq!(parse_categories("Newsport"), vec!["News", "ort"]);
        assert_eq!(parse_categories("pop"), vec!["o"]);
        assert!(parse_categories("").is_empty());
    }
}
