//! Short client descriptions for the activity log.

use std::sync::Arc;

/// Longest description stored with an activity entry.
const CLIENT_MAX_LENGTH: usize = 64;

/// Turns raw `User-Agent` headers into labels such as
/// `Chrome 120 on Mac OSX (Desktop)`.
#[derive(Clone)]
pub struct UserAgentParser {
    parser: Arc<woothee::parser::Parser>,
}

impl std::fmt::Debug for UserAgentParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAgentParser").finish_non_exhaustive()
    }
}

impl UserAgentParser {
    pub fn new() -> Self {
        Self {
            parser: Arc::new(woothee::parser::Parser::new()),
        }
    }

    /// Describes the client, or returns `None` when nothing is recognized.
    pub fn describe(&self, user_agent: &str) -> Option<String> {
        let result = self.parser.parse(user_agent)?;
        let known = |value: &str| !value.is_empty() && value != woothee::woothee::VALUE_UNKNOWN;

        let mut parts = Vec::with_capacity(3);
        if !known(result.name) {
            return None;
        }

        if known(result.version) {
            let major_version = result.version.split('.').next().unwrap_or(result.version);
            parts.push(format!("{} {}", result.name, major_version));
        } else {
            parts.push(result.name.to_string());
        }

        if known(result.os) {
            parts.push(format!("on {}", result.os));
        }

        if known(result.category) {
            let device = match result.category {
                "pc" => "Desktop",
                "smartphone" | "mobilephone" | "tablet" => "Mobile",
                "crawler" => "Bot",
                _ => "Other",
            };
            parts.push(format!("({})", device));
        }

        Some(parts.join(" ").chars().take(CLIENT_MAX_LENGTH).collect())
    }
}

impl Default for UserAgentParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_on_macos() {
        let parser = UserAgentParser::new();
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert_eq!(
            parser.describe(ua).as_deref(),
            Some("Chrome 120 on Mac OSX (Desktop)")
        );
    }

    #[test]
    fn firefox_on_windows() {
        let parser = UserAgentParser::new();
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0";
        assert_eq!(
            parser.describe(ua).as_deref(),
            Some("Firefox 121 on Windows 10 (Desktop)")
        );
    }

    #[test]
    fn safari_on_ios() {
        let parser = UserAgentParser::new();
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        let client = parser.describe(ua).unwrap_or_default();
        assert!(client.contains("Safari"));
        assert!(client.contains("Mobile"));
        assert!(client.len() <= CLIENT_MAX_LENGTH);
    }

    #[test]
    fn unknown_agents() {
        let parser = UserAgentParser::new();
        assert_eq!(parser.describe("definitely not a browser"), None);
    }
}
