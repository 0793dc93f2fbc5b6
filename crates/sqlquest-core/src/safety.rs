//! Lexical gate in front of the simulated engine. Not a parser: it has no
//! notion of comments or string literals, and may over-block a keyword that
//! only appears inside one. That trade is intentional for a read-only
//! playground.

use regex::Regex;
use std::sync::OnceLock;

/// Mutating/DDL keywords that block a query wherever they appear.
const DENY_LIST: [&str; 10] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE", "GRANT", "REVOKE",
    "EXECUTE",
];

/// Fixed message surfaced to the user when a query is blocked.
pub const BLOCKED_MESSAGE: &str =
    "Security Alert: Only SELECT statements are allowed. DML/DDL commands are blocked.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub blocked: bool,
    pub reason: Option<String>,
}

fn deny_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Whole-word match so a column named created_at does not trip CREATE.
        Regex::new(&format!(r"(?i)\b(?:{})\b", DENY_LIST.join("|")))
            .expect("deny-list pattern is valid")
    })
}

/// Case-insensitive whole-word scan of the raw query text.
pub fn check(query: &str) -> SafetyVerdict {
    match deny_pattern().find(query) {
        Some(m) => SafetyVerdict {
            blocked: true,
            reason: Some(format!(
                "query contains forbidden keyword {}",
                m.as_str().to_uppercase()
            )),
        },
        None => SafetyVerdict {
            blocked: false,
            reason: None,
        },
    }
}
