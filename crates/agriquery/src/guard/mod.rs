//! Read-only SQL policy applied before anything reaches the store.
//!
//! This is a coarse text filter, not a parser. Keywords are matched as plain
//! substrings of the lower-cased statement, so a SELECT that mentions
//! `'deleted'` in a literal or reads a column such as `updated_at` is rejected
//! as well. Multi-statement protection is left to the store.

use tracing::warn;

use crate::error::PolicyViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRule {
    DenySubstring(&'static str),
    RequirePrefix(&'static str),
}

/// Rules in evaluation order; the first failing rule decides the violation.
pub const POLICY_RULES: &[PolicyRule] = &[
    PolicyRule::DenySubstring("drop"),
    PolicyRule::DenySubstring("delete"),
    PolicyRule::DenySubstring("truncate"),
    PolicyRule::DenySubstring("alter"),
    PolicyRule::DenySubstring("create"),
    PolicyRule::DenySubstring("insert"),
    PolicyRule::DenySubstring("update"),
    PolicyRule::RequirePrefix("select"),
];

impl PolicyRule {
    fn check(self, normalized_sql: &str) -> Result<(), PolicyViolation> {
        match self {
            Self::DenySubstring(keyword) if normalized_sql.contains(keyword) => {
                Err(PolicyViolation::ForbiddenKeyword(keyword))
            }
            Self::RequirePrefix(prefix) if !normalized_sql.starts_with(prefix) => {
                Err(PolicyViolation::NotSelect)
            }
            _ => Ok(()),
        }
    }
}

/// Accepts or rejects `sql`; the statement itself is never rewritten.
pub fn validate_sql(sql: &str) -> Result<bool, PolicyViolation> {
    let normalized = sql.trim().to_lowercase();
    for rule in POLICY_RULES {
        if let Err(violation) = rule.check(&normalized) {
            warn!(%violation, "rejected generated SQL");
            return Err(violation);
        }
    }
    Ok(true)
}
