//! Per-role query policy.
//!
//! Pure functions, no I/O. The filter is lexical by design: a
//! case-insensitive substring check against the raw query text, not a
//! parsed statement. That keeps it cheap and hard to bypass with comment
//! tricks, at the cost of false positives (a banned token inside a
//! string literal still trips it) and false negatives (a semantically
//! equivalent statement phrased without the token sails through).

use floe_common::models::Role;

/// Outcome of a policy check. Computed fresh per request; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Permit,
    Deny { reason: String },
}

impl PolicyDecision {
    pub fn is_permit(&self) -> bool {
        matches!(self, PolicyDecision::Permit)
    }
}

/// Decide whether `sql` may run under `role`. Rules are ordered; the
/// first match wins.
pub fn evaluate(sql: &str, role: Role) -> PolicyDecision {
    let upper = sql.to_uppercase();

    if upper.contains("DROP") && role != Role::Admin {
        return PolicyDecision::Deny {
            reason: "DROP operations restricted to admin role".to_string(),
        };
    }

    if upper.contains("UPDATE") && role == Role::Analyst {
        return PolicyDecision::Deny {
            reason: "UPDATE operations not permitted for analysts".to_string(),
        };
    }

    PolicyDecision::Permit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deny_reason(sql: &str, role: Role) -> Option<String> {
        match evaluate(sql, role) {
            PolicyDecision::Permit => None,
            PolicyDecision::Deny { reason } => Some(reason),
        }
    }

    #[test]
    fn test_drop_denied_for_non_admin_roles() {
        for role in [Role::Analyst, Role::DataScientist] {
            assert_eq!(
                deny_reason("DROP TABLE staging", role).as_deref(),
                Some("DROP operations restricted to admin role")
            );
        }
    }

    #[test]
    fn test_drop_permitted_for_admin() {
        assert!(evaluate("DROP TABLE staging", Role::Admin).is_permit());
    }

    #[test]
    fn test_drop_check_is_case_insensitive() {
        assert!(!evaluate("drop table staging", Role::Analyst).is_permit());
        assert!(!evaluate("DrOp TaBlE staging", Role::DataScientist).is_permit());
    }

    #[test]
    fn test_update_denied_for_analyst_only() {
        assert_eq!(
            deny_reason("UPDATE accounts SET x=1", Role::Analyst).as_deref(),
            Some("UPDATE operations not permitted for analysts")
        );
        assert!(evaluate("UPDATE accounts SET x=1", Role::DataScientist).is_permit());
        assert!(evaluate("update accounts set x=1", Role::Admin).is_permit());
    }

    #[test]
    fn test_update_check_is_case_insensitive() {
        assert!(!evaluate("update accounts set x=1", Role::Analyst).is_permit());
    }

    #[test]
    fn test_rule_order_drop_wins_over_update() {
        // Both tokens present for an analyst: the DROP rule fires first.
        assert_eq!(
            deny_reason("UPDATE t SET x=1; DROP TABLE t", Role::Analyst).as_deref(),
            Some("DROP operations restricted to admin role")
        );
    }

    #[test]
    fn test_plain_selects_are_permitted() {
        for role in Role::ALL {
            assert!(evaluate("SELECT * FROM revenue LIMIT 10", role).is_permit());
        }
    }

    // The filter is a substring match, not a parser. The two tests below
    // pin its known failure modes so nobody "fixes" one silently.

    #[test]
    fn test_over_blocking_token_inside_literal_still_denied() {
        // No DROP statement here, but the token appears inside a value.
        let sql = "SELECT * FROM widgets WHERE kind = 'DROPDOWN'";
        assert!(!evaluate(sql, Role::Analyst).is_permit());
        assert!(evaluate(sql, Role::Admin).is_permit());
    }

    #[test]
    fn test_under_blocking_equivalent_statement_passes() {
        // TRUNCATE empties a table just like DROP-and-recreate would,
        // but carries no banned token.
        assert!(evaluate("TRUNCATE TABLE staging", Role::Analyst).is_permit());
    }
}
