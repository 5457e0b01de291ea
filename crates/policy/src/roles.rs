//! Role hierarchy.
//!
//! The role set is closed: three labels, fixed ranks, no runtime extension.
//! Rank is inverted relative to privilege (lower rank = more privilege), so
//! every comparison goes through [`Role::outranks_or_equal`] rather than
//! comparing ranks at call sites.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownRole;

/// A privilege tier.
///
/// # Invariants
/// - Exactly three roles exist; unknown labels fail parsing with
///   [`UnknownRole`] instead of mapping onto a default.
/// - Ranks are total and distinct: superadmin 1, admin 2, user 3.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    /// Assigned when an account is created without an explicit role.
    #[default]
    User,
}

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Role; 3] = [Role::Superadmin, Role::Admin, Role::User];

    /// Position in the hierarchy. Lower rank means more privilege.
    pub fn rank(self) -> u8 {
        match self {
            Role::Superadmin => 1,
            Role::Admin => 2,
            Role::User => 3,
        }
    }

    /// True when `self` sits at or above `threshold` in the hierarchy.
    ///
    /// Because rank is inverted, "at or above" compares with `<=`: a
    /// superadmin (rank 1) outranks an admin threshold (rank 2).
    pub fn outranks_or_equal(self, threshold: Role) -> bool {
        self.rank() <= threshold.rank()
    }

    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Membership test for untrusted input. Matching is exact: labels are
    /// stored lowercase and no case folding is applied.
    pub fn is_valid(label: &str) -> bool {
        Role::from_str(label).is_ok()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownRole::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ranks_are_fixed_and_distinct() {
        assert_eq!(Role::Superadmin.rank(), 1);
        assert_eq!(Role::Admin.rank(), 2);
        assert_eq!(Role::User.rank(), 3);
    }

    #[test]
    fn lower_rank_wins_comparisons() {
        assert!(Role::Superadmin.outranks_or_equal(Role::Admin));
        assert!(Role::Superadmin.outranks_or_equal(Role::User));
        assert!(Role::Admin.outranks_or_equal(Role::User));

        assert!(!Role::User.outranks_or_equal(Role::Admin));
        assert!(!Role::Admin.outranks_or_equal(Role::Superadmin));
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn parsing_is_exact_and_case_sensitive() {
        assert_eq!("superadmin".parse::<Role>(), Ok(Role::Superadmin));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));

        assert!(!Role::is_valid("Admin"));
        assert!(!Role::is_valid("root"));
        assert!(!Role::is_valid(""));
        assert!(!Role::is_valid(" user"));
    }

    #[test]
    fn serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&Role::Superadmin).unwrap();
        assert_eq!(json, "\"superadmin\"");
        let back: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(back, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        /// Every role satisfies its own threshold.
        #[test]
        fn outranks_is_reflexive(role in any_role()) {
            prop_assert!(role.outranks_or_equal(role));
        }

        /// The hierarchy is total: one direction always holds.
        #[test]
        fn outranks_is_total(a in any_role(), b in any_role()) {
            prop_assert!(a.outranks_or_equal(b) || b.outranks_or_equal(a));
        }

        /// Privilege comparisons chain.
        #[test]
        fn outranks_is_transitive(a in any_role(), b in any_role(), c in any_role()) {
            if a.outranks_or_equal(b) && b.outranks_or_equal(c) {
                prop_assert!(a.outranks_or_equal(c));
            }
        }

        /// Labels round-trip through the parser.
        #[test]
        fn label_round_trips(role in any_role()) {
            prop_assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }
}
