//! Capability table.
//!
//! Each role maps to a fixed set of six capability flags. The table is the
//! single authority on what a role may do; UI copy describing roles is
//! informational only and never consulted for decisions.

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Capability grants for one role.
///
/// Flags are read with plain field access; there is no wildcard and no
/// runtime mutation of the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub can_read: bool,
    pub can_write: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_users: bool,
    pub can_assign_roles: bool,
}

impl PermissionSet {
    /// True when every capability granted in `other` is also granted here.
    pub fn covers(self, other: PermissionSet) -> bool {
        (self.can_read || !other.can_read)
            && (self.can_write || !other.can_write)
            && (self.can_edit || !other.can_edit)
            && (self.can_delete || !other.can_delete)
            && (self.can_manage_users || !other.can_manage_users)
            && (self.can_assign_roles || !other.can_assign_roles)
    }

    /// Number of granted capabilities.
    pub fn granted(self) -> usize {
        [
            self.can_read,
            self.can_write,
            self.can_edit,
            self.can_delete,
            self.can_manage_users,
            self.can_assign_roles,
        ]
        .iter()
        .filter(|g| **g)
        .count()
    }
}

impl Role {
    /// The capability set for this role.
    pub fn permissions(self) -> PermissionSet {
        match self {
            Role::Superadmin => PermissionSet {
                can_read: true,
                can_write: true,
                can_edit: true,
                can_delete: true,
                can_manage_users: true,
                can_assign_roles: true,
            },
            // Admins moderate content but do not manage accounts or roles.
            // Marketing copy overstates this; the flags here are authoritative.
            Role::Admin => PermissionSet {
                can_read: true,
                can_write: true,
                can_edit: true,
                can_delete: true,
                can_manage_users: false,
                can_assign_roles: false,
            },
            Role::User => PermissionSet {
                can_read: true,
                can_write: false,
                can_edit: false,
                can_delete: false,
                can_manage_users: false,
                can_assign_roles: false,
            },
        }
    }
}
