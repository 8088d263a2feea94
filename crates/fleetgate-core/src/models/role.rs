//! Principal roles.

use serde::{Deserialize, Serialize};

/// Closed set of roles. Authorization gates match on this enum
/// exhaustively; role strings exist only at the storage boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin,
    CorporateAdmin,
    CorporateSupervisor,
    Employee,
    VendorAdmin,
    VendorSupervisor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::CorporateAdmin => "CORPORATE_ADMIN",
            Role::CorporateSupervisor => "CORPORATE_SUPERVISOR",
            Role::Employee => "EMPLOYEE",
            Role::VendorAdmin => "VENDOR_ADMIN",
            Role::VendorSupervisor => "VENDOR_SUPERVISOR",
        }
    }

    pub fn from_str(s: &str) -> Option<Role> {
        match s {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "CORPORATE_ADMIN" => Some(Role::CorporateAdmin),
            "CORPORATE_SUPERVISOR" => Some(Role::CorporateSupervisor),
            "EMPLOYEE" => Some(Role::Employee),
            "VENDOR_ADMIN" => Some(Role::VendorAdmin),
            "VENDOR_SUPERVISOR" => Some(Role::VendorSupervisor),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_roundtrip() {
        for role in [
            Role::SuperAdmin,
            Role::CorporateAdmin,
            Role::CorporateSupervisor,
            Role::Employee,
            Role::VendorAdmin,
            Role::VendorSupervisor,
        ] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn unknown_role_string_is_rejected() {
        assert_eq!(Role::from_str("DRIVER"), None);
    }
}
