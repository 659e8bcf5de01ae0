//! Role → capability table.
//! Capabilities are presentation hints for which views and actions to offer; the backend
//! enforces the real authorization boundary.

use std::collections::BTreeSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::user::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    ViewDashboard,
    ViewOwnProfile,
    ViewAttendance,
    RequestLeave,
    ManageEmployees,
    ManageDepartments,
    ApproveLeave,
    ManagePayroll,
    ManageMissions,
    ViewAnalytics,
    ManageRoles,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::ViewDashboard,
        Capability::ViewOwnProfile,
        Capability::ViewAttendance,
        Capability::RequestLeave,
        Capability::ManageEmployees,
        Capability::ManageDepartments,
        Capability::ApproveLeave,
        Capability::ManagePayroll,
        Capability::ManageMissions,
        Capability::ViewAnalytics,
        Capability::ManageRoles,
    ];

    /// Read-only set every role receives.
    pub const BASE: [Capability; 4] = [
        Capability::ViewDashboard,
        Capability::ViewOwnProfile,
        Capability::ViewAttendance,
        Capability::RequestLeave,
    ];

    pub fn flag_name(&self) -> &'static str {
        match self {
            Capability::ViewDashboard => "canViewDashboard",
            Capability::ViewOwnProfile => "canViewOwnProfile",
            Capability::ViewAttendance => "canViewAttendance",
            Capability::RequestLeave => "canRequestLeave",
            Capability::ManageEmployees => "canManageEmployees",
            Capability::ManageDepartments => "canManageDepartments",
            Capability::ApproveLeave => "canApproveLeave",
            Capability::ManagePayroll => "canManagePayroll",
            Capability::ManageMissions => "canManageMissions",
            Capability::ViewAnalytics => "canViewAnalytics",
            Capability::ManageRoles => "canManageRoles",
        }
    }
}

/// Capability set derived from a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permissions {
    caps: BTreeSet<Capability>,
}

impl Permissions {
    pub fn base() -> Self { Self { caps: Capability::BASE.iter().copied().collect() } }

    pub fn can(&self, cap: Capability) -> bool { self.caps.contains(&cap) }

    pub fn is_superset_of(&self, other: &Permissions) -> bool { self.caps.is_superset(&other.caps) }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ { self.caps.iter().copied() }

    pub fn len(&self) -> usize { self.caps.len() }

    pub fn is_empty(&self) -> bool { self.caps.is_empty() }

    fn with(mut self, extra: &[Capability]) -> Self {
        self.caps.extend(extra.iter().copied());
        self
    }
}

/// Static role table. Every arm starts from the base set.
pub fn permissions_for(role: Role) -> Permissions {
    use Capability::*;
    match role {
        Role::GeneralManager => Permissions::base().with(&Capability::ALL),
        Role::HrManager => Permissions::base().with(&[
            ManageEmployees,
            ManageDepartments,
            ApproveLeave,
            ManagePayroll,
            ManageMissions,
            ViewAnalytics,
        ]),
        Role::TeamLeader => Permissions::base().with(&[ApproveLeave, ManageMissions]),
        Role::Default => Permissions::base(),
    }
}

/// Permissions of an optional user; nobody logged in gets the base set.
pub fn get_permissions(user: Option<&User>) -> Permissions {
    permissions_for(user.map(|u| u.role).unwrap_or_default())
}

/// True iff `user` exists and its role is one of `required`.
pub fn has_role(user: Option<&User>, required: &[Role]) -> bool {
    match user {
        Some(u) => required.contains(&u.role),
        None => false,
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Capability::ALL.len()))?;
        for cap in Capability::ALL.iter() {
            map.serialize_entry(cap.flag_name(), &self.can(*cap))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_covers_base_set() {
        let base = Permissions::base();
        for role in Role::ALL {
            let p = permissions_for(role);
            assert!(!p.is_empty(), "{role} produced an empty set");
            assert!(p.is_superset_of(&base), "{role} lost base capabilities");
        }
    }

    #[test]
    fn role_table() {
        let gm = permissions_for(Role::GeneralManager);
        assert_eq!(gm.len(), Capability::ALL.len());

        let hr = permissions_for(Role::HrManager);
        assert!(hr.can(Capability::ManageEmployees));
        assert!(hr.can(Capability::ApproveLeave));
        assert!(!hr.can(Capability::ManageRoles));

        let tl = permissions_for(Role::TeamLeader);
        assert!(tl.can(Capability::ApproveLeave));
        assert!(!tl.can(Capability::ManagePayroll));
        assert!(!tl.can(Capability::ViewAnalytics));

        assert_eq!(permissions_for(Role::Default), Permissions::base());
    }

    #[test]
    fn has_role_without_user_is_false() {
        assert!(!has_role(None, &Role::ALL));
        assert!(!has_role(None, &[]));
        let u = User::from_login_email("lead@kmt.io");
        assert!(has_role(Some(&u), &[Role::Default]));
        assert!(!has_role(Some(&u), &[Role::HrManager, Role::GeneralManager]));
    }

    #[test]
    fn serializes_as_named_flags() {
        let v = serde_json::to_value(permissions_for(Role::TeamLeader)).unwrap();
        assert_eq!(v["canApproveLeave"], true);
        assert_eq!(v["canManageEmployees"], false);
        assert_eq!(v["canViewDashboard"], true);
        assert_eq!(get_permissions(None), Permissions::base());
    }
}
