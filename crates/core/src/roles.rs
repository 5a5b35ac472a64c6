//! Role names carried in access-token claims.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_STAFF: &str = "staff";

pub const ALL_ROLES: [&str; 3] = [ROLE_ADMIN, ROLE_MANAGER, ROLE_STAFF];

pub fn is_known(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}
