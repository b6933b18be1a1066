//! Pure authorization decisions. Callers map `false` to a forbidden error;
//! the presence of an authenticated identity is checked before any of these.

use super::role::Role;

/// Admin-panel access: listing users, deleting users, dashboard stats.
pub(crate) fn can_moderate_users(actor: Role) -> bool {
    matches!(actor, Role::Admin | Role::Superadmin)
}

/// Only a superadmin may create new admin accounts.
pub(crate) fn can_create_admin(actor: Role) -> bool {
    actor == Role::Superadmin
}

/// Role updates: admins and superadmins only, an admin may not hand out the
/// admin role, and superadmin is never assignable through this path.
pub(crate) fn can_assign_role(actor: Role, target: Role) -> bool {
    if !matches!(actor, Role::Admin | Role::Superadmin) {
        return false;
    }
    if target == Role::Superadmin {
        return false;
    }
    !(actor == Role::Admin && target == Role::Admin)
}

/// Content mutation (post/comment update or delete): the author, or an admin.
pub(crate) fn can_modify_content(actor_id: i64, author_id: i64, actor_role: Role) -> bool {
    actor_id == author_id || actor_role == Role::Admin
}
