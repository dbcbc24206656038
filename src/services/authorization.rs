//! Role/permission checks. Pure and stateless: every function takes the
//! full [`AuthorizationContext`] and returns an [`AccessDecision`] value,
//! never an error. The transport layer turns denials into 403s.

use crate::models::{AccessDecision, AuthorizationContext, Permission, Role, RoleClaim};

/// Fixed role→permission table.
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::User => &[],
        Role::Hr => &[Permission::ViewAllTimesheets, Permission::ViewAllReports],
        Role::Manager => &[Permission::ViewUserTimesheets],
        Role::Admin => &[
            Permission::ViewAllTimesheets,
            Permission::ViewAllReports,
            Permission::ManageUsers,
        ],
    }
}

/// True iff any role in the context grants the permission.
pub fn has_permission(ctx: &AuthorizationContext, permission: Permission) -> bool {
    ctx.roles
        .iter()
        .any(|role| role_permissions(*role).contains(&permission))
}

/// Normalize a claim-asserted role set and a stored role into a non-empty
/// role list. Precedence: claim over stored over the `User` default, applied
/// here and nowhere else so claim-based and stored roles cannot diverge
/// between call sites.
pub fn resolve_roles(claim: Option<&RoleClaim>, stored: Option<&str>) -> Vec<Role> {
    let roles: Vec<Role> = match claim {
        Some(RoleClaim::One(raw)) => vec![Role::parse(raw)],
        Some(RoleClaim::Many(raws)) => raws.iter().map(|raw| Role::parse(raw)).collect(),
        None => stored.map(|raw| vec![Role::parse(raw)]).unwrap_or_default(),
    };
    if roles.is_empty() {
        vec![Role::User]
    } else {
        roles
    }
}

pub fn can_view_all_timesheets(ctx: &AuthorizationContext) -> AccessDecision {
    if has_permission(ctx, Permission::ViewAllTimesheets) {
        AccessDecision::allow()
    } else {
        AccessDecision::deny(format!(
            "role(s) {} cannot view all timesheets",
            ctx.held_roles()
        ))
    }
}

/// May `ctx` read `target_id`'s timesheet? Own data is always visible;
/// otherwise the view-all permission, then manager delegation over direct
/// reports.
pub fn can_view_user_timesheets(ctx: &AuthorizationContext, target_id: &str) -> AccessDecision {
    if target_id == ctx.principal_id {
        return AccessDecision::allow();
    }
    if can_view_all_timesheets(ctx).is_authorized() {
        return AccessDecision::allow();
    }
    if has_permission(ctx, Permission::ViewUserTimesheets) {
        if ctx.direct_reports.iter().any(|id| id == target_id) {
            AccessDecision::allow()
        } else {
            AccessDecision::deny(format!(
                "user {} is not in this manager's direct reports",
                target_id
            ))
        }
    } else {
        AccessDecision::deny(format!(
            "role(s) {} cannot view other users' timesheets",
            ctx.held_roles()
        ))
    }
}

/// May `ctx` view reports over `target_ids`? Absent/empty targets and the
/// exact single-element `[principal]` list are self-reports and always
/// allowed. A manager is allowed only when every target is themselves or a
/// direct report; the denial enumerates each offending id.
pub fn can_view_reports(
    ctx: &AuthorizationContext,
    target_ids: Option<&[String]>,
) -> AccessDecision {
    let targets = match target_ids {
        None => return AccessDecision::allow(),
        Some([]) => return AccessDecision::allow(),
        Some([only]) if *only == ctx.principal_id => return AccessDecision::allow(),
        Some(targets) => targets,
    };

    if can_view_all_timesheets(ctx).is_authorized() {
        return AccessDecision::allow();
    }

    if has_permission(ctx, Permission::ViewUserTimesheets) {
        let unauthorized: Vec<&str> = targets
            .iter()
            .filter(|id| **id != ctx.principal_id && !ctx.direct_reports.contains(*id))
            .map(String::as_str)
            .collect();
        if unauthorized.is_empty() {
            AccessDecision::allow()
        } else {
            AccessDecision::deny(format!(
                "not authorized to view reports for: {}",
                unauthorized.join(", ")
            ))
        }
    } else {
        AccessDecision::deny(format!(
            "role(s) {} cannot view reports for other users",
            ctx.held_roles()
        ))
    }
}
