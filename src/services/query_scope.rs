//! Turns raw filter parameters into an authorized [`QueryScope`].
//!
//! Authorization resolves before any scope predicate is built; a failed
//! check surfaces as `ServiceError::Forbidden` carrying that check's reason
//! and no scope is produced.

use crate::models::{
    AuthorizationContext, EntryListParams, ProjectSelector, QueryScope, ServiceError, SortKey,
    SortOrder, UserScope, UserSelector, DEFAULT_LIMIT, DEFAULT_PAGE,
};
use crate::services::authorization::{can_view_all_timesheets, can_view_user_timesheets};
use crate::models::query::parse_positive;

pub fn build_scope(
    ctx: &AuthorizationContext,
    params: EntryListParams,
) -> Result<QueryScope, ServiceError> {
    let users = resolve_user_scope(ctx, params.user_filter)?;

    let page = parse_positive(params.page.as_deref(), DEFAULT_PAGE);
    let limit = parse_positive(params.limit.as_deref(), DEFAULT_LIMIT);

    Ok(QueryScope {
        users,
        search: params.search.filter(|s| !s.trim().is_empty()),
        projects: match params.project_filter {
            None | Some(ProjectSelector::All) => None,
            Some(ProjectSelector::Ids(ids)) => Some(ids),
        },
        date_from: params.date_from,
        date_to: params.date_to,
        sort_by: SortKey::parse(params.sort_by.as_deref()),
        sort_order: SortOrder::parse(params.sort_order.as_deref()),
        limit,
        offset: (page - 1) * limit,
    })
}

fn resolve_user_scope(
    ctx: &AuthorizationContext,
    filter: Option<UserSelector>,
) -> Result<UserScope, ServiceError> {
    match filter {
        Some(UserSelector::All) => {
            let decision = can_view_all_timesheets(ctx);
            if decision.is_authorized() {
                Ok(UserScope::All)
            } else {
                Err(ServiceError::Forbidden(decision.reason_or_default()))
            }
        }
        Some(UserSelector::Ids(ids)) => {
            if ids.is_empty() || ids.iter().all(|id| *id == ctx.principal_id) {
                return Ok(UserScope::single(&ctx.principal_id));
            }
            // Not purely self-scoped: view-all short-circuits, otherwise
            // each foreign id is checked individually, failing fast with
            // that id's denial reason.
            if !can_view_all_timesheets(ctx).is_authorized() {
                for id in ids.iter().filter(|id| **id != ctx.principal_id) {
                    let decision = can_view_user_timesheets(ctx, id);
                    if !decision.is_authorized() {
                        return Err(ServiceError::Forbidden(decision.reason_or_default()));
                    }
                }
            }
            Ok(UserScope::Ids(ids))
        }
        None => Ok(UserScope::single(&ctx.principal_id)),
    }
}
