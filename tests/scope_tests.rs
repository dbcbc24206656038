use timetrack_core::models::{
    AuthorizationContext, EntryListParams, ProjectSelector, Role, ServiceError, SortKey,
    SortOrder, UserScope, UserSelector,
};
use timetrack_core::services::query_scope::build_scope;

mod common;
use common::{ts, TestApp};

fn ctx(role: Role, principal_id: &str) -> AuthorizationContext {
    AuthorizationContext::new(principal_id, vec![role])
}

fn params() -> EntryListParams {
    EntryListParams::default()
}

#[test]
fn defaults_scope_to_the_principal() {
    let scope = build_scope(&ctx(Role::User, "u1"), params()).unwrap();

    assert_eq!(scope.users, UserScope::Ids(vec!["u1".to_string()]));
    assert_eq!(scope.sort_by, SortKey::Date);
    assert_eq!(scope.sort_order, SortOrder::Desc);
    assert_eq!(scope.limit, 10);
    assert_eq!(scope.offset, 0);
    assert!(scope.search.is_none());
    assert!(scope.projects.is_none());
}

#[test]
fn all_filter_requires_the_view_all_permission() {
    let mut p = params();
    p.user_filter = Some(UserSelector::All);

    let scope = build_scope(&ctx(Role::Hr, "h1"), p.clone()).unwrap();
    assert_eq!(scope.users, UserScope::All);

    let err = build_scope(&ctx(Role::User, "u1"), p).unwrap_err();
    match err {
        ServiceError::Forbidden(reason) => {
            assert!(reason.contains("USER"), "reason should name held roles: {reason}")
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

#[test]
fn self_only_id_lists_need_no_permission() {
    let mut p = params();
    p.user_filter = Some(UserSelector::Ids(vec!["u1".to_string(), "u1".to_string()]));

    let scope = build_scope(&ctx(Role::User, "u1"), p).unwrap();
    assert_eq!(scope.users, UserScope::Ids(vec!["u1".to_string()]));
}

#[test]
fn foreign_ids_are_checked_per_user() {
    let manager = ctx(Role::Manager, "m").with_direct_reports(vec!["u1".to_string()]);

    let mut p = params();
    p.user_filter = Some(UserSelector::Ids(vec!["m".to_string(), "u1".to_string()]));
    let scope = build_scope(&manager, p).unwrap();
    assert_eq!(
        scope.users,
        UserScope::Ids(vec!["m".to_string(), "u1".to_string()])
    );

    let mut p = params();
    p.user_filter = Some(UserSelector::Ids(vec!["u9".to_string()]));
    let err = build_scope(&manager, p).unwrap_err();
    match err {
        ServiceError::Forbidden(reason) => {
            assert!(reason.contains("u9"), "reason should name the denied id: {reason}")
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

#[test]
fn view_all_shortcuts_per_user_checks() {
    let mut p = params();
    p.user_filter = Some(UserSelector::Ids(vec!["u7".to_string(), "u8".to_string()]));

    let scope = build_scope(&ctx(Role::Admin, "a1"), p).unwrap();
    assert_eq!(
        scope.users,
        UserScope::Ids(vec!["u7".to_string(), "u8".to_string()])
    );
}

#[test]
fn pagination_defaults_on_junk_input() {
    let mut p = params();
    p.page = Some("abc".to_string());
    p.limit = Some("".to_string());
    let scope = build_scope(&ctx(Role::User, "u1"), p).unwrap();
    assert_eq!(scope.limit, 10);
    assert_eq!(scope.offset, 0);

    let mut p = params();
    p.page = Some("2".to_string());
    p.limit = Some("5".to_string());
    let scope = build_scope(&ctx(Role::User, "u1"), p).unwrap();
    assert_eq!(scope.limit, 5);
    assert_eq!(scope.offset, 5);
}

#[test]
fn sort_parameters_parse_with_defaults() {
    let mut p = params();
    p.sort_by = Some("duration".to_string());
    p.sort_order = Some("asc".to_string());
    let scope = build_scope(&ctx(Role::User, "u1"), p).unwrap();
    assert_eq!(scope.sort_by, SortKey::Duration);
    assert_eq!(scope.sort_order, SortOrder::Asc);

    let mut p = params();
    p.sort_by = Some("bogus".to_string());
    p.sort_order = Some("sideways".to_string());
    let scope = build_scope(&ctx(Role::User, "u1"), p).unwrap();
    assert_eq!(scope.sort_by, SortKey::Date);
    assert_eq!(scope.sort_order, SortOrder::Desc);
}

async fn seeded_app() -> TestApp {
    let app = TestApp::new().await;
    app.seed_project("p1", "Website Redesign", Some("Acme Corp")).await;
    app.seed_project("p2", "Internal Tools", None).await;

    app.seed_entry("u1", "p1", "sprint planning", ts("2024-03-10 09:00:00"), ts("2024-03-10 10:00:00"), 60)
        .await;
    app.seed_entry("u1", "p1", "design review", ts("2024-03-11 09:00:00"), ts("2024-03-11 11:00:00"), 120)
        .await;
    app.seed_entry("u1", "p2", "ci pipeline", ts("2024-03-12 09:00:00"), ts("2024-03-12 09:30:00"), 30)
        .await;
    app.seed_entry("u2", "p2", "ops work", ts("2024-03-11 10:00:00"), ts("2024-03-11 12:00:00"), 120)
        .await;
    app
}

fn hr_all_params() -> EntryListParams {
    let mut p = params();
    p.user_filter = Some(UserSelector::All);
    p
}

#[tokio::test]
async fn search_matches_client_name_case_insensitively() {
    let app = seeded_app().await;

    let mut p = hr_all_params();
    p.search = Some("acme".to_string());
    let scope = build_scope(&ctx(Role::Hr, "h1"), p).unwrap();

    let (rows, total) = app.entries.list_scoped(&scope).await.unwrap();
    assert_eq!(total, 2);
    assert!(rows.iter().all(|row| row.client_name.as_deref() == Some("Acme Corp")));
}

#[tokio::test]
async fn search_matches_descriptions() {
    let app = seeded_app().await;

    let mut p = hr_all_params();
    p.search = Some("PIPELINE".to_string());
    let scope = build_scope(&ctx(Role::Hr, "h1"), p).unwrap();

    let (rows, total) = app.entries.list_scoped(&scope).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].entry.description, "ci pipeline");
}

#[tokio::test]
async fn project_filter_restricts_rows() {
    let app = seeded_app().await;

    let mut p = hr_all_params();
    p.project_filter = Some(ProjectSelector::Ids(vec!["p2".to_string()]));
    let scope = build_scope(&ctx(Role::Hr, "h1"), p).unwrap();

    let (rows, total) = app.entries.list_scoped(&scope).await.unwrap();
    assert_eq!(total, 2);
    assert!(rows.iter().all(|row| row.entry.project_id == "p2"));
}

#[tokio::test]
async fn date_bounds_are_inclusive_on_calendar_days() {
    let app = seeded_app().await;

    let mut p = hr_all_params();
    p.date_from = chrono::NaiveDate::from_ymd_opt(2024, 3, 11);
    p.date_to = chrono::NaiveDate::from_ymd_opt(2024, 3, 11);
    let scope = build_scope(&ctx(Role::Hr, "h1"), p).unwrap();

    let (rows, total) = app.entries.list_scoped(&scope).await.unwrap();
    assert_eq!(total, 2);
    assert!(rows
        .iter()
        .all(|row| row.entry.start_time.date_naive().to_string() == "2024-03-11"));
}

#[tokio::test]
async fn user_scope_restricts_rows() {
    let app = seeded_app().await;

    let scope = build_scope(&ctx(Role::User, "u1"), params()).unwrap();
    let (rows, total) = app.entries.list_scoped(&scope).await.unwrap();

    assert_eq!(total, 3);
    assert!(rows.iter().all(|row| row.entry.user_id == "u1"));
}

#[tokio::test]
async fn sorting_by_duration_descends() {
    let app = seeded_app().await;

    let mut p = params();
    p.sort_by = Some("duration".to_string());
    p.sort_order = Some("desc".to_string());
    let scope = build_scope(&ctx(Role::User, "u1"), p).unwrap();

    let (rows, _) = app.entries.list_scoped(&scope).await.unwrap();
    let durations: Vec<i64> = rows
        .iter()
        .map(|row| row.entry.duration_minutes.unwrap())
        .collect();
    assert_eq!(durations, vec![120, 60, 30]);
}

#[tokio::test]
async fn pagination_slices_and_reports_the_full_total() {
    let app = seeded_app().await;

    let mut p = params();
    p.sort_by = Some("date".to_string());
    p.sort_order = Some("asc".to_string());
    p.page = Some("2".to_string());
    p.limit = Some("2".to_string());
    let scope = build_scope(&ctx(Role::User, "u1"), p).unwrap();

    let (rows, total) = app.entries.list_scoped(&scope).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry.description, "ci pipeline");
}
