use chrono::NaiveDate;
use serde::Serialize;

/// Which users a listing request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSelector {
    /// The literal `"all"` filter value.
    All,
    /// An explicit list of user ids.
    Ids(Vec<String>),
}

/// Raw listing/reporting parameters as handed over by the transport layer.
/// Sort, page, and limit arrive as uninterpreted strings; defaults apply
/// when absent or non-numeric.
#[derive(Debug, Clone, Default)]
pub struct EntryListParams {
    pub user_filter: Option<UserSelector>,
    pub search: Option<String>,
    /// `None` or `ProjectSelector::All` leaves projects unrestricted.
    pub project_filter: Option<ProjectSelector>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSelector {
    All,
    Ids(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Duration,
    Project,
}

impl SortKey {
    pub fn parse(raw: Option<&str>) -> SortKey {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("duration") => SortKey::Duration,
            Some("project") => SortKey::Project,
            _ => SortKey::Date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> SortOrder {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// The user ids an authorized query may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserScope {
    /// Unrestricted — requires the view-all permission at build time.
    All,
    Ids(Vec<String>),
}

impl UserScope {
    pub fn single(user_id: impl Into<String>) -> Self {
        UserScope::Ids(vec![user_id.into()])
    }
}

/// Fully resolved query scope: authorization already applied, ready for the
/// persistence layer. Carries no authorization internals.
#[derive(Debug, Clone)]
pub struct QueryScope {
    pub users: UserScope,
    pub search: Option<String>,
    /// `None` means no project restriction.
    pub projects: Option<Vec<String>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl QueryScope {
    /// Scope over the given users with no filters and default paging.
    /// Reports use this to reuse the listing predicates.
    pub fn for_users(users: UserScope) -> Self {
        Self {
            users,
            search: None,
            projects: None,
            date_from: None,
            date_to: None,
            sort_by: SortKey::Date,
            sort_order: SortOrder::Desc,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Parse a raw numeric parameter, falling back when absent or non-numeric.
/// Values below 1 are treated as 1.
pub fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
        .max(1)
}
