//! Search types for filtered, paginated todo listing.
//!
//! [`SearchTodosRequest`] is the raw, loosely-typed input as it arrives from a
//! query string. [`TodoSearchQuery::from_request`] validates and defaults it
//! into the typed query that search providers execute.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationErrors};
use crate::models::{Priority, Status, TodoWithRelations};
use crate::temporal::{parse_date, INVALID_DATE_MESSAGE};

/// Page size used when none (or a non-positive one) is requested.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Upper bound on page size.
pub const MAX_PER_PAGE: i64 = 100;

/// Raw search input. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchTodosRequest {
    /// Free text matched against title or description.
    pub q: Option<String>,
    /// Comma-separated status values, e.g. `0,1`.
    pub status: Option<String>,
    pub priority: Option<String>,
    /// A category id, or `none` / `-1` for todos without a category.
    pub category_id: Option<String>,
    /// Comma-separated tag ids.
    pub tag_ids: Option<String>,
    /// `any` (default) or `all`.
    pub tag_mode: Option<String>,
    pub due_date_from: Option<String>,
    pub due_date_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
    Priority,
    Status,
    Position,
}

impl SortField {
    pub const ALLOWED: [&'static str; 7] = [
        "created_at",
        "updated_at",
        "due_date",
        "title",
        "priority",
        "status",
        "position",
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "due_date" => Some(SortField::DueDate),
            "title" => Some(SortField::Title),
            "priority" => Some(SortField::Priority),
            "status" => Some(SortField::Status),
            "position" => Some(SortField::Position),
            _ => None,
        }
    }

    /// Column name in the `todos` table.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::DueDate => "due_date",
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::Position => "position",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// How a multi-tag filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMode {
    /// At least one of the listed tags.
    #[default]
    Any,
    /// Every listed tag.
    All,
}

impl TagMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "any" => Some(TagMode::Any),
            "all" => Some(TagMode::All),
            _ => None,
        }
    }
}

/// Category predicate; a single call filters by one id or by "uncategorized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    Id(i64),
    Uncategorized,
}

/// Tag predicate with deduplicated ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagFilter {
    pub ids: Vec<i64>,
    pub mode: TagMode,
}

/// Validated search query. Absent predicates are `None` and are omitted from
/// the query entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoSearchQuery {
    pub text: Option<String>,
    pub statuses: Option<Vec<Status>>,
    pub priority: Option<Priority>,
    pub category: Option<CategoryFilter>,
    pub tags: Option<TagFilter>,
    pub due_date_from: Option<NaiveDate>,
    pub due_date_to: Option<NaiveDate>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: i64,
    pub per_page: i64,
}

impl Default for TodoSearchQuery {
    fn default() -> Self {
        Self {
            text: None,
            statuses: None,
            priority: None,
            category: None,
            tags: None,
            due_date_from: None,
            due_date_to: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl TodoSearchQuery {
    /// Validate and default a raw request.
    ///
    /// Every invalid field is reported at once, keyed by its request name.
    pub fn from_request(req: &SearchTodosRequest) -> Result<Self> {
        let mut errors = ValidationErrors::new();
        let mut query = TodoSearchQuery::default();

        // A present but empty sort key is invalid, not a request for the default
        if let Some(sort_by) = req.sort_by.as_deref() {
            match SortField::parse(sort_by) {
                Some(field) => query.sort_by = field,
                None => errors.add(
                    "sort_by",
                    format!("must be one of: {}", SortField::ALLOWED.join(", ")),
                ),
            }
        }

        if let Some(order) = req.sort_order.as_deref() {
            match SortOrder::parse(order) {
                Some(order) => query.sort_order = order,
                None => errors.add("sort_order", "must be one of: asc, desc"),
            }
        }

        let mut tag_mode = TagMode::default();
        if let Some(mode) = non_blank(&req.tag_mode) {
            match TagMode::parse(mode) {
                Some(mode) => tag_mode = mode,
                None => errors.add("tag_mode", "must be one of: any, all"),
            }
        }

        query.text = non_blank(&req.q).map(|q| q.trim().to_string());

        if let Some(raw) = non_blank(&req.status) {
            match parse_list(raw, |v| Status::try_from(v).ok()) {
                Some(statuses) => query.statuses = Some(statuses),
                None => errors.add("status", "must be a comma-separated list of 0, 1 or 2"),
            }
        }

        if let Some(raw) = non_blank(&req.priority) {
            match raw
                .trim()
                .parse::<i16>()
                .ok()
                .and_then(|v| Priority::try_from(v).ok())
            {
                Some(priority) => query.priority = Some(priority),
                None => errors.add("priority", "must be 0, 1 or 2"),
            }
        }

        if let Some(raw) = non_blank(&req.category_id) {
            match parse_category_filter(raw) {
                Some(filter) => query.category = Some(filter),
                None => errors.add("category_id", "must be a category id or 'none'"),
            }
        }

        if let Some(raw) = non_blank(&req.tag_ids) {
            match parse_tag_ids(raw) {
                Some(ids) => {
                    query.tags = Some(TagFilter {
                        ids,
                        mode: tag_mode,
                    })
                }
                None => errors.add("tag_ids", "must be a comma-separated list of tag ids"),
            }
        }

        if let Some(raw) = &req.due_date_from {
            match parse_date(raw) {
                Ok(date) => query.due_date_from = date,
                Err(_) => errors.add("due_date_from", INVALID_DATE_MESSAGE),
            }
        }

        if let Some(raw) = &req.due_date_to {
            match parse_date(raw) {
                Ok(date) => query.due_date_to = date,
                Err(_) => errors.add("due_date_to", INVALID_DATE_MESSAGE),
            }
        }

        let page = parse_integer(&req.page, "page", &mut errors);
        query.page = match page {
            Some(page) if page >= 1 => page,
            _ => 1,
        };
        let per_page = parse_integer(&req.per_page, "per_page", &mut errors);
        query.per_page = match per_page {
            Some(per_page) if per_page >= 1 => per_page.min(MAX_PER_PAGE),
            _ => DEFAULT_PER_PAGE,
        };

        errors.into_result()?;
        Ok(query)
    }

    /// Whether any predicate beyond owner scoping is active.
    pub fn has_filters(&self) -> bool {
        self.text.is_some()
            || self.statuses.is_some()
            || self.priority.is_some()
            || self.category.is_some()
            || self.tags.is_some()
            || self.due_date_from.is_some()
            || self.due_date_to.is_some()
    }

    /// Rows to skip for the requested page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct TodoSearchPage {
    pub todos: Vec<TodoWithRelations>,
    /// Matches across all pages.
    pub total: i64,
}

/// Search result handed back to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct TodoSearchResponse {
    pub todos: Vec<TodoWithRelations>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub filters_applied: bool,
}

impl TodoSearchResponse {
    pub fn total_pages(&self) -> i64 {
        if self.per_page <= 0 {
            return 0;
        }
        (self.total + self.per_page - 1) / self.per_page
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Parse an optional integer parameter; blank counts as absent.
fn parse_integer(
    value: &Option<String>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    let raw = non_blank(value)?;
    match raw.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, "must be an integer");
            None
        }
    }
}

fn parse_list<T>(raw: &str, convert: impl Fn(i16) -> Option<T>) -> Option<Vec<T>>
where
    T: PartialEq,
{
    let mut out = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let value = convert(part.parse::<i16>().ok()?)?;
        if !out.contains(&value) {
            out.push(value);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn parse_category_filter(raw: &str) -> Option<CategoryFilter> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") || raw == "-1" {
        return Some(CategoryFilter::Uncategorized);
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Some(CategoryFilter::Id(id)),
        _ => None,
    }
}

fn parse_tag_ids(raw: &str) -> Option<Vec<i64>> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part.parse::<i64>().ok().filter(|id| *id > 0)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}
