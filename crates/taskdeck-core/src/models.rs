//! Domain models for taskdeck.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::patch::Patch;

/// Identity of the authenticated principal every row is scoped to.
pub type OwnerId = i64;

/// Maximum title length in code points.
pub const MAX_TITLE_CHARS: usize = 255;

/// Maximum description length in code points.
pub const MAX_DESCRIPTION_CHARS: usize = 10_000;

/// Maximum category name length in code points.
pub const MAX_CATEGORY_NAME_CHARS: usize = 50;

/// Maximum tag name length in code points.
pub const MAX_TAG_NAME_CHARS: usize = 30;

/// Color given to categories when none is supplied.
pub const DEFAULT_COLOR: &str = "#6B7280";

/// Reported under `name` when an owner already has a category or tag by that name.
pub const NAME_TAKEN_MESSAGE: &str = "has already been taken";

// =============================================================================
// ENUMS
// =============================================================================

/// Priority of a todo, stored and exchanged as 0/1/2.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i16", into = "i16")]
pub enum Priority {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl TryFrom<i16> for Priority {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::High),
            other => Err(format!("invalid priority {}: must be 0, 1 or 2", other)),
        }
    }
}

impl From<Priority> for i16 {
    fn from(p: Priority) -> Self {
        p as i16
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status of a todo, stored and exchanged as 0/1/2.
///
/// `Completed` is kept in lockstep with [`Todo::completed`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i16", into = "i16")]
pub enum Status {
    #[default]
    Pending = 0,
    InProgress = 1,
    Completed = 2,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Completed)
    }
}

impl TryFrom<i16> for Status {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Pending),
            1 => Ok(Status::InProgress),
            2 => Ok(Status::Completed),
            other => Err(format!("invalid status {}: must be 0, 1 or 2", other)),
        }
    }
}

impl From<Status> for i16 {
    fn from(s: Status) -> Self {
        s as i16
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TODOS
// =============================================================================

/// A task owned by exactly one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub user_id: OwnerId,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub position: Option<i32>,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A todo ready for insertion; id, timestamps and (if unset) position are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub user_id: OwnerId,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub position: Option<i32>,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    /// Tags attached together with the row.
    pub tag_ids: Vec<i64>,
}

/// Category fields embedded in a todo response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// Tag fields embedded in a todo response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}

/// A todo with its category and tags populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoWithRelations {
    #[serde(flatten)]
    pub todo: Todo,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<CategorySummary>,
    #[serde(default)]
    pub tags: Vec<TagSummary>,
}

/// A single entry of a bulk reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: i64,
    pub position: i32,
}

// =============================================================================
// CATEGORY / TAG
// =============================================================================

/// A named, colored grouping of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: OwnerId,
    pub name: String,
    pub color: String,
    /// Denormalized count of todos referencing this category.
    #[serde(rename = "todo_count")]
    pub todos_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, optionally colored label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub user_id: OwnerId,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category names are compared and stored trimmed.
pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_string()
}

/// Tag names are compared and stored trimmed and lowercased.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// `#RGB` or `#RRGGBB`.
pub fn is_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Input for creating a todo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    /// `YYYY-MM-DD`; empty means no due date.
    pub due_date: Option<String>,
    pub position: Option<i32>,
    pub tag_ids: Option<Vec<i64>>,
}

impl CreateTodoRequest {
    /// Convenience constructor used by callers that only know the title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Structural checks that need no store access.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_title(&mut errors, &self.title);
        if let Some(description) = &self.description {
            check_description(&mut errors, description);
        }
        if let Some(position) = self.position {
            check_position(&mut errors, position);
        }
        errors
    }
}

/// Partial update of a todo. Every field defaults to [`Patch::Absent`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTodoRequest {
    pub title: Patch<String>,
    pub description: Patch<String>,
    /// `Null` or `0` clears the category.
    pub category_id: Patch<i64>,
    pub completed: Patch<bool>,
    pub priority: Patch<Priority>,
    pub status: Patch<Status>,
    /// `Null` or `""` clears the due date.
    pub due_date: Patch<String>,
    pub position: Patch<i32>,
    /// Replaces the tag set; `Null` or `[]` removes every tag.
    pub tag_ids: Patch<Vec<i64>>,
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match &self.title {
            Patch::Value(title) => check_title(&mut errors, title),
            Patch::Null => errors.add("title", "can't be blank"),
            Patch::Absent => {}
        }
        if let Patch::Value(description) = &self.description {
            check_description(&mut errors, description);
        }
        if let Patch::Value(position) = self.position {
            check_position(&mut errors, position);
        }
        errors
    }
}

/// Validate the entries of a bulk reorder.
pub fn validate_position_updates(updates: &[PositionUpdate]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for (i, update) in updates.iter().enumerate() {
        if update.id <= 0 {
            errors.add(format!("todos[{}].id", i), "is required");
        }
        if update.position < 0 {
            errors.add(
                format!("todos[{}].position", i),
                "must be greater than or equal to 0",
            );
        }
    }
    errors
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Empty means [`DEFAULT_COLOR`].
    #[serde(default)]
    pub color: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, &self.name, MAX_CATEGORY_NAME_CHARS);
        check_color(&mut errors, &self.color);
        errors
    }
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(&mut errors, name, MAX_CATEGORY_NAME_CHARS);
        }
        if let Some(color) = &self.color {
            check_color(&mut errors, color);
        }
        errors
    }
}

/// Input for creating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl CreateTagRequest {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, &self.name, MAX_TAG_NAME_CHARS);
        if let Some(color) = &self.color {
            check_color(&mut errors, color);
        }
        errors
    }
}

/// Partial update of a tag; a `null` color clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub color: Patch<String>,
}

impl UpdateTagRequest {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(&mut errors, name, MAX_TAG_NAME_CHARS);
        }
        if let Patch::Value(color) = &self.color {
            check_color(&mut errors, color);
        }
        errors
    }
}

fn check_title(errors: &mut ValidationErrors, title: &str) {
    if title.trim().is_empty() {
        errors.add("title", "can't be blank");
    } else if title.chars().count() > MAX_TITLE_CHARS {
        errors.add(
            "title",
            format!("is too long (maximum is {} characters)", MAX_TITLE_CHARS),
        );
    }
}

fn check_description(errors: &mut ValidationErrors, description: &str) {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        errors.add(
            "description",
            format!(
                "is too long (maximum is {} characters)",
                MAX_DESCRIPTION_CHARS
            ),
        );
    }
}

fn check_position(errors: &mut ValidationErrors, position: i32) {
    if position < 0 {
        errors.add("position", "must be greater than or equal to 0");
    }
}

fn check_name(errors: &mut ValidationErrors, name: &str, max: usize) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.add("name", "can't be blank");
    } else if trimmed.chars().count() > max {
        errors.add("name", format!("is too long (maximum is {} characters)", max));
    }
}

fn check_color(errors: &mut ValidationErrors, color: &str) {
    if !is_hex_color(color) {
        errors.add("color", "must be a valid hex color");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_wire_values() {
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), 2);
        let p: Priority = serde_json::from_str("0").unwrap();
        assert_eq!(p, Priority::Low);
        assert!(serde_json::from_str::<Priority>("3").is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_value(Status::Completed).unwrap(), 2);
        let s: Status = serde_json::from_str("1").unwrap();
        assert_eq!(s, Status::InProgress);
        assert!(serde_json::from_str::<Status>("-1").is_err());
        assert_eq!(Status::default(), Status::Pending);
        assert!(Status::Completed.is_completed());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Status::InProgress.to_string(), "in_progress");
        assert_eq!(Priority::Low.to_string(), "low");
    }

    #[test]
    fn test_create_request_title_rules() {
        assert!(CreateTodoRequest::titled("Buy milk").validate().is_empty());
        assert!(CreateTodoRequest::titled("   ").validate().has_field("title"));

        let long = "é".repeat(MAX_TITLE_CHARS);
        assert!(CreateTodoRequest::titled(long.clone()).validate().is_empty());
        let too_long = format!("{}x", long);
        assert!(CreateTodoRequest::titled(too_long).validate().has_field("title"));
    }

    #[test]
    fn test_create_request_description_and_position() {
        let req = CreateTodoRequest {
            description: Some("x".repeat(MAX_DESCRIPTION_CHARS + 1)),
            position: Some(-1),
            ..CreateTodoRequest::titled("ok")
        };
        let errors = req.validate();
        assert!(errors.has_field("description"));
        assert!(errors.has_field("position"));
    }

    #[test]
    fn test_update_request_deserializes_three_states() {
        let req: UpdateTodoRequest =
            serde_json::from_str(r#"{"category_id": null, "status": 2, "due_date": ""}"#)
                .unwrap();
        assert_eq!(req.category_id, Patch::Null);
        assert_eq!(req.status, Patch::Value(Status::Completed));
        assert_eq!(req.due_date, Patch::Value(String::new()));
        assert!(req.title.is_absent());
        assert!(req.completed.is_absent());
        assert!(req.validate().is_empty());
    }

    #[test]
    fn test_update_request_null_title_rejected() {
        let req: UpdateTodoRequest = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert!(req.validate().has_field("title"));
    }

    #[test]
    fn test_update_request_rejects_out_of_range_status() {
        assert!(serde_json::from_str::<UpdateTodoRequest>(r#"{"status": 9}"#).is_err());
    }

    #[test]
    fn test_position_updates_validation() {
        let ok = [PositionUpdate { id: 1, position: 0 }];
        assert!(validate_position_updates(&ok).is_empty());

        let bad = [
            PositionUpdate { id: 0, position: 1 },
            PositionUpdate { id: 2, position: -4 },
        ];
        let errors = validate_position_updates(&bad);
        assert!(errors.has_field("todos[0].id"));
        assert!(errors.has_field("todos[1].position"));
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#6B7280"));
        assert!(is_hex_color("#fff"));
        assert!(!is_hex_color("6B7280"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_category_name("  Work  "), "Work");
        assert_eq!(normalize_tag_name("  Urgent "), "urgent");
    }

    #[test]
    fn test_category_and_tag_request_validation() {
        let cat = CreateCategoryRequest {
            name: " ".into(),
            color: "red".into(),
        };
        let errors = cat.validate();
        assert!(errors.has_field("name"));
        assert!(errors.has_field("color"));

        let tag = CreateTagRequest {
            name: "x".repeat(MAX_TAG_NAME_CHARS + 1),
            color: None,
        };
        assert!(tag.validate().has_field("name"));
    }

    #[test]
    fn test_category_serializes_todo_count() {
        let now = Utc::now();
        let cat = Category {
            id: 1,
            user_id: 1,
            name: "Work".into(),
            color: DEFAULT_COLOR.into(),
            todos_count: 3,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&cat).unwrap();
        assert_eq!(json["todo_count"], 3);
    }

    #[test]
    fn test_todo_with_relations_flattens() {
        let now = Utc::now();
        let todo = TodoWithRelations {
            todo: Todo {
                id: 1,
                user_id: 9,
                category_id: None,
                title: "Buy milk".into(),
                description: None,
                completed: false,
                position: Some(1),
                priority: Priority::High,
                status: Status::Pending,
                due_date: NaiveDate::from_ymd_opt(2030, 12, 31),
                created_at: now,
                updated_at: now,
            },
            category: None,
            tags: vec![],
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["priority"], 2);
        assert_eq!(json["due_date"], "2030-12-31");
        assert!(json.get("category").is_none());
    }
}
