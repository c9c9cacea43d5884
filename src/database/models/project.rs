use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{active_choice, active_search, check_max_len, clean_optional, nullable, FieldErrors, InputDate, Resource};
use crate::filter::{Filter, FilterError};

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planning,
    Ongoing,
    Completed,
    Paused,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [Self::Planning, Self::Ongoing, Self::Completed, Self::Paused];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Planning
    }
}

/// Checklist item embedded in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub supplies: Vec<String>,
    pub progress: i64,
    pub status: ProjectStatus,
    pub is_important: bool,
    pub tasks: Vec<Task>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Client-supplied project fields. Every field is optional so the same type
/// serves create and update; `null` clears the nullable ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub start_date: Option<InputDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<InputDate>>,
    pub supplies: Option<Vec<String>>,
    pub progress: Option<i64>,
    pub status: Option<String>,
    pub is_important: Option<bool>,
    pub tasks: Option<Vec<TaskInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub important: Option<String>,
    pub search: Option<String>,
}

impl Resource for Project {
    const COLLECTION: &'static str = "projects";
    const SINGULAR: &'static str = "project";
    const LABEL: &'static str = "Project";

    type Input = ProjectInput;
    type Query = ProjectQuery;

    fn new(id: Uuid, owner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: String::new(),
            description: None,
            start_date: now,
            due_date: None,
            supplies: vec![],
            progress: 0,
            status: ProjectStatus::default(),
            is_important: false,
            tasks: vec![],
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ProjectInput, errors: &mut FieldErrors) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            self.description = clean_optional(description);
        }
        if let Some(start_date) = input.start_date {
            self.start_date = start_date.0;
        }
        if let Some(due_date) = input.due_date {
            self.due_date = due_date.map(|d| d.0);
        }
        if let Some(supplies) = input.supplies {
            self.supplies = supplies
                .into_iter()
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect();
        }
        if let Some(progress) = input.progress {
            self.progress = progress;
        }
        if let Some(status) = input.status {
            match ProjectStatus::parse(status.trim()) {
                Some(status) => self.status = status,
                None => errors.add(
                    "status",
                    format!("Status must be one of: planning, ongoing, completed, paused (got '{}')", status),
                ),
            }
        }
        if let Some(is_important) = input.is_important {
            self.is_important = is_important;
        }
        if let Some(tasks) = input.tasks {
            self.tasks = tasks
                .into_iter()
                .map(|task| Task {
                    title: task.title.unwrap_or_default().trim().to_string(),
                    completed: task.completed.unwrap_or(false),
                })
                .collect();
        }
    }

    fn validate(&self, errors: &mut FieldErrors) {
        if self.name.is_empty() {
            errors.add("name", "Project name is required");
        }
        check_max_len(errors, "name", &self.name, NAME_MAX);
        if let Some(description) = &self.description {
            check_max_len(errors, "description", description, DESCRIPTION_MAX);
        }
        if !(0..=100).contains(&self.progress) {
            errors.add("progress", "Progress must be between 0 and 100");
        }
        for (index, task) in self.tasks.iter().enumerate() {
            if task.title.is_empty() {
                errors.add(format!("tasks[{}].title", index), "Task title is required");
            }
        }
    }

    fn list_filter(owner_id: Uuid, query: &ProjectQuery) -> Result<Filter, FilterError> {
        let mut filter = Filter::new(Self::COLLECTION)?.owner(owner_id);
        if let Some(status) = active_choice(query.status.as_deref()) {
            filter = filter.eq("status", status)?;
        }
        if query.important.as_deref().map(str::trim) == Some("true") {
            filter = filter.eq("isImportant", true)?;
        }
        if let Some(term) = active_search(query.search.as_deref()) {
            filter = filter.search(&["name", "description"], term)?;
        }
        filter.order("createdAt desc")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(body: serde_json::Value) -> (Project, FieldErrors) {
        let input: ProjectInput = serde_json::from_value(body).unwrap();
        let mut project = Project::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        let mut errors = FieldErrors::new();
        project.apply(input, &mut errors);
        project.validate(&mut errors);
        (project, errors)
    }

    #[test]
    fn applies_defaults() {
        let (project, errors) = build(json!({"name": "  Baby Blanket  "}));
        assert!(errors.is_empty());
        assert_eq!(project.name, "Baby Blanket");
        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.progress, 0);
        assert!(!project.is_important);
        assert_eq!(project.start_date, project.created_at);
    }

    #[test]
    fn rejects_out_of_range_progress_and_missing_name() {
        let (_, errors) = build(json!({"progress": 150}));
        assert!(errors.get("name").is_some());
        assert_eq!(errors.get("progress"), Some("Progress must be between 0 and 100"));

        let (_, errors) = build(json!({"name": "x", "progress": -1}));
        assert!(errors.get("progress").is_some());
    }

    #[test]
    fn rejects_unknown_status_and_long_fields() {
        let (_, errors) = build(json!({
            "name": "n".repeat(101),
            "description": "d".repeat(501),
            "status": "abandoned",
        }));
        assert!(errors.get("name").is_some());
        assert!(errors.get("description").is_some());
        assert!(errors.get("status").is_some());
    }

    #[test]
    fn normalises_supplies_and_tasks() {
        let (project, errors) = build(json!({
            "name": "Sweater",
            "supplies": [" Wool ", "", "  "],
            "tasks": [{"title": " Swatch ", "completed": true}, {"title": "Cast on"}],
        }));
        assert!(errors.is_empty());
        assert_eq!(project.supplies, vec!["Wool"]);
        assert_eq!(project.tasks[0], Task { title: "Swatch".into(), completed: true });
        assert!(!project.tasks[1].completed);

        let (_, errors) = build(json!({"name": "Sweater", "tasks": [{"title": "  "}]}));
        assert_eq!(errors.get("tasks[0].title"), Some("Task title is required"));
    }

    #[test]
    fn null_clears_optional_fields_on_merge() {
        let (mut project, _) = build(json!({"name": "Quilt", "description": "Table runner", "dueDate": "2024-12-01"}));
        assert!(project.due_date.is_some());

        let mut errors = FieldErrors::new();
        let patch: ProjectInput = serde_json::from_value(json!({"description": null, "dueDate": null})).unwrap();
        project.apply(patch, &mut errors);
        project.validate(&mut errors);
        assert!(errors.is_empty());
        assert_eq!(project.name, "Quilt");
        assert_eq!(project.description, None);
        assert_eq!(project.due_date, None);
    }

    #[test]
    fn list_filter_ignores_all_and_requires_literal_true() {
        let owner = Uuid::new_v4();
        let query = ProjectQuery {
            status: Some("all".into()),
            important: Some("yes".into()),
            search: Some("".into()),
        };
        let filter = Project::list_filter(owner, &query).unwrap();
        assert_eq!(filter.conditions().len(), 1);

        let query = ProjectQuery {
            status: Some("ongoing".into()),
            important: Some("true".into()),
            search: Some("blanket".into()),
        };
        let filter = Project::list_filter(owner, &query).unwrap();
        assert_eq!(filter.conditions().len(), 4);
    }
}
