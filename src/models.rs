use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    /// Moment the user started typing the goal. Never rewritten.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Display names of the linked categories, kept in category list order.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserSettings {
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserData {
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub settings: UserSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub users: BTreeMap<String, UserData>,
}

impl AppData {
    /// Returns the user's record, seeding default categories the first time a
    /// user is seen. The flag reports whether the record was just created.
    pub fn user_mut(&mut self, user_id: &str) -> (&mut UserData, bool) {
        let created = !self.users.contains_key(user_id);
        let user = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| UserData {
                categories: crate::categories::default_categories(),
                ..UserData::default()
            });
        (user, created)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    /// When the first non-blank character was typed.
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

/// Full replacement of the editable fields, as sent by the edit dialog.
#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: String,
    #[serde(default)]
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub ended: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub theme: Theme,
}

#[derive(Debug, Serialize)]
pub struct YearsResponse {
    pub years: Vec<i32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct YearQuery {
    pub year: Option<i32>,
}
