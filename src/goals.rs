use crate::categories::resolve_selection;
use crate::dates::{has_ended, normalize_timestamp, parse_timestamp, to_stored};
use crate::errors::AppError;
use crate::models::{CreateGoalRequest, Goal, GoalView, Outcome, UpdateGoalRequest, UserData};
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use std::cmp::Reverse;
use tracing::info;
use uuid::Uuid;

/// A goal being written. The start time is the first moment the title held
/// anything other than whitespace.
#[derive(Debug, Clone, Default)]
pub struct GoalDraft {
    pub title: String,
    pub started_at: Option<DateTime<Utc>>,
    pub end_at: Option<String>,
    pub category_ids: Vec<String>,
}

impl GoalDraft {
    pub fn update_title(&mut self, value: &str, now: DateTime<Utc>) {
        if self.started_at.is_none() && !value.trim().is_empty() {
            self.started_at = Some(now);
        }
        self.title = value.to_string();
    }

    pub fn from_request(request: CreateGoalRequest, tz: Tz) -> Result<Self, AppError> {
        let started_at = match request.started_at.as_deref() {
            Some(raw) => Some(
                parse_timestamp(raw, tz)
                    .ok_or_else(|| AppError::bad_request("started_at is not a valid date"))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };
        Ok(Self {
            title: request.title,
            started_at,
            end_at: request.end_at,
            category_ids: request.category_ids,
        })
    }
}

/// Saves a draft as the newest goal of `user`.
pub fn create_goal(
    user: &mut UserData,
    draft: GoalDraft,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<Goal, AppError> {
    let title = required_title(&draft.title)?;
    let end_at = end_date(draft.end_at.as_deref(), tz)?;
    let (category_ids, categories) = resolve_selection(&user.categories, &draft.category_ids);

    let goal = Goal {
        id: Uuid::new_v4().to_string(),
        title,
        created_at: to_stored(draft.started_at.unwrap_or(now)),
        end_at,
        outcome: None,
        categories,
        category_ids,
    };
    info!(goal_id = %goal.id, created_at = %goal.created_at, "goal created");
    user.goals.insert(0, goal.clone());
    Ok(goal)
}

/// Applies the edit dialog. The start time is never touched; the outcome may
/// be set, changed or cleared here.
pub fn update_goal(
    user: &mut UserData,
    goal_id: &str,
    request: UpdateGoalRequest,
    tz: Tz,
) -> Result<Goal, AppError> {
    let title = required_title(&request.title)?;
    let end_at = end_date(request.end_at.as_deref(), tz)?;
    let (category_ids, categories) = resolve_selection(&user.categories, &request.category_ids);

    let goal = find_goal(user, goal_id)?;
    goal.title = title;
    goal.outcome = request.outcome;
    goal.end_at = end_at;
    goal.category_ids = category_ids;
    goal.categories = categories;
    info!(%goal_id, "goal updated");
    Ok(goal.clone())
}

/// Marks an unscored goal passed or failed.
pub fn score_goal(user: &mut UserData, goal_id: &str, outcome: Outcome) -> Result<Goal, AppError> {
    let goal = find_goal(user, goal_id)?;
    if goal.outcome.is_some() {
        return Err(AppError::conflict("goal has already been scored"));
    }
    goal.outcome = Some(outcome);
    info!(%goal_id, ?outcome, "goal scored");
    Ok(goal.clone())
}

pub fn delete_goal(user: &mut UserData, goal_id: &str) -> Result<(), AppError> {
    let before = user.goals.len();
    user.goals.retain(|goal| goal.id != goal_id);
    if user.goals.len() == before {
        return Err(AppError::not_found("goal not found"));
    }
    info!(%goal_id, "goal deleted");
    Ok(())
}

/// Newest first. Goals whose start does not parse go last, in stored order.
pub fn ordered_goals(goals: &[Goal], tz: Tz) -> Vec<Goal> {
    let mut ordered = goals.to_vec();
    ordered.sort_by_cached_key(|goal| {
        Reverse(parse_timestamp(&goal.created_at, tz).map(|instant| instant.with_timezone(&Utc)))
    });
    ordered
}

pub fn goal_views(goals: Vec<Goal>, now: DateTime<Utc>, tz: Tz) -> Vec<GoalView> {
    goals
        .into_iter()
        .map(|goal| GoalView {
            ended: has_ended(goal.end_at.as_deref(), now, tz),
            goal,
        })
        .collect()
}

/// Years that have at least one goal, plus the current one, newest first.
pub fn available_years(goals: &[Goal], current_year: i32, tz: Tz) -> Vec<i32> {
    let mut years: Vec<i32> = goals
        .iter()
        .filter_map(|goal| parse_timestamp(&goal.created_at, tz))
        .map(|instant| instant.year())
        .chain(std::iter::once(current_year))
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

fn find_goal<'a>(user: &'a mut UserData, goal_id: &str) -> Result<&'a mut Goal, AppError> {
    user.goals
        .iter_mut()
        .find(|goal| goal.id == goal_id)
        .ok_or_else(|| AppError::not_found("goal not found"))
}

fn required_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("goal title is required"));
    }
    Ok(title.to_string())
}

fn end_date(raw: Option<&str>, tz: Tz) -> Result<Option<String>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => normalize_timestamp(value, tz)
            .map(Some)
            .ok_or_else(|| AppError::bad_request("end_at is not a valid date")),
        None => Ok(None),
    }
}
