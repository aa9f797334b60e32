use crate::categories;
use crate::dates::{has_ended, today};
use crate::errors::AppError;
use crate::goals::{self, available_years, goal_views, GoalDraft};
use crate::heatmap::{build_daily_grid, DailyGrid};
use crate::identity::{user_from_headers, CurrentUser};
use crate::models::{
    Category, CategoryRequest, CreateGoalRequest, Goal, GoalView, ScoreRequest, SettingsRequest,
    UpdateGoalRequest, UserSettings, YearQuery, YearsResponse,
};
use crate::state::AppState;
use crate::ui::{render_index, HeatmapPage};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    Json,
};
use chrono::{Datelike, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub year: i32,
    #[serde(flatten)]
    pub grid: DailyGrid,
}

pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<YearQuery>,
) -> Result<Html<String>, AppError> {
    let year = query.year.unwrap_or_else(|| current_year(&state));
    let Some(user_id) = user_from_headers(&headers) else {
        let grid = DailyGrid::default();
        return Ok(Html(render_index(&HeatmapPage {
            user_id: None,
            year,
            years: &[],
            grid: &grid,
            theme: Default::default(),
        })));
    };

    let goals = state.goals_for(&user_id).await?;
    let settings = state.settings_for(&user_id).await?;
    let years = available_years(&goals, current_year(&state), state.timezone);
    let grid = build_daily_grid(&goals, year, state.timezone);

    Ok(Html(render_index(&HeatmapPage {
        user_id: Some(&user_id),
        year,
        years: &years,
        grid: &grid,
        theme: settings.theme,
    })))
}

pub async fn list_goals(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<GoalView>>, AppError> {
    let goals = state.goals_for(&user_id).await?;
    Ok(Json(goal_views(goals, Utc::now(), state.timezone)))
}

pub async fn create_goal(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<GoalView>), AppError> {
    let tz = state.timezone;
    let draft = GoalDraft::from_request(payload, tz)?;
    let now = Utc::now();
    let goal = state
        .mutate_user(&user_id, |user| goals::create_goal(user, draft, now, tz))
        .await?;
    Ok((StatusCode::CREATED, Json(view(goal, &state))))
}

pub async fn update_goal(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(goal_id): Path<String>,
    Json(payload): Json<UpdateGoalRequest>,
) -> Result<Json<GoalView>, AppError> {
    let tz = state.timezone;
    let goal = state
        .mutate_user(&user_id, |user| goals::update_goal(user, &goal_id, payload, tz))
        .await?;
    Ok(Json(view(goal, &state)))
}

pub async fn score_goal(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(goal_id): Path<String>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<GoalView>, AppError> {
    let goal = state
        .mutate_user(&user_id, |user| goals::score_goal(user, &goal_id, payload.outcome))
        .await?;
    Ok(Json(view(goal, &state)))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(goal_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .mutate_user(&user_id, |user| goals::delete_goal(user, &goal_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_years(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<YearsResponse>, AppError> {
    let goals = state.goals_for(&user_id).await?;
    let years = available_years(&goals, current_year(&state), state.timezone);
    Ok(Json(YearsResponse { years }))
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<YearQuery>,
) -> Result<Json<HeatmapResponse>, AppError> {
    let year = query.year.unwrap_or_else(|| current_year(&state));
    let goals = state.goals_for(&user_id).await?;
    Ok(Json(HeatmapResponse {
        year,
        grid: build_daily_grid(&goals, year, state.timezone),
    }))
}

pub async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.categories_for(&user_id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state
        .mutate_user(&user_id, |user| categories::create_category(user, payload))
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(category_id): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .mutate_user(&user_id, |user| categories::update_category(user, &category_id, payload))
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(category_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .mutate_user(&user_id, |user| categories::delete_category(user, &category_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserSettings>, AppError> {
    Ok(Json(state.settings_for(&user_id).await?))
}

pub async fn put_settings(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<UserSettings>, AppError> {
    let settings = state
        .mutate_user(&user_id, |user| {
            user.settings.theme = payload.theme;
            Ok(user.settings)
        })
        .await?;
    Ok(Json(settings))
}

pub async fn toggle_theme(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserSettings>, AppError> {
    let settings = state
        .mutate_user(&user_id, |user| {
            user.settings.theme = user.settings.theme.toggled();
            Ok(user.settings)
        })
        .await?;
    Ok(Json(settings))
}

pub async fn sign_out(State(state): State<AppState>, CurrentUser(user_id): CurrentUser) -> StatusCode {
    state.sign_out(&user_id).await;
    StatusCode::NO_CONTENT
}

fn view(goal: Goal, state: &AppState) -> GoalView {
    GoalView {
        ended: has_ended(goal.end_at.as_deref(), Utc::now(), state.timezone),
        goal,
    }
}

fn current_year(state: &AppState) -> i32 {
    today(state.timezone).year()
}
