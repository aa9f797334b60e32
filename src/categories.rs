use crate::errors::AppError;
use crate::models::{Category, CategoryRequest, UserData};
use tracing::info;
use uuid::Uuid;

/// Tags every user starts with.
pub const DEFAULT_CATEGORY_NAMES: [&str; 7] = [
    "Health",
    "Career",
    "Learning",
    "Finance",
    "Relationships",
    "Mindset",
    "Creative",
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORY_NAMES
        .iter()
        .map(|name| Category {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            description: None,
        })
        .collect()
}

/// Categories ordered by name, ignoring case.
pub fn sorted_categories(categories: &[Category]) -> Vec<Category> {
    let mut sorted = categories.to_vec();
    sorted.sort_by_cached_key(|category| category.name.to_lowercase());
    sorted
}

pub fn create_category(user: &mut UserData, request: CategoryRequest) -> Result<Category, AppError> {
    let name = validated_name(user, &request.name, None)?;
    let category = Category {
        id: Uuid::new_v4().to_string(),
        name,
        description: clean_description(request.description),
    };
    info!(category_id = %category.id, name = %category.name, "category created");
    user.categories.push(category.clone());
    Ok(category)
}

/// Renames or re-describes a category. Goals linked to it pick up the new name.
pub fn update_category(
    user: &mut UserData,
    category_id: &str,
    request: CategoryRequest,
) -> Result<Category, AppError> {
    let name = validated_name(user, &request.name, Some(category_id))?;
    let category = user
        .categories
        .iter_mut()
        .find(|category| category.id == category_id)
        .ok_or_else(|| AppError::not_found("tag not found"))?;
    category.name = name;
    category.description = clean_description(request.description);
    let updated = category.clone();

    refresh_goal_names(user);
    Ok(updated)
}

/// Removes a category and unlinks it from every goal.
pub fn delete_category(user: &mut UserData, category_id: &str) -> Result<(), AppError> {
    let before = user.categories.len();
    user.categories.retain(|category| category.id != category_id);
    if user.categories.len() == before {
        return Err(AppError::not_found("tag not found"));
    }

    for goal in &mut user.goals {
        goal.category_ids.retain(|id| id != category_id);
    }
    refresh_goal_names(user);
    info!(%category_id, "category deleted");
    Ok(())
}

/// Keeps the selected ids that still exist and returns them together with
/// the matching names, both in category list order.
pub fn resolve_selection(categories: &[Category], selected: &[String]) -> (Vec<String>, Vec<String>) {
    sorted_categories(categories)
        .into_iter()
        .filter(|category| selected.contains(&category.id))
        .map(|category| (category.id, category.name))
        .unzip()
}

fn refresh_goal_names(user: &mut UserData) {
    let UserData {
        goals, categories, ..
    } = user;
    for goal in goals.iter_mut() {
        let (ids, names) = resolve_selection(categories, &goal.category_ids);
        goal.category_ids = ids;
        goal.categories = names;
    }
}

fn validated_name(user: &UserData, raw: &str, editing: Option<&str>) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Tag name is required."));
    }
    let lowered = name.to_lowercase();
    let taken = user.categories.iter().any(|category| {
        Some(category.id.as_str()) != editing && category.name.to_lowercase() == lowered
    });
    if taken {
        return Err(AppError::conflict(format!("A tag named \"{name}\" already exists.")));
    }
    Ok(name.to_string())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
