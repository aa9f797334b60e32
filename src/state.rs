use crate::cache::SessionCache;
use crate::categories::sorted_categories;
use crate::errors::AppError;
use crate::goals::ordered_goals;
use crate::models::{AppData, Category, Goal, UserData, UserSettings};
use crate::storage::persist_data;
use chrono_tz::Tz;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Lock order is always `data` before `cache`.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub timezone: Tz,
    pub data: Arc<Mutex<AppData>>,
    pub cache: Arc<Mutex<SessionCache>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, timezone: Tz, data: AppData) -> Self {
        Self {
            data_path,
            timezone,
            data: Arc::new(Mutex::new(data)),
            cache: Arc::new(Mutex::new(SessionCache::default())),
        }
    }

    pub async fn goals_for(&self, user_id: &str) -> Result<Vec<Goal>, AppError> {
        let mut data = self.data.lock().await;
        let mut cache = self.cache.lock().await;
        if cache.goals.needs_reload(user_id) {
            let user = self.ensure_user(&mut data, user_id).await?;
            debug!(%user_id, count = user.goals.len(), "loading goals");
            cache.goals.fill(user_id, ordered_goals(&user.goals, self.timezone));
        }
        Ok(cache.goals.get(user_id).cloned().unwrap_or_default())
    }

    /// First use seeds the default categories.
    pub async fn categories_for(&self, user_id: &str) -> Result<Vec<Category>, AppError> {
        let mut data = self.data.lock().await;
        let mut cache = self.cache.lock().await;
        if cache.categories.needs_reload(user_id) {
            let user = self.ensure_user(&mut data, user_id).await?;
            debug!(%user_id, count = user.categories.len(), "loading categories");
            cache
                .categories
                .fill(user_id, sorted_categories(&user.categories));
        }
        Ok(cache.categories.get(user_id).cloned().unwrap_or_default())
    }

    pub async fn settings_for(&self, user_id: &str) -> Result<UserSettings, AppError> {
        let mut data = self.data.lock().await;
        let user = self.ensure_user(&mut data, user_id).await?;
        Ok(user.settings)
    }

    /// Runs `change` against the user's record and writes the data file. If
    /// either step fails the record is put back as it was.
    pub async fn mutate_user<R>(
        &self,
        user_id: &str,
        change: impl FnOnce(&mut UserData) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut data = self.data.lock().await;
        let (user, created) = data.user_mut(user_id);
        let previous = user.clone();
        let result = match change(user) {
            Ok(result) => result,
            Err(err) => {
                roll_back(&mut data, user_id, previous, created);
                return Err(err);
            }
        };
        let goals = ordered_goals(&user.goals, self.timezone);
        let categories = sorted_categories(&user.categories);

        if let Err(err) = persist_data(&self.data_path, &data).await {
            roll_back(&mut data, user_id, previous, created);
            return Err(err);
        }

        let mut cache = self.cache.lock().await;
        cache.goals.update_for(user_id, |cached| *cached = goals);
        cache.categories.update_for(user_id, |cached| *cached = categories);
        Ok(result)
    }

    pub async fn sign_out(&self, user_id: &str) {
        self.cache.lock().await.sign_out(user_id);
        info!(%user_id, "signed out");
    }

    async fn ensure_user<'a>(
        &self,
        data: &'a mut AppData,
        user_id: &str,
    ) -> Result<&'a UserData, AppError> {
        let (_, created) = data.user_mut(user_id);
        if created {
            if let Err(err) = persist_data(&self.data_path, data).await {
                data.users.remove(user_id);
                return Err(err);
            }
            info!(%user_id, "new user, seeded default tags");
        }
        data.users
            .get(user_id)
            .ok_or_else(|| AppError::not_found("user not found"))
    }
}

fn roll_back(data: &mut AppData, user_id: &str, previous: UserData, created: bool) {
    if created {
        data.users.remove(user_id);
    } else {
        data.users.insert(user_id.to_string(), previous);
    }
}
