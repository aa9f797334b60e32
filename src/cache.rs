use crate::models::{Category, Goal};

/// Read-through cache owned by a single user at a time.
///
/// Whatever is cached is only handed out to the user it was loaded for; a
/// request from anyone else must reload first.
#[derive(Debug, Clone, Default)]
pub struct UserCache<T> {
    data: T,
    loaded: bool,
    owner_user_id: Option<String>,
}

impl<T: Default> UserCache<T> {
    pub fn needs_reload(&self, user_id: &str) -> bool {
        !self.loaded || self.owner_user_id.as_deref() != Some(user_id)
    }

    pub fn fill(&mut self, user_id: &str, data: T) {
        self.data = data;
        self.loaded = true;
        self.owner_user_id = Some(user_id.to_string());
    }

    pub fn get(&self, user_id: &str) -> Option<&T> {
        if self.needs_reload(user_id) {
            None
        } else {
            Some(&self.data)
        }
    }

    /// Applies `apply` when the cache currently holds `user_id`'s data.
    pub fn update_for(&mut self, user_id: &str, apply: impl FnOnce(&mut T)) -> bool {
        if self.needs_reload(user_id) {
            return false;
        }
        apply(&mut self.data);
        true
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }

    pub fn invalidate(&mut self) {
        self.data = T::default();
        self.loaded = false;
        self.owner_user_id = None;
    }
}

#[derive(Debug, Default)]
pub struct SessionCache {
    pub goals: UserCache<Vec<Goal>>,
    pub categories: UserCache<Vec<Category>>,
}

impl SessionCache {
    /// Drops everything cached for `user_id`. Other users' entries stay.
    pub fn sign_out(&mut self, user_id: &str) {
        if self.goals.owner() == Some(user_id) {
            self.goals.invalidate();
        }
        if self.categories.owner() == Some(user_id) {
            self.categories.invalidate();
        }
    }
}
