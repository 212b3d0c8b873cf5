//! Profile view and edits for any signed-in user

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use crate::domain::{DomainError, DomainResult, RepositoryProvider, User};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ProfileUpdate {
    fn wants_password_change(&self) -> bool {
        self.new_password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

pub struct ProfileService {
    repos: Arc<dyn RepositoryProvider>,
    adult_age: u32,
}

impl ProfileService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, adult_age: u32) -> Self {
        Self { repos, adult_age }
    }

    pub async fn get_profile(&self, user_id: i32) -> DomainResult<User> {
        self.load(user_id).await
    }

    pub async fn edit_profile(&self, user_id: i32, update: ProfileUpdate) -> DomainResult<User> {
        let mut user = self.load(user_id).await?;
        let users = self.repos.users();

        let blank = [&update.username, &update.email, &update.full_name, &update.address]
            .iter()
            .any(|f| f.trim().is_empty());
        if blank {
            return Err(DomainError::validation("All profile fields are required."));
        }

        if let Some(other) = users.find_by_username(&update.username).await? {
            if other.id != user.id {
                error!(user = %user.email, "Attempted to take an existing username");
                return Err(DomainError::validation(
                    "User with this username is already registered",
                ));
            }
        }
        if let Some(other) = users.find_by_email(&update.email).await? {
            if other.id != user.id {
                error!(user = %user.email, "Attempted to take an existing email address");
                return Err(DomainError::validation(
                    "User with this email is already registered",
                ));
            }
        }

        if user.is_seller()
            && !crate::domain::user::is_adult(
                update.birth_date,
                Utc::now().date_naive(),
                self.adult_age,
            )
        {
            return Err(DomainError::validation(format!(
                "Sellers have to be at least {} years old.",
                self.adult_age
            )));
        }

        if update.wants_password_change() {
            let current = update.current_password.as_deref().unwrap_or_default();
            if !verify_password(current, &user.password_hash).unwrap_or(false) {
                error!(user = %user.email, "Profile edit with incorrect current password");
                return Err(DomainError::validation("Invalid Password"));
            }
            if update.new_password != update.confirm_password {
                return Err(DomainError::validation(
                    "Password are not matching. Please try again",
                ));
            }
            let new_password = update.new_password.as_deref().unwrap_or_default();
            user.password_hash = hash_password(new_password)
                .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;
        }

        user.username = update.username;
        user.email = update.email;
        user.full_name = update.full_name;
        user.birth_date = update.birth_date;
        user.address = update.address;

        users.update(&user).await?;
        info!(user = %user.email, "Profile updated");
        Ok(user)
    }

    pub async fn add_picture(&self, user_id: i32, image: Vec<u8>) -> DomainResult<()> {
        let mut user = self.load(user_id).await?;
        user.image = Some(image);
        self.repos.users().update(&user).await?;
        info!(user = %user.email, "Profile picture updated");
        Ok(())
    }

    async fn load(&self, user_id: i32) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized(format!("Unable to find user with ID: {}.", user_id))
            })
    }
}
