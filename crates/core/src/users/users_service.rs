use std::sync::Arc;

use crate::errors::{Result, ValidationError};
use crate::users::users_model::{NewUser, User, UserListQuery, UserListResponse, UserUpdate};
use crate::users::users_traits::{UserRepositoryTrait, UserServiceTrait};

pub struct UserService<T: UserRepositoryTrait> {
    user_repo: Arc<T>,
}

impl<T: UserRepositoryTrait> UserService<T> {
    pub fn new(user_repo: Arc<T>) -> Self {
        UserService { user_repo }
    }
}

impl<T: UserRepositoryTrait> UserServiceTrait for UserService<T> {
    fn get_user(&self, user_id: &str) -> Result<User> {
        self.user_repo.load_user_by_id(user_id)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo.load_user_by_email(email)
    }

    fn create_user(&self, new_user: NewUser) -> Result<User> {
        if new_user.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email".into()).into());
        }
        if new_user.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".into()).into());
        }
        if new_user.password.is_empty() {
            return Err(ValidationError::MissingField("password".into()).into());
        }
        self.user_repo.insert_new_user(new_user)
    }

    fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        self.user_repo.update_user(user_id, update)
    }

    fn set_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        self.user_repo.set_password(user_id, password_hash)
    }

    fn delete_user(&self, user_id: &str) -> Result<usize> {
        self.user_repo.delete_user(user_id)
    }

    fn list_users(&self, query: &UserListQuery) -> Result<UserListResponse> {
        let (count, collection) = self.user_repo.list_users(query)?;
        Ok(UserListResponse { count, collection })
    }
}
