use crate::errors::Result;
use crate::users::users_model::{NewUser, User, UserListQuery, UserListResponse, UserUpdate};

/// Trait for user repository operations
pub trait UserRepositoryTrait: Send + Sync {
    fn load_user_by_id(&self, user_id: &str) -> Result<User>;
    fn load_user_by_email(&self, user_email: &str) -> Result<Option<User>>;
    fn insert_new_user(&self, new_user: NewUser) -> Result<User>;
    fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User>;
    fn set_password(&self, user_id: &str, password_hash: &str) -> Result<()>;
    fn delete_user(&self, user_id: &str) -> Result<usize>;
    fn list_users(&self, query: &UserListQuery) -> Result<(i64, Vec<User>)>;
}

/// Trait for user service operations
pub trait UserServiceTrait: Send + Sync {
    fn get_user(&self, user_id: &str) -> Result<User>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn create_user(&self, new_user: NewUser) -> Result<User>;
    fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User>;
    fn set_password(&self, user_id: &str, password_hash: &str) -> Result<()>;
    fn delete_user(&self, user_id: &str) -> Result<usize>;
    fn list_users(&self, query: &UserListQuery) -> Result<UserListResponse>;
}
