use crate::domain::{User, UserId};
use crate::ports::user_repository::{Result, UserRepository as UserRepositoryTrait};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// UserRepositoryのインメモリ実装
#[derive(Default)]
pub struct UserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    /// メールアドレスの一意制約はPostgreSQLと同様にエラーにする
    async fn insert(&self, user: User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(format!("duplicate email: {}", user.email).into());
        }
        users.insert(user.user_id, user);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}
