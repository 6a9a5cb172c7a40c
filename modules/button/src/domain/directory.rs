use crate::contract::model::User;
use crate::domain::error::DirectoryError;

/// Read-only lookup of registered users.
pub trait UserDirectory: Send + Sync {
    fn by_id(&self, user_id: &str) -> Result<User, DirectoryError>;

    /// Every user, in load order.
    fn all(&self) -> Vec<User>;
}
