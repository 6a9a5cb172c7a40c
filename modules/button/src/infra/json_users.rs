use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::contract::model::User;
use crate::domain::directory::UserDirectory;
use crate::domain::error::DirectoryError;

#[derive(Debug, Deserialize)]
struct UsersFile {
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    #[serde(rename = "userId")]
    user_id: String,
    name: String,
}

/// User directory loaded once from a JSON file and never modified afterwards.
#[derive(Debug, Default)]
pub struct JsonUserDirectory {
    users: Vec<User>,
    index: HashMap<String, usize>,
}

impl JsonUserDirectory {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read users file '{}'", path.display()))?;
        let directory = Self::from_json_str(&raw)
            .with_context(|| format!("Invalid users file '{}'", path.display()))?;
        tracing::info!(
            users = directory.users.len(),
            file = %path.display(),
            "User directory loaded"
        );
        Ok(directory)
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let file: UsersFile = serde_json::from_str(raw)?;
        Ok(Self::from_users(file.users.into_iter().map(|e| User {
            user_id: e.user_id,
            name: e.name,
        })))
    }

    /// Later duplicates overwrite the name but keep the first position.
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut directory = Self::default();
        for user in users {
            match directory.index.get(&user.user_id) {
                Some(&at) => {
                    tracing::warn!(user_id = %user.user_id, "Duplicate user id, last entry wins");
                    directory.users[at] = user;
                }
                None => {
                    directory
                        .index
                        .insert(user.user_id.clone(), directory.users.len());
                    directory.users.push(user);
                }
            }
        }
        directory
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for JsonUserDirectory {
    fn by_id(&self, user_id: &str) -> Result<User, DirectoryError> {
        self.index
            .get(user_id)
            .map(|&at| self.users[at].clone())
            .ok_or_else(|| DirectoryError::not_found(user_id))
    }

    fn all(&self) -> Vec<User> {
        self.users.clone()
    }
}
