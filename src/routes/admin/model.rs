use serde::{Deserialize, Serialize};

use crate::panel::RemoteUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub total: usize,
    pub users: Vec<RemoteUser>,
}

impl From<Vec<RemoteUser>> for UserListResponse {
    fn from(users: Vec<RemoteUser>) -> Self {
        Self {
            total: users.len(),
            users,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientMutationResponse {
    pub username: String,
}

/// 用户名会拼进面板的 URL 路径
pub(super) fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 64
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_must_be_path_safe() {
        assert!(is_valid_username("user_01"));
        assert!(is_valid_username("a.b-c@d"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("../admin"));
        assert!(!is_valid_username("a b"));
        assert!(!is_valid_username("a?b"));
    }
}
