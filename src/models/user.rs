use serde::{Deserialize, Serialize};

/// A console login as `/getUsers` lists it: a `[username, password]` pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserCredential(pub String, pub String);

impl UserCredential {
    pub fn username(&self) -> &str {
        &self.0
    }

    pub fn password(&self) -> &str {
        &self.1
    }
}

/// Body of `POST /updateUser`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UserUpdate {
    pub current_username: String,
    pub new_username: String,
    pub current_password: String,
    pub new_password: String,
}

impl UserUpdate {
    pub fn replacing(current: &UserCredential, username: &str, password: &str) -> Self {
        Self {
            current_username: current.username().to_string(),
            new_username: username.to_string(),
            current_password: current.password().to_string(),
            new_password: password.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_parse_from_pairs() {
        let users: Vec<UserCredential> =
            serde_json::from_str(r#"[["admin", "s3cret"], ["office", "pw"]]"#).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username(), "office");

        let update = UserUpdate::replacing(&users[0], "principal", "n3w");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["CurrentUsername"], "admin");
        assert_eq!(json["NewPassword"], "n3w");
    }
}
