//! User Entity

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use unicode_normalization::UnicodeNormalization;

use crate::domain::value_object::{UserId, login_field::LoginField};

/// User account as seen by login
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique handle, NFKC-normalised on creation
    pub username: String,
    /// Contact email, domain part lower-cased on creation
    pub email: Option<String>,
    pub password_hash: HashedPassword,
    /// Inactive users cannot authenticate
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, email: Option<&str>, password_hash: HashedPassword) -> Self {
        Self {
            user_id: UserId::new(),
            username: Self::normalize_username(username),
            email: email.map(Self::normalize_email),
            password_hash,
            is_active: true,
            last_login: None,
            date_joined: Utc::now(),
        }
    }

    /// Fold compatibility characters so that visually identical names
    /// collide (e.g. fullwidth `ｊｏｈｎ` and `john`).
    pub fn normalize_username(username: &str) -> String {
        username.nfkc().collect()
    }

    /// Lower-case the domain part; the local part is case-sensitive.
    pub fn normalize_email(email: &str) -> String {
        let email = email.trim();
        match email.rsplit_once('@') {
            Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
            None => email.to_string(),
        }
    }

    /// Value of the given login field, if the user has one
    pub fn field_value(&self, field: LoginField) -> Option<&str> {
        match field {
            LoginField::Username => Some(&self.username),
            LoginField::Email => self.email.as_deref(),
        }
    }

    /// Whether `value` identifies this user through `field`.
    ///
    /// Usernames match exactly, emails case-insensitively.
    pub fn matches(&self, field: LoginField, value: &str) -> bool {
        match (field, self.field_value(field)) {
            (LoginField::Username, Some(username)) => username == value,
            (LoginField::Email, Some(email)) => email.eq_ignore_ascii_case(value),
            (_, None) => false,
        }
    }

    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn hash() -> HashedPassword {
        ClearTextPassword::new("Correct-Horse-9").hash(None).unwrap()
    }

    #[test]
    fn test_new_user_normalises() {
        let user = User::new("ｊｏｈｎ", Some("John@Example.COM"), hash());
        assert_eq!(user.username, "john");
        assert_eq!(user.email.as_deref(), Some("John@example.com"));
        assert!(user.is_active);
        assert!(user.last_login.is_none());
    }

    #[test]
    fn test_matches() {
        let user = User::new("john", Some("john@example.com"), hash());
        assert!(user.matches(LoginField::Username, "john"));
        assert!(!user.matches(LoginField::Username, "John"));
        assert!(user.matches(LoginField::Email, "JOHN@example.com"));
        assert!(!user.matches(LoginField::Email, "john"));

        let no_email = User::new("jane", None, hash());
        assert!(!no_email.matches(LoginField::Email, "jane"));
    }
}
