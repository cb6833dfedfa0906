//! Checks for the registration form which run before anything is sent to the backend.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    sync::LazyLock,
};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 72;

const FORBIDDEN_USERNAME_WORDS: [&str; 10] = [
    "admin",
    "administrator",
    "mod",
    "moderator",
    "system",
    "support",
    "staff",
    "official",
    "root",
    "superuser",
];

const COMMON_PASSWORDS: [&str; 10] = [
    "password",
    "123456",
    "qwerty",
    "12345678",
    "111111",
    "1234567890",
    "password123",
    "admin",
    "welcome",
    "abc123",
];

const PASSWORD_SPECIAL_CHARS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?~"#;

/// Messages for each form field, in the order they should be shown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationErrors {
    pub username: Vec<String>,
    pub email: Vec<String>,
    pub password: Vec<String>,
}

impl RegistrationErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.email.is_empty() && self.password.is_empty()
    }
}

impl Display for RegistrationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let all: Vec<_> = self
            .username
            .iter()
            .chain(&self.email)
            .chain(&self.password)
            .map(String::as_str)
            .collect();
        write!(f, "{}", all.join(", "))
    }
}

impl std::error::Error for RegistrationErrors {}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), RegistrationErrors> {
    let errors = RegistrationErrors {
        username: validate_username(username),
        email: validate_email(email),
        password: validate_password(password),
    };
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_username(username: &str) -> Vec<String> {
    #[expect(clippy::expect_used)]
    static USERNAME_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("compile regex"));

    let mut errors = vec![];
    let len = username.chars().count();
    if len < USERNAME_MIN {
        errors.push(format!(
            "Username must be at least {USERNAME_MIN} characters long"
        ));
    }
    if len > USERNAME_MAX {
        errors.push(format!(
            "Username must be at most {USERNAME_MAX} characters long"
        ));
    }
    if username.contains(' ') {
        errors.push("Username cannot contain spaces".to_string());
    }
    if !USERNAME_REGEX.is_match(username) {
        errors.push(
            "Username can only contain letters, numbers, dots, underscores, and hyphens"
                .to_string(),
        );
    }
    let lower = username.to_lowercase();
    if let Some(word) = FORBIDDEN_USERNAME_WORDS
        .iter()
        .find(|word| lower.contains(*word))
    {
        errors.push(format!("Username cannot contain '{word}'"));
    }
    errors
}

pub fn validate_password(password: &str) -> Vec<String> {
    let mut errors = vec![];
    let len = password.chars().count();
    if len < PASSWORD_MIN {
        errors.push(format!(
            "Password must be at least {PASSWORD_MIN} characters long"
        ));
    }
    if len > PASSWORD_MAX {
        errors.push(format!(
            "Password must be at most {PASSWORD_MAX} characters long"
        ));
    }
    let checks: [(fn(char) -> bool, &str); 4] = [
        (|c| c.is_ascii_uppercase(), "Password must contain an uppercase letter"),
        (|c| c.is_ascii_lowercase(), "Password must contain a lowercase letter"),
        (|c| c.is_ascii_digit(), "Password must contain a number"),
        (
            |c| PASSWORD_SPECIAL_CHARS.contains(c),
            "Password must contain a special character",
        ),
    ];
    for (check, message) in checks {
        if !password.chars().any(check) {
            errors.push(message.to_string());
        }
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        errors.push("This password is too common".to_string());
    }
    errors
}

pub fn validate_email(email: &str) -> Vec<String> {
    let email = email.trim();
    if email.is_empty() {
        vec!["Email is required".to_string()]
    } else if !email.contains('@') {
        vec!["Email must contain '@'".to_string()]
    } else {
        vec![]
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_registration() {
        assert_eq!(
            Ok(()),
            validate_registration("joke.teller_1", "a@example.com", "Secr3t!pass")
        );
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(
            vec!["Username must be at least 3 characters long".to_string()],
            validate_username("ab")
        );
        assert_eq!(
            vec![
                "Username cannot contain spaces".to_string(),
                "Username can only contain letters, numbers, dots, underscores, and hyphens"
                    .to_string()
            ],
            validate_username("two words")
        );
        assert_eq!(1, validate_username(&"a".repeat(21)).len());
        // only the first forbidden word is reported
        assert_eq!(
            vec!["Username cannot contain 'admin'".to_string()],
            validate_username("SuperAdministrator")
        );
    }

    #[test]
    fn test_password_rules() {
        let errors = validate_password("short");
        assert!(errors.contains(&"Password must be at least 8 characters long".to_string()));
        assert!(errors.contains(&"Password must contain an uppercase letter".to_string()));
        assert!(errors.contains(&"Password must contain a number".to_string()));
        assert!(errors.contains(&"Password must contain a special character".to_string()));
        assert!(!errors.contains(&"Password must contain a lowercase letter".to_string()));

        assert_eq!(1, validate_password(&format!("Aa1!{}", "x".repeat(70))).len());
        assert!(validate_password("PASSWORD123")
            .contains(&"This password is too common".to_string()));
    }

    #[test]
    fn test_errors_by_field() {
        let errors = validate_registration("ok_name", "", "weak").unwrap_err();
        assert!(errors.username.is_empty());
        assert_eq!(vec!["Email is required".to_string()], errors.email);
        assert!(!errors.password.is_empty());
        assert!(errors.to_string().starts_with("Email is required"));
    }
}
