use serde::Deserialize;
use utoipa::ToSchema;

pub const USERNAME_MAX_LEN: usize = 150;

const REQUIRED: &str = "This field is required.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
numbers, and @/./+/-/_ characters.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const INVALID_LOGIN: &str = "Please enter a correct username and password. Note that both \
fields may be case-sensitive.";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Validation messages keyed by form field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    pub username: Vec<String>,
    pub password1: Vec<String>,
    pub password2: Vec<String>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
            && self.password1.is_empty()
            && self.password2.is_empty()
            && self.non_field.is_empty()
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        Self {
            non_field: vec![message.into()],
            ..Self::default()
        }
    }
}

/// A registration form that passed the shape checks. Uniqueness is checked against the store.
#[derive(Debug)]
pub struct ValidRegistration {
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<ValidRegistration, FormErrors> {
        let mut errors = FormErrors::default();
        let username = self.username.trim();

        if username.is_empty() {
            errors.username.push(REQUIRED.to_string());
        } else {
            let len = username.chars().count();
            if len > USERNAME_MAX_LEN {
                errors.username.push(format!(
                    "Ensure this value has at most {USERNAME_MAX_LEN} characters (it has {len})."
                ));
            }
            if !username.chars().all(is_username_char) {
                errors.username.push(INVALID_USERNAME.to_string());
            }
        }

        if self.password1.is_empty() {
            errors.password1.push(REQUIRED.to_string());
        }
        if self.password2.is_empty() {
            errors.password2.push(REQUIRED.to_string());
        } else if !self.password1.is_empty() && self.password1 != self.password2 {
            errors.password2.push(PASSWORD_MISMATCH.to_string());
        }

        if errors.is_empty() {
            Ok(ValidRegistration {
                username: username.to_string(),
                password: self.password1.clone(),
            })
        } else {
            Err(errors)
        }
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '@' | '.' | '+' | '-')
}

/// Keep a post-login redirect on this site: only local absolute paths are honoured.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.contains(['\r', '\n']) =>
        {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, p1: &str, p2: &str) -> RegisterForm {
        RegisterForm {
            username: username.into(),
            password1: p1.into(),
            password2: p2.into(),
        }
    }

    #[test]
    fn valid_form_trims_username() {
        let ok = form("  alice.b+shop@x_1 ", "s3cret", "s3cret")
            .validate()
            .expect("valid");
        assert_eq!(ok.username, "alice.b+shop@x_1");
        assert_eq!(ok.password, "s3cret");
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = form("", "", "").validate().unwrap_err();
        assert_eq!(errors.username, vec![REQUIRED.to_string()]);
        assert_eq!(errors.password1, vec![REQUIRED.to_string()]);
        assert_eq!(errors.password2, vec![REQUIRED.to_string()]);
    }

    #[test]
    fn rejects_bad_characters_and_long_names() {
        let errors = form("bob smith", "pw", "pw").validate().unwrap_err();
        assert_eq!(errors.username, vec![INVALID_USERNAME.to_string()]);

        let long = "a".repeat(151);
        let errors = form(&long, "pw", "pw").validate().unwrap_err();
        assert_eq!(
            errors.username,
            vec!["Ensure this value has at most 150 characters (it has 151).".to_string()]
        );
    }

    #[test]
    fn mismatched_passwords_flag_confirmation() {
        let errors = form("carol", "one", "two").validate().unwrap_err();
        assert!(errors.username.is_empty());
        assert!(errors.password1.is_empty());
        assert_eq!(errors.password2, vec![PASSWORD_MISMATCH.to_string()]);
    }

    #[test]
    fn next_only_allows_local_paths() {
        assert_eq!(safe_next(Some("/cart/")), "/cart/");
        assert_eq!(safe_next(Some("/cart/?page=2")), "/cart/?page=2");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
