//! Submitted forms and their validation.
//!
//! Forms arrive URL-encoded with every field as text. Declarative rules run
//! through `validator`; `clean` then converts the raw strings into typed
//! values, collecting every failure per field.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::response::FieldErrors;

const REQUIRED: &str = "This field is required.";

/// Formats accepted for `pub_date`, tried in order before RFC 3339.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username").with_message(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".into(),
        ))
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required").with_message(REQUIRED.into()))
    } else {
        Ok(())
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

fn parse_reference(
    errors: &mut FieldErrors,
    field: &str,
    raw: &str,
    required: bool,
) -> Option<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        if required {
            errors.add(field, REQUIRED);
        }
        return None;
    }
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(
                field,
                "Select a valid choice. That choice is not one of the available choices.",
            );
            None
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Create/edit post form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 256, message = "Title must be 1 to 256 characters long.")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
    /// `YYYY-MM-DDTHH:MM` (datetime-local) or RFC 3339, taken as UTC.
    #[serde(default)]
    pub pub_date: String,
    /// Category id.
    #[serde(default)]
    pub category: String,
    /// Location id, optional.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: String,
    /// Absent means published.
    #[serde(default)]
    pub is_published: Option<String>,
}

/// A post form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_published: bool,
}

impl PostForm {
    /// Title and text are trimmed before any rule runs.
    pub fn clean(&self) -> Result<CleanedPost, FieldErrors> {
        let title = self.title.trim().to_string();
        let text = self.text.trim().to_string();
        let trimmed = PostForm {
            title: title.clone(),
            text: text.clone(),
            ..self.clone()
        };
        let mut errors = match trimmed.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let pub_date = if self.pub_date.trim().is_empty() {
            errors.add("pub_date", REQUIRED);
            None
        } else {
            let parsed = parse_datetime(&self.pub_date);
            if parsed.is_none() {
                errors.add("pub_date", "Enter a valid date/time.");
            }
            parsed
        };
        let category_id = parse_reference(&mut errors, "category", &self.category, true);
        let location_id = parse_reference(&mut errors, "location", &self.location, false);
        let is_published = !matches!(
            self.is_published.as_deref().map(str::trim),
            Some("false" | "off" | "0" | "")
        );

        match (pub_date, category_id) {
            (Some(pub_date), Some(category_id)) if errors.is_empty() => Ok(CleanedPost {
                title,
                text,
                pub_date,
                category_id,
                location_id,
                image: non_blank(&self.image),
                is_published,
            }),
            _ => Err(errors),
        }
    }
}

/// Comment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, FieldErrors> {
        if self.text.trim().is_empty() {
            return Err(FieldErrors::single("text", REQUIRED));
        }
        self.validate()?;
        Ok(self.text.clone())
    }
}

/// Profile edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1 to 150 characters long."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

impl ProfileForm {
    pub fn clean(&self) -> Result<ProfileForm, FieldErrors> {
        self.validate()?;
        Ok(ProfileForm {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.clone(),
            email: self.email.trim().to_string(),
        })
    }
}

/// Password change form: both entries must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PasswordChangeForm {
    #[serde(default)]
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters."),
        must_match(other = "password2", message = "Passwords don't match")
    )]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl PasswordChangeForm {
    pub fn clean(&self) -> Result<&str, FieldErrors> {
        self.validate()?;
        Ok(&self.password1)
    }
}

/// Account registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1 to 150 characters long."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
}

impl RegistrationForm {
    pub fn clean(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn valid_post_form() -> PostForm {
        PostForm {
            title: "Trip".to_string(),
            text: "We went north.".to_string(),
            pub_date: "2024-05-01T10:30".to_string(),
            category: Uuid::new_v4().to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_post_form_cleans_typed_values() {
        let cleaned = valid_post_form().clean().unwrap();

        assert_eq!(cleaned.pub_date.year(), 2024);
        assert_eq!(cleaned.pub_date.hour(), 10);
        assert_eq!(cleaned.pub_date.minute(), 30);
        assert_eq!(cleaned.location_id, None);
        assert_eq!(cleaned.image, None);
        assert!(cleaned.is_published);
    }

    #[test]
    fn test_post_form_accepts_rfc3339() {
        let form = PostForm {
            pub_date: "2024-05-01T10:30:00+02:00".to_string(),
            ..valid_post_form()
        };

        assert_eq!(form.clean().unwrap().pub_date.hour(), 8);
    }

    #[test]
    fn test_post_form_reports_every_bad_field() {
        let form = PostForm {
            title: "x".repeat(257),
            text: String::new(),
            pub_date: "tomorrow".to_string(),
            category: String::new(),
            location: "nowhere".to_string(),
            ..Default::default()
        };

        let errors = form.clean().unwrap_err();

        for field in ["title", "text", "pub_date", "category", "location"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_post_form_rejects_whitespace_title_and_text() {
        let form = PostForm {
            title: "   ".to_string(),
            text: "  \n ".to_string(),
            ..valid_post_form()
        };

        let errors = form.clean().unwrap_err();

        assert!(errors.contains("title"));
        assert!(errors.contains("text"));
    }

    #[test]
    fn test_post_form_trims_title_and_text() {
        let form = PostForm {
            title: "  Trip ".to_string(),
            text: "\nWe went north.  ".to_string(),
            ..valid_post_form()
        };

        let cleaned = form.clean().unwrap();

        assert_eq!(cleaned.title, "Trip");
        assert_eq!(cleaned.text, "We went north.");
    }

    #[test]
    fn test_post_form_unpublish_checkbox() {
        let form = PostForm {
            is_published: Some("false".to_string()),
            ..valid_post_form()
        };

        assert!(!form.clean().unwrap().is_published);
    }

    #[test]
    fn test_blank_comment_is_rejected() {
        let form = CommentForm {
            text: "   ".to_string(),
        };

        assert!(form.clean().unwrap_err().contains("text"));
    }

    #[test]
    fn test_profile_form_rejects_bad_username_and_email() {
        let form = ProfileForm {
            username: "has space".to_string(),
            email: "not-an-email".to_string(),
            ..Default::default()
        };

        let errors = form.clean().unwrap_err();

        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
    }

    #[test]
    fn test_password_change_requires_match() {
        let form = PasswordChangeForm {
            password1: "correct horse".to_string(),
            password2: "battery staple".to_string(),
        };
        assert!(form.clean().unwrap_err().contains("password1"));

        let form = PasswordChangeForm {
            password1: "correct horse".to_string(),
            password2: "correct horse".to_string(),
        };
        assert_eq!(form.clean().unwrap(), "correct horse");
    }
}
