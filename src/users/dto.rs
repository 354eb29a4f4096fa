use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{macros::format_description, Date};

use crate::users::repo_types::Gender;

pub const MIN_PASSWORD_CHARS: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// First rule a request broke. Rules are checked in field order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("email is required")]
    EmailRequired,
    #[error("invalid email format")]
    InvalidEmail,
    #[error("password is required")]
    PasswordRequired,
    #[error("password must be at least {} characters long", MIN_PASSWORD_CHARS)]
    PasswordTooShort,
    #[error("name is required")]
    NameRequired,
    #[error("birth_date is required")]
    BirthDateRequired,
    #[error("invalid birth_date format. Format must be YYYY-MM-DD")]
    InvalidBirthDate,
    #[error("gender must be \"MALE\", \"FEMALE\", or \"OTHER\"")]
    InvalidGender,
    #[error("location is required")]
    LocationRequired,
}

/// Request body for signup. Missing fields decode as empty strings and are
/// reported by [`SignupRequest::validate`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub birth_date: String,
    pub gender: String,
    pub location: String,
}

/// Signup input that passed validation; email already lowercased.
#[derive(Debug)]
pub struct ValidSignup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub birth_date: Date,
    pub gender: Gender,
    pub location: String,
}

fn check_email(email: &str) -> Result<String, ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email.to_lowercase())
}

impl SignupRequest {
    pub fn validate(self) -> Result<ValidSignup, ValidationError> {
        let email = check_email(&self.email)?;

        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ValidationError::PasswordTooShort);
        }

        if self.name.is_empty() {
            return Err(ValidationError::NameRequired);
        }

        if self.birth_date.is_empty() {
            return Err(ValidationError::BirthDateRequired);
        }
        let birth_date = Date::parse(&self.birth_date, format_description!("[year]-[month]-[day]"))
            .map_err(|_| ValidationError::InvalidBirthDate)?;

        let gender = self
            .gender
            .parse::<Gender>()
            .map_err(|_| ValidationError::InvalidGender)?;

        if self.location.is_empty() {
            return Err(ValidationError::LocationRequired);
        }

        Ok(ValidSignup {
            email,
            password: self.password,
            name: self.name,
            birth_date,
            gender,
            location: self.location,
        })
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> Result<ValidLogin, ValidationError> {
        let email = check_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        Ok(ValidLogin {
            email,
            password: self.password,
        })
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SignupRequest {
        SignupRequest {
            email: "valid@email.com".into(),
            password: "password".into(),
            name: "name".into(),
            birth_date: "2024-01-01".into(),
            gender: "MALE".into(),
            location: "Indonesia".into(),
        }
    }

    fn signup_err(req: SignupRequest) -> ValidationError {
        req.validate().unwrap_err()
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("user@email.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("invalid@email"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b.c"));
    }

    #[test]
    fn valid_signup_is_normalized() {
        let req = SignupRequest {
            email: "Valid@Email.COM".into(),
            gender: "male".into(),
            ..valid()
        };
        let ok = req.validate().expect("valid");
        assert_eq!(ok.email, "valid@email.com");
        assert_eq!(ok.gender, Gender::Male);
        assert_eq!(ok.birth_date, time::macros::date!(2024 - 01 - 01));
    }

    #[test]
    fn first_violation_in_field_order_wins() {
        assert_eq!(
            signup_err(SignupRequest::default()),
            ValidationError::EmailRequired
        );
        assert_eq!(
            signup_err(SignupRequest {
                email: "invalid@email".into(),
                password: String::new(),
                ..valid()
            }),
            ValidationError::InvalidEmail
        );
        assert_eq!(
            signup_err(SignupRequest {
                password: String::new(),
                name: String::new(),
                ..valid()
            }),
            ValidationError::PasswordRequired
        );
        assert_eq!(
            signup_err(SignupRequest {
                password: "pass".into(),
                ..valid()
            }),
            ValidationError::PasswordTooShort
        );
        assert_eq!(
            signup_err(SignupRequest {
                name: String::new(),
                ..valid()
            }),
            ValidationError::NameRequired
        );
        assert_eq!(
            signup_err(SignupRequest {
                birth_date: String::new(),
                ..valid()
            }),
            ValidationError::BirthDateRequired
        );
        assert_eq!(
            signup_err(SignupRequest {
                gender: String::new(),
                ..valid()
            }),
            ValidationError::InvalidGender
        );
        assert_eq!(
            signup_err(SignupRequest {
                gender: "INVALID".into(),
                ..valid()
            }),
            ValidationError::InvalidGender
        );
        assert_eq!(
            signup_err(SignupRequest {
                location: String::new(),
                ..valid()
            }),
            ValidationError::LocationRequired
        );
    }

    #[test]
    fn password_length_boundary() {
        assert!(SignupRequest {
            password: "12345678".into(),
            ..valid()
        }
        .validate()
        .is_ok());
        assert_eq!(
            signup_err(SignupRequest {
                password: "1234567".into(),
                ..valid()
            }),
            ValidationError::PasswordTooShort
        );
    }

    #[test]
    fn birth_date_must_be_iso() {
        for bad in ["01-01-2024", "2024/01/01", "2024-1-1", "2024-02-30"] {
            assert_eq!(
                signup_err(SignupRequest {
                    birth_date: bad.into(),
                    ..valid()
                }),
                ValidationError::InvalidBirthDate,
                "{bad}"
            );
        }
    }

    #[test]
    fn login_validation() {
        let empty = LoginRequest::default();
        assert_eq!(empty.validate().unwrap_err(), ValidationError::EmailRequired);

        let bad = LoginRequest {
            email: "invalid@email".into(),
            password: "password".into(),
        };
        assert_eq!(bad.validate().unwrap_err(), ValidationError::InvalidEmail);

        let no_pw = LoginRequest {
            email: "valid@email.com".into(),
            password: String::new(),
        };
        assert_eq!(no_pw.validate().unwrap_err(), ValidationError::PasswordRequired);

        let ok = LoginRequest {
            email: "VALID@email.com".into(),
            password: "x".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.email, "valid@email.com");
    }

    #[test]
    fn missing_json_fields_decode_as_empty() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert_eq!(req.password, "");
        assert_eq!(req.validate().unwrap_err(), ValidationError::PasswordRequired);
    }
}
