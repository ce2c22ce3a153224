//! Field format rules for user records.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::user::User;

pub const USERNAME_MIN_LENGTH: usize = 5;
pub const USERNAME_MAX_LENGTH: usize = 25;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 25;

/// Symbols a password must draw at least one character from.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%&?+.,*^-_=<>[](){}";

pub const PASSWORD_POLICY_MESSAGE: &str = "Password must be between 8 and 25 characters, \
     contain upper and lower case, at least one number, and at least one symbol from !@#$%&?+.,*^-_=<>[](){}";

/// North American number, optional extension of up to five digits.
/// Only ASCII whitespace may precede the extension.
static US_PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\([0-9]{3}\) [0-9]{3}-[0-9]{4}((?-u:\s)?x[0-9]{1,5})?$").unwrap()
});

/// Minimal check: exactly one `@`.
pub fn validate_email(email: &str) -> bool {
    email.split('@').count() == 2
}

pub fn validate_telephone(phone: &str) -> bool {
    US_PHONE_PATTERN.is_match(phone)
}

pub fn validate_username(username: &str) -> bool {
    (USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&username.chars().count())
        && username.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_password_special(c: char) -> bool {
    PASSWORD_SPECIAL_CHARS.contains(c)
}

pub fn validate_password(password: &str) -> bool {
    let length = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
        return false;
    }

    let mut upper = false;
    let mut lower = false;
    let mut digit = false;
    let mut special = false;
    for c in password.chars() {
        match c {
            'A'..='Z' => upper = true,
            'a'..='z' => lower = true,
            '0'..='9' => digit = true,
            c if is_password_special(c) => special = true,
            // anything else is outside the allowed alphabet
            _ => return false,
        }
    }

    upper && lower && digit && special
}

/// Checks every field except the password and returns one message per
/// violated rule, in field order. Empty means valid.
pub fn validate(user: &User) -> Vec<String> {
    let mut errors = Vec::new();

    if user.first_name.is_empty() {
        errors.push("FirstName is not specified!".to_string());
    }

    if user.last_name.is_empty() {
        errors.push("LastName is not specified!".to_string());
    }

    if user.email.is_empty() {
        errors.push("Email is not specified!".to_string());
    } else if !validate_email(&user.email) {
        errors.push("Invalid Email specified!".to_string());
    }

    if user.telephone.is_empty() {
        errors.push("Telephone is not specified!".to_string());
    } else if !validate_telephone(&user.telephone) {
        errors.push("Invalid Telephone specified! Accepts (###) ###-####[[ ]x#####]".to_string());
    }

    if user.username.is_empty() {
        errors.push("Username is not specified!".to_string());
    } else if !validate_username(&user.username) {
        errors.push(
            "Invalid Username: must be between 5 and 25 characters and be only alphanumeric"
                .to_string(),
        );
    }

    errors
}
