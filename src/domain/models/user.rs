use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Store-assigned identifier. `0` means "not persisted yet".
pub type UserId = i32;

pub const UNSET_ID: UserId = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    /// Plaintext on the way in, encoded hash once handled. Never serialized.
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, rename = "firstname")]
    pub first_name: String,
    #[serde(default, rename = "middlename")]
    pub middle_name: Option<String>,
    #[serde(default, rename = "lastname")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telephone: String,
}

impl User {
    pub fn is_persisted(&self) -> bool {
        self.id != UNSET_ID
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    /// Drops whatever is in the credential field before the user leaves the core.
    pub fn clear_password(&mut self) {
        self.password.clear();
    }
}

/// Columns a user lookup may filter on. `All` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    All,
    Id,
    Username,
    FirstName,
    MiddleName,
    LastName,
    Email,
    Telephone,
}

impl UserField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::All => "all",
            UserField::Id => "id",
            UserField::Username => "username",
            UserField::FirstName => "firstname",
            UserField::MiddleName => "middlename",
            UserField::LastName => "lastname",
            UserField::Email => "email",
            UserField::Telephone => "telephone",
        }
    }
}

impl FromStr for UserField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(UserField::All),
            "id" => Ok(UserField::Id),
            "username" => Ok(UserField::Username),
            "firstname" => Ok(UserField::FirstName),
            "middlename" => Ok(UserField::MiddleName),
            "lastname" => Ok(UserField::LastName),
            "email" => Ok(UserField::Email),
            "telephone" => Ok(UserField::Telephone),
            other => Err(DomainError::InvalidInput(format!(
                "Unsupported search field |{}|",
                other
            ))),
        }
    }
}

/// A resolved lookup: which column to match and the typed value to match it against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Id(UserId),
    Username(String),
    FirstName(String),
    MiddleName(String),
    LastName(String),
    Email(String),
    Telephone(String),
}

impl UserFilter {
    pub fn new(field: UserField, value: &str) -> Result<Self, DomainError> {
        let value = value.to_string();
        Ok(match field {
            UserField::All => UserFilter::All,
            UserField::Id => UserFilter::Id(value.trim().parse().map_err(|_| {
                DomainError::InvalidInput(format!("Invalid ID {}", value))
            })?),
            UserField::Username => UserFilter::Username(value),
            UserField::FirstName => UserFilter::FirstName(value),
            UserField::MiddleName => UserFilter::MiddleName(value),
            UserField::LastName => UserFilter::LastName(value),
            UserField::Email => UserFilter::Email(value),
            UserField::Telephone => UserFilter::Telephone(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_filter_requires_an_integer() {
        assert_eq!(UserFilter::new(UserField::Id, "42").unwrap(), UserFilter::Id(42));
        assert!(matches!(
            UserFilter::new(UserField::Id, "forty-two"),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn all_filter_ignores_value() {
        assert_eq!(
            UserFilter::new(UserField::All, "whatever").unwrap(),
            UserFilter::All
        );
        assert_eq!(
            UserFilter::new(UserField::Email, "bob@bob.win").unwrap(),
            UserFilter::Email("bob@bob.win".to_string())
        );
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: 7,
            username: "johnny005".to_string(),
            password: "goodPass034!!".to_string(),
            first_name: "John".to_string(),
            middle_name: None,
            last_name: "Doe".to_string(),
            email: "john@doe.com".to_string(),
            telephone: "(555) 555-5555".to_string(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["firstname"], "John");
        assert_eq!(json["lastname"], "Doe");
        assert!(json["middlename"].is_null());
    }

    #[test]
    fn password_is_accepted_on_input() {
        let user: User = serde_json::from_str(
            r#"{"username":"johnny005","password":"goodPass034!!","firstname":"John","lastname":"Doe","email":"john@doe.com","telephone":"(555) 555-5555"}"#,
        )
        .unwrap();

        assert_eq!(user.id, UNSET_ID);
        assert!(!user.is_persisted());
        assert_eq!(user.password, "goodPass034!!");
        assert_eq!(user.middle_name, None);
    }

    #[test]
    fn parses_whitelisted_fields_only() {
        for name in [
            "all",
            "id",
            "username",
            "firstname",
            "middlename",
            "lastname",
            "email",
            "telephone",
        ] {
            let field: UserField = name.parse().unwrap();
            assert_eq!(field.as_str(), name);
        }

        assert!(matches!(
            "password_hash".parse::<UserField>(),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            "id; DROP TABLE users".parse::<UserField>(),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
