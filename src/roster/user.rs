use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::store::schema::{FieldError, Record, Row};

pub const MAX_NAME_LEN: usize = 10;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn code(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Operator input: the full name or its first letter.
    pub fn from_input(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "a" | "admin" => Some(Role::Admin),
            "u" | "user" => Some(Role::User),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn new(name: &str, role: Role) -> Self {
        Self {
            name: name.to_string(),
            role,
        }
    }
}

impl Record for User {
    const FIELDS: &'static [&'static str] = &["Name", "Type"];

    fn from_row(row: &Row<'_>) -> Result<Self, FieldError> {
        let raw_role = row.require("Type")?;
        let role = Role::from_code(raw_role).ok_or_else(|| FieldError::Invalid {
            field: "Type",
            value: raw_role.to_string(),
        })?;
        Ok(Self {
            name: row.require("Name")?.to_string(),
            role,
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![self.name.clone(), self.role.code().to_string()]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserNameError {
    #[error("A user name cannot be empty.")]
    Empty,
    #[error("You can only use letters, numbers and underscore in a user name.")]
    InvalidCharacters,
    #[error("A user name cannot be longer than {max} characters.")]
    TooLong { max: usize },
    #[error("This user name already exists.")]
    Taken(String),
}

/// Shape check only; uniqueness is the roster's business.
pub fn validate_user_name(name: &str) -> Result<(), UserNameError> {
    if name.is_empty() {
        return Err(UserNameError::Empty);
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(UserNameError::InvalidCharacters);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(UserNameError::TooLong { max: MAX_NAME_LEN });
    }
    Ok(())
}
