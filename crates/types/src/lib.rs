//! Record types shared by the paddock registry, TUI and CLI.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sex of a horse. Mothers must be female, fathers male.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    Female,
    Male,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Female => f.write_str("female"),
            Sex::Male => f.write_str("male"),
        }
    }
}

/// An owner record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Owner {
    /// `"first last"`, the label owners are searched and displayed by.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A horse record. Parents are referenced by id; the registry resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Horse {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_id: Option<i64>,
}

/// Which parent slot a horse is being chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRole {
    Mother,
    Father,
}

impl ParentRole {
    /// The sex a horse must have to fill this slot.
    pub fn required_sex(self) -> Sex {
        match self {
            ParentRole::Mother => Sex::Female,
            ParentRole::Father => Sex::Male,
        }
    }
}
