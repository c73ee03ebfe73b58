//! Customer entity

use serde::{Deserialize, Serialize};

use super::validation::{validate_email, validate_name, validate_phone, ValidationError};
use super::Identified;

/// Customer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Identified for Customer {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Customer creation payload as received from a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl CustomerInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<&str>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.map(str::to_string),
        }
    }

    /// Check field-level rules. Email uniqueness needs the store and is
    /// checked inside the unit of work.
    pub fn validate(&self) -> Result<NewCustomer, ValidationError> {
        Ok(NewCustomer {
            name: validate_name("name", &self.name)?,
            email: validate_email(&self.email)?,
            phone: validate_phone(self.phone.as_deref())?,
        })
    }
}

/// Validated customer, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewCustomer {
    pub fn into_customer(self, id: i64) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
        }
    }
}
