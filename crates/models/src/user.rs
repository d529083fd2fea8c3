use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{attrs, base::BaseModel, errors::ModelError};

/// Account owning places and reviews. Email uniqueness is not checked here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub base: BaseModel,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    pub fn new(email: &str, password: &str) -> Result<Self, ModelError> {
        let user = Self {
            base: BaseModel::new(),
            email: email.to_string(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
        };
        user.validate()?;
        Ok(user)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        attrs::non_empty("email", &self.email)?;
        attrs::non_empty("password", &self.password)
    }

    pub(crate) fn assign(&mut self, key: &str, value: &Value) -> Result<(), ModelError> {
        match key {
            "email" => self.email = attrs::string(key, value)?,
            "password" => self.password = attrs::string(key, value)?,
            "first_name" => self.first_name = attrs::opt_string(key, value)?,
            "last_name" => self.last_name = attrs::opt_string(key, value)?,
            _ => {}
        }
        Ok(())
    }
}
