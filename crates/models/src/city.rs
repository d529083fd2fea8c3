use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{attrs, base::BaseModel, errors::ModelError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(flatten)]
    pub base: BaseModel,
    pub state_id: String,
    pub name: String,
}

impl City {
    pub fn new(state_id: &str, name: &str) -> Result<Self, ModelError> {
        let city = Self { base: BaseModel::new(), state_id: state_id.to_string(), name: name.to_string() };
        city.validate()?;
        Ok(city)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        attrs::non_empty("state_id", &self.state_id)?;
        attrs::non_empty("name", &self.name)
    }

    /// `state_id` is fixed after creation.
    pub(crate) fn assign(&mut self, key: &str, value: &Value) -> Result<(), ModelError> {
        if key == "name" {
            self.name = attrs::string(key, value)?;
        }
        Ok(())
    }
}
