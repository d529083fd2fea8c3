use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{attrs, base::BaseModel, errors::ModelError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(flatten)]
    pub base: BaseModel,
    pub name: String,
}

impl State {
    pub fn new(name: &str) -> Result<Self, ModelError> {
        let state = Self { base: BaseModel::new(), name: name.to_string() };
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        attrs::non_empty("name", &self.name)
    }

    pub(crate) fn assign(&mut self, key: &str, value: &Value) -> Result<(), ModelError> {
        if key == "name" {
            self.name = attrs::string(key, value)?;
        }
        Ok(())
    }
}
