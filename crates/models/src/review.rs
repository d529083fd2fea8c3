use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{attrs, base::BaseModel, errors::ModelError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub base: BaseModel,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

impl Review {
    pub fn new(place_id: &str, user_id: &str, text: &str) -> Result<Self, ModelError> {
        let review = Self {
            base: BaseModel::new(),
            place_id: place_id.to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
        };
        review.validate()?;
        Ok(review)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        attrs::non_empty("place_id", &self.place_id)?;
        attrs::non_empty("user_id", &self.user_id)?;
        attrs::non_empty("text", &self.text)
    }

    pub(crate) fn assign(&mut self, key: &str, value: &Value) -> Result<(), ModelError> {
        if key == "text" {
            self.text = attrs::string(key, value)?;
        }
        Ok(())
    }
}
