use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{attrs, base::BaseModel, errors::ModelError};

/// A rentable place. `amenity_ids` is the many-to-many edge list; it never
/// holds the same amenity twice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(flatten)]
    pub base: BaseModel,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_rooms: i32,
    #[serde(default)]
    pub number_bathrooms: i32,
    #[serde(default)]
    pub max_guest: i32,
    #[serde(default)]
    pub price_by_night: i32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "attrs::unique_ids")]
    pub amenity_ids: Vec<String>,
}

impl Place {
    pub fn new(city_id: &str, user_id: &str, name: &str) -> Result<Self, ModelError> {
        let place = Self {
            base: BaseModel::new(),
            city_id: city_id.to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: None,
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: None,
            longitude: None,
            amenity_ids: Vec::new(),
        };
        place.validate()?;
        Ok(place)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        attrs::non_empty("city_id", &self.city_id)?;
        attrs::non_empty("user_id", &self.user_id)?;
        attrs::non_empty("name", &self.name)
    }

    /// Add an amenity edge; returns false if it was already present.
    pub fn add_amenity(&mut self, amenity_id: &str) -> bool {
        if self.amenity_ids.iter().any(|id| id == amenity_id) {
            return false;
        }
        self.amenity_ids.push(amenity_id.to_string());
        true
    }

    /// Remove an amenity edge; returns false if there was none.
    pub fn remove_amenity(&mut self, amenity_id: &str) -> bool {
        let before = self.amenity_ids.len();
        self.amenity_ids.retain(|id| id != amenity_id);
        self.amenity_ids.len() != before
    }

    /// `city_id` and `user_id` are fixed after creation.
    pub(crate) fn assign(&mut self, key: &str, value: &Value) -> Result<(), ModelError> {
        match key {
            "name" => self.name = attrs::string(key, value)?,
            "description" => self.description = attrs::opt_string(key, value)?,
            "number_rooms" => self.number_rooms = attrs::int(key, value)?,
            "number_bathrooms" => self.number_bathrooms = attrs::int(key, value)?,
            "max_guest" => self.max_guest = attrs::int(key, value)?,
            "price_by_night" => self.price_by_night = attrs::int(key, value)?,
            "latitude" => self.latitude = attrs::opt_float(key, value)?,
            "longitude" => self.longitude = attrs::opt_float(key, value)?,
            "amenity_ids" => self.amenity_ids = attrs::string_list(key, value)?,
            _ => {}
        }
        Ok(())
    }
}
