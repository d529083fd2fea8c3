//! Entity model for the HBnB storage engine.
//! - `base`/`kind`: identity, timestamps and the `__class__` discriminator.
//! - One module per entity kind plus the `Object` sum type the storage layer moves around.
//! - `schema`: sea-orm row mappings used by the relational backend.

pub mod errors;
pub mod base;
pub mod kind;
pub mod attrs;
pub mod state;
pub mod city;
pub mod user;
pub mod place;
pub mod review;
pub mod amenity;
pub mod object;
pub mod schema;
pub mod db;

pub use base::BaseModel;
pub use kind::{ForeignKey, Kind};
pub use object::Object;
pub use state::State;
pub use city::City;
pub use user::User;
pub use place::Place;
pub use review::Review;
pub use amenity::Amenity;
