//! Relational row mappings, one sea-orm entity per table.
//!
//! Table and column names match the `migration` crate. Each module converts
//! between its row `Model` and the domain struct of the same kind.

pub mod states;
pub mod cities;
pub mod users;
pub mod places;
pub mod reviews;
pub mod amenities;
pub mod place_amenity;
