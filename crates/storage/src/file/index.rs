use std::{collections::HashMap, sync::Arc};

use models::Object;
use tokio::sync::RwLock;

/// Live entities keyed by `"Kind.id"`, shared by everything holding the handle.
pub type ObjectIndex = Arc<RwLock<HashMap<String, Object>>>;

pub fn new_index() -> ObjectIndex {
    Arc::new(RwLock::new(HashMap::new()))
}
