use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ModelId;

/// A model object that a creation request proposes to add. The id is fresh;
/// the object only enters the model when the resulting command executes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatedObject {
    pub id: ModelId,
    pub object_type: String,
}

/// Produces new objects for creation requests (palette entries, paste, ...).
pub trait CreationFactory: fmt::Debug {
    fn new_object(&self) -> CreatedObject;

    fn object_type(&self) -> &str;
}

/// A factory that hands out fresh objects of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleFactory {
    object_type: String,
}

impl SimpleFactory {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
        }
    }
}

impl CreationFactory for SimpleFactory {
    fn new_object(&self) -> CreatedObject {
        CreatedObject {
            id: ModelId::new(),
            object_type: self.object_type.clone(),
        }
    }

    fn object_type(&self) -> &str {
        &self.object_type
    }
}
