use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

impl User {
    pub fn new(name: String) -> Self {
        User {
            id: Uuid::new_v4(),
            name,
            is_active: true,
        }
    }
}
