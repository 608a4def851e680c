//! Response bodies shared across HTTP handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confirmation body returned by mutating endpoints.
///
/// Example JSON: `{"message":"Person created!"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Person created!")]
    pub message: String,
}

impl MessageResponse {
    /// Build a confirmation body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
