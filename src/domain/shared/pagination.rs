use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationRequest {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}
