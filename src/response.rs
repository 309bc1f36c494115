use serde::{Deserialize, Serialize};

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub total: u64,
    pub page: u64,
    pub last_page: u64,
}

impl Meta {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            last_page: total.div_ceil(limit),
        }
    }
}

/// Body shape for failed commands: `{status, message}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u32,
    pub message: String,
}
