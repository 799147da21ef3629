//! Shared query parameter types for API handlers.

use serde::Deserialize;
use tessera_core::pagination::Page;

/// Page-number pagination parameters (`?page=&page_size=`).
///
/// Kept as raw strings so that a non-numeric value falls back to the default
/// instead of rejecting the request. Resolve with [`PageParams::page`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> Page {
        Page::from_query(self.page.as_deref(), self.page_size.as_deref())
    }
}

/// Query parameters for the room WebSocket (`?room=`).
#[derive(Debug, Deserialize)]
pub struct RoomParams {
    pub room: Option<String>,
}
