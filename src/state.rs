use std::sync::Arc;

use crate::{products::ProductLookup, store::OrderStore};

/// Handles the service layer works against. Both the store and the product
/// lookup port are constructed at startup and injected here.
#[derive(Clone)]
pub struct AppState {
    pub store: OrderStore,
    pub products: Arc<dyn ProductLookup>,
    pub default_page_limit: u64,
}
