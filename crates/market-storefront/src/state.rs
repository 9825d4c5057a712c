//! Shared handler state.

use market_data::GraphQlClient;

#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the shop API.
    pub shop: GraphQlClient,
}

impl AppState {
    pub fn new(shop: GraphQlClient) -> Self {
        Self { shop }
    }
}
