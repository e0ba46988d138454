pub mod response;
pub mod tokens_api;

pub use response::ApiResponse;
pub use tokens_api::{create_tokens_router, handle_not_found, health_check, TokensApiState};
