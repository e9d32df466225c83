mod routes;
mod server;
pub mod types;

pub use server::{router, ApiServer, AppState};
pub use types::{ApiResponse, DeleteResponse, ModelListResponse};
