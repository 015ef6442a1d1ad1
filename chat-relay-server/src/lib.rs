pub mod error;
pub mod gateway;
pub mod handlers;
pub mod server;
pub mod session;
pub mod state;

pub use error::ChatError;
pub use gateway::{ChatGateway, ChatOutcome};
pub use server::{build_router, run_server};
pub use state::AppState;
