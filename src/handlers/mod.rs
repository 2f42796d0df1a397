pub mod attachments;
pub mod certificates;
pub mod orders;
pub mod vehicles;
pub mod warranties;

// Re-export AppState so handler modules can import it as
// crate::handlers::AppState
pub use crate::AppState;
