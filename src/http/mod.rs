//! HTTP protocol layer module
//!
//! Provides HTTP response construction, decoupled from specific business logic.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_500_response, build_octet_response,
};
