//! Data Transfer Objects for REST request/response serialization.
//!
//! Coin amounts are serialized as decimal strings to prevent precision
//! loss; USD values are plain JSON numbers.

pub mod common_dto;
pub mod event_dto;
pub mod identify_dto;
pub mod stats_dto;
pub mod swap_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use identify_dto::*;
pub use stats_dto::*;
pub use swap_dto::*;
