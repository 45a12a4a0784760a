//! Identify endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query for `GET /identify`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdentifyQuery {
    /// Swap identifier.
    pub uuid: String,
    /// Coin traded by the participant to identify.
    pub ticker: String,
}

/// Response body for `GET /identify`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdentifyResponse {
    /// Keyed hash of the matching leg's pubkey.
    pub pubkey_hash: String,
}
