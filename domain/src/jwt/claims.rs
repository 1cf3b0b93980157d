//! Claims carried by the bearer tokens issued at login.
//!
//! ```rust,ignore
//! let claims = AuthClaims {
//!     sub: "8f1c...".to_string(),
//!     admin: false,
//!     iat: 1_700_000_000,
//!     exp: 1_700_086_400,
//! };
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AuthClaims {
    /// Id of the user the token was issued to
    pub(crate) sub: String,
    pub(crate) admin: bool,
    pub(crate) iat: u64,
    pub(crate) exp: u64,
}
