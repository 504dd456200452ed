//! Encrypted storage for connector configuration parameters.
//!
//! Each configured connector instance (a "webservice") owns a flat set of
//! named string parameters: the shop URL, the OAuth client credentials, the
//! access token obtained at the end of the authorization flow. Values are
//! encrypted at rest with AES-256-GCM and stored in SQLite.
//!
//! ```text
//! Connector::update_configuration()
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       ParameterStore                     │
//! │  - save / load per webservice id         │
//! └─────────────────────────────────────────┘
//!          ↓                    ↑
//!        (seal)               (open)
//!          ↓                    ↑
//! ┌─────────────────────────────────────────┐
//! │       SQLite Database                    │
//! └─────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

mod cipher;
mod storage;

pub use cipher::ParameterCipher;
pub use storage::ParameterStore;

/// Named parameters of one connector instance, ordered by name.
pub type Parameters = BTreeMap<String, String>;

/// Parameter holding the OAuth access token.
pub const TOKEN_PARAMETER: &str = "Token";
