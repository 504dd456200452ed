use thiserror::Error;

/// Result type for object adapter operations
pub type Result<T> = std::result::Result<T, ObjectError>;

/// Errors returned by object adapters to the host.
///
/// Messages are user-facing: the host shows them as-is.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// The external API returned nothing for this id
    #[error("Unable to load Order/Invoice ({0}).")]
    LoadFailed(String),

    /// Orders are never created from the host
    #[error("Splash API Cannot Create Shopify Orders!")]
    CreateForbidden,

    /// Orders are never modified from the host
    #[error("Splash API Cannot Update Shopify Orders!")]
    UpdateForbidden,

    /// Orders are never deleted from the host
    #[error("Splash API Cannot Delete Shopify Orders!")]
    DeleteForbidden,

    /// No object is loaded, or the loaded one has no id
    #[error("Object has no identifier")]
    MissingIdentifier,

    /// A listed record carries a timestamp that cannot be parsed
    #[error("Invalid {field} timestamp on record {id}: {value:?}")]
    InvalidTimestamp {
        id: String,
        field: String,
        value: String,
    },

    /// Transport or decoding failure talking to the external API
    #[error("External API error: {0}")]
    Api(#[from] anyhow::Error),
}
