use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record type stored as one JSON array under a fixed key.
///
/// The identity returned by [`Entity::id`] is assigned by the caller; the
/// repositories never generate or check it.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Key under which the whole collection of this entity type is stored.
    const COLLECTION_KEY: &'static str;

    fn id(&self) -> &str;
}
