use crate::newtypes::CommentId;
use serde::{Deserialize, Deserializer};

/// The backend sends `null` for empty collections and omits unset fields, treat both as the
/// default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Root comments come with `parent_id` set to `0`, `null` or missing entirely.
pub fn parent_id<'de, D>(deserializer: D) -> Result<Option<CommentId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<i64>::deserialize(deserializer)?;
    Ok(id.filter(|id| *id != 0).map(CommentId))
}
