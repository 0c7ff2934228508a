//! Filter expressions for document queries

/// Render an equality filter value, `eq.<value>`
pub(crate) fn eq<T: ToString>(value: T) -> String {
    format!("eq.{}", value.to_string())
}
