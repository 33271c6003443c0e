use std::sync::Arc;

use axum::http::Extensions;

use crate::error::AppError;

/// Slot wrapper so resolved values never collide with other extensions
/// of the same type.
struct Resolved<T>(Arc<T>);

impl<T> Clone for Resolved<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Store a resolved value for the rest of the request.
///
/// Each type can be written once per request; a second write means two
/// stages claim the same slot and is reported as an internal error.
pub fn publish<T>(extensions: &mut Extensions, value: T) -> Result<(), AppError>
where
    T: Send + Sync + 'static,
{
    if extensions.get::<Resolved<T>>().is_some() {
        return Err(AppError::Internal {
            message: "Internal error resolving request.".into(),
            detail: Some(format!(
                "developer error: {} resolved twice",
                std::any::type_name::<T>()
            )),
        });
    }
    extensions.insert(Resolved(Arc::new(value)));
    Ok(())
}

pub fn lookup<T>(extensions: &Extensions) -> Option<&T>
where
    T: Send + Sync + 'static,
{
    extensions.get::<Resolved<T>>().map(|r| r.0.as_ref())
}

/// Read a value a previous stage must have resolved.
///
/// # Panics
/// When `stage` is not installed ahead of the caller.
pub fn require<'a, T>(extensions: &'a Extensions, stage: &str) -> &'a T
where
    T: Send + Sync + 'static,
{
    match lookup::<T>(extensions) {
        Some(value) => value,
        None => panic!("developer error: {stage} middleware not provided"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Thing(u8);

    #[test]
    fn publish_then_lookup() {
        let mut ext = Extensions::new();
        assert!(lookup::<Thing>(&ext).is_none());
        publish(&mut ext, Thing(1)).unwrap();
        assert_eq!(lookup::<Thing>(&ext), Some(&Thing(1)));
    }

    #[test]
    fn second_publish_is_rejected_and_keeps_first() {
        let mut ext = Extensions::new();
        publish(&mut ext, Thing(1)).unwrap();
        assert!(publish(&mut ext, Thing(2)).is_err());
        assert_eq!(require::<Thing>(&ext, "thing"), &Thing(1));
    }

    #[test]
    fn plain_extension_of_same_type_is_not_a_resolved_value() {
        let mut ext = Extensions::new();
        ext.insert(String::from("raw"));
        assert!(lookup::<String>(&ext).is_none());
    }

    #[test]
    #[should_panic(expected = "developer error: organization param middleware not provided")]
    fn require_before_resolution_panics() {
        let ext = Extensions::new();
        let _ = require::<Thing>(&ext, "organization param");
    }
}
