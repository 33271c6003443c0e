//! Path parameters as seen by the resolver stages.
//!
//! The first stage captures the matched route's parameters into a
//! [`RouteParams`] extension. A stage never edits it in place: it returns
//! [`ParamOverrides`] and the harness stores the merged set for the stages
//! that follow.
use std::collections::HashMap;

use axum::{RequestExt, extract::RawPathParams, extract::Request};
use uuid::Uuid;

use crate::error::AppError;

pub const ORGANIZATION: &str = "organization";
pub const GROUP: &str = "group";
pub const USER: &str = "user";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// Parameters for this request: the merged set left by an earlier stage,
    /// or the route's own captures when this is the first stage.
    pub async fn load(req: &mut Request) -> Self {
        if let Some(params) = req.extensions().get::<RouteParams>() {
            return params.clone();
        }
        match req.extract_parts::<RawPathParams>().await {
            Ok(raw) => raw
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => Self::default(),
        }
    }

    /// Hand the parameters to the next stage.
    pub fn store(self, req: &mut Request) {
        req.extensions_mut().insert(self);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn merged(mut self, overrides: ParamOverrides) -> Self {
        for (name, value) in overrides.0 {
            self.0.insert(name.to_string(), value);
        }
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parameter values a stage publishes for later stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOverrides(Vec<(&'static str, String)>);

impl ParamOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.push((name, value.into()));
        self
    }
}

/// A stage's output: the resolved object and what it republishes.
#[derive(Debug)]
pub struct Resolution<T> {
    pub value: T,
    pub overrides: ParamOverrides,
}

/// Raw value of a required parameter.
pub fn param<'a>(params: &'a RouteParams, name: &str) -> Result<&'a str, AppError> {
    match params.get(name) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::bad_request(format!("\"{name}\" must be provided."))),
    }
}

/// A required parameter that must be a UUID.
pub fn uuid_param(params: &RouteParams, name: &str) -> Result<Uuid, AppError> {
    let raw = param(params, name)?;
    Uuid::parse_str(raw).map_err(|e| {
        AppError::bad_request_with_detail(
            format!("Invalid UUID \"{raw}\" for \"{name}\"."),
            e.to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn missing_param_is_a_client_error() {
        let params = RouteParams::default();
        let err = param(&params, ORGANIZATION).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("\"organization\" must be provided."));
    }

    #[test]
    fn empty_param_counts_as_missing() {
        let params: RouteParams = [(GROUP, "")].into_iter().collect();
        assert!(param(&params, GROUP).is_err());
    }

    #[test]
    fn malformed_uuid_names_the_parameter() {
        let params: RouteParams = [(GROUP, "not-a-uuid")].into_iter().collect();
        let err = uuid_param(&params, GROUP).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("\"group\""));
    }

    #[test]
    fn uuid_param_parses() {
        let id = Uuid::new_v4();
        let params: RouteParams = [(USER, id.to_string())].into_iter().collect();
        assert_eq!(uuid_param(&params, USER).unwrap(), id);
    }

    #[test]
    fn overrides_replace_caller_values() {
        let params: RouteParams = [(ORGANIZATION, "caller-org"), (GROUP, "g")]
            .into_iter()
            .collect();
        let merged = params.merged(ParamOverrides::none().set(ORGANIZATION, "owner-org"));
        assert_eq!(merged.get(ORGANIZATION), Some("owner-org"));
        assert_eq!(merged.get(GROUP), Some("g"));
    }
}
