//! Success envelope wrappers used by every endpoint.

use serde::Deserialize;

/// The backend's uniform `{"meta": .., "data": ..}` success wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub meta: Meta,
    pub data: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Paged collection payload (categories use this shape).
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}
