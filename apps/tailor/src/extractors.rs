//! Request extractors whose rejections surface as `AppError` JSON bodies.

use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` with malformed or mistyped bodies reported as 400
/// `VALIDATION_ERROR` instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
