// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use warden_core::{LoginRequest, RegisterRequest};

use crate::error::ApiResult;
use crate::extractors::{OptionalAuth, ValidatedJson};
use crate::response::{AuthResponse, ProfileResponse};
use crate::state::AppState;

/// Permissions required to read one's own profile.
pub const PROFILE_READ: &[&str] = &["read:profile"];

// =============================================================================
// Register
// =============================================================================

/// POST /api/v1/auth/register
///
/// Creates a user and returns a token. Responds 201 on success.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.auth().register(request).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(outcome))))
}

// =============================================================================
// Login
// =============================================================================

/// POST /api/v1/auth/login
///
/// Authenticates a user by email and password and returns a token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.auth().login(request).await?;
    Ok(Json(AuthResponse::from(outcome)))
}

// =============================================================================
// Profile
// =============================================================================

/// GET /api/v1/auth/profile
///
/// Returns the caller's profile. Requires `read:profile`.
pub async fn profile(
    State(state): State<AppState>,
    OptionalAuth(ctx): OptionalAuth,
) -> ApiResult<impl IntoResponse> {
    state.auth().authorize_request(ctx.as_ref(), PROFILE_READ)?;

    // authorize_request only succeeds with a context present.
    let user = ctx
        .as_ref()
        .map(|ctx| state.auth().get_profile(ctx))
        .ok_or(warden_core::AuthError::AuthenticationRequired)?;

    Ok(Json(ProfileResponse { user }))
}
