//! API Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ballot_core::VoteError;
use serde_json::json;
use thiserror::Error;

use crate::registry::RegistryError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("Missing data")]
    MissingData,

    #[error("Could not verify")]
    InvalidCredentials,

    #[error("Token is missing")]
    MissingToken,

    #[error("Token is invalid")]
    InvalidToken,

    #[error("Admin privileges required")]
    AdminRequired,

    #[error("Voter ID already registered")]
    DuplicateVoter,

    #[error("You have already voted")]
    AlreadyVoted,

    #[error("Candidate ID is missing")]
    MissingCandidate,

    #[error("No votes to mine")]
    NoPendingVotes,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::MissingData => (StatusCode::BAD_REQUEST, "missing_data"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "token_missing"),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "token_invalid"),
            ApiError::AdminRequired => (StatusCode::FORBIDDEN, "admin_required"),
            ApiError::DuplicateVoter => (StatusCode::CONFLICT, "voter_exists"),
            ApiError::AlreadyVoted => (StatusCode::FORBIDDEN, "already_voted"),
            ApiError::MissingCandidate => (StatusCode::BAD_REQUEST, "candidate_missing"),
            ApiError::NoPendingVotes => (StatusCode::BAD_REQUEST, "no_pending_votes"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": error_type,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateVoterId => ApiError::DuplicateVoter,
            RegistryError::UnknownVoter => ApiError::InvalidToken,
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(_: VoteError) -> Self {
        ApiError::MissingData
    }
}
