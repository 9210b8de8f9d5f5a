use crate::auth;
use crate::registry::sha256_hex;
use crate::{ApiError, ApiResult, ApiState};
use axum::http::{HeaderMap, StatusCode};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use ballot_core::{Block, Ledger, Vote};
use serde::{Deserialize, Serialize};

pub fn create_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Voter endpoints
        .route("/register", post(register_voter))
        .route("/login", post(login))
        .route("/vote", post(cast_vote))
        // Admin endpoints
        .route("/admin-login", post(admin_login))
        .route("/admin/results", get(get_results))
        .route("/admin/mine", post(mine_block))
        // Chain read endpoints
        .route("/chain", get(get_chain))
        .route("/chain/validate", get(validate_chain))
}

async fn root() -> &'static str {
    "ballot-chain API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
}

async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    name: String,
    voter_id: String,
    password: String,
}

async fn register_voter(
    State(state): State<ApiState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    if req.name.is_empty() || req.voter_id.is_empty() || req.password.is_empty() {
        return Err(ApiError::MissingData);
    }

    let mut voters = state.voters.write().await;
    voters.register(&req.name, &req.voter_id, &req.password)?;
    tracing::info!("registered voter {}", req.voter_id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "New voter registered".to_string(),
        }),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    voter_id: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

async fn login(
    State(state): State<ApiState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if req.voter_id.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let voters = state.voters.read().await;
    if !voters.verify_password(&req.voter_id, &req.password) {
        return Err(ApiError::InvalidCredentials);
    }
    drop(voters);

    let token = auth::issue_voter_token(&state.jwt_secret, &req.voter_id)?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminLoginRequest {
    admin_id: String,
    password: String,
}

async fn admin_login(
    State(state): State<ApiState>,
    Json(req): Json<AdminLoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if req.admin_id != state.admin.admin_id
        || sha256_hex(&req.password) != state.admin.password_hash
    {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::issue_admin_token(&state.jwt_secret)?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest {
    candidate_id: String,
}

#[derive(Debug, Serialize)]
struct VoteResponse {
    message: String,
    block_index: u64,
}

async fn cast_vote(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let voter_id = auth::require_voter(&state, &headers)?;
    if req.candidate_id.is_empty() {
        return Err(ApiError::MissingCandidate);
    }

    let mut voters = state.voters.write().await;
    let voter = voters.lookup(&voter_id).ok_or(ApiError::InvalidToken)?;
    if voter.has_voted {
        return Err(ApiError::AlreadyVoted);
    }

    let vote = Vote::new(sha256_hex(&voter_id), req.candidate_id)?;

    // One write lock across submit and seal; a concurrent vote cannot land
    // between the snapshot and the pending-buffer reset.
    let mut ledger = state.ledger.write().await;
    ledger.submit_vote(vote);
    let proof = ledger.last_block().proof + 1;
    let block = ledger.seal_block(proof);
    drop(ledger);

    voters.mark_voted(&voter_id)?;
    tracing::info!("vote sealed into block {}", block.index);

    Ok(Json(VoteResponse {
        message: "Vote cast successfully and added to the chain".to_string(),
        block_index: block.index,
    }))
}

#[derive(Debug, Serialize)]
struct CandidateResult {
    candidate_id: String,
    name: String,
    votes: u64,
    percentage: f64,
}

#[derive(Debug, Serialize)]
struct ResultsResponse {
    chain: Vec<Block>,
    length: usize,
    total_votes: u64,
    vote_results: Vec<CandidateResult>,
    pending_votes: usize,
}

async fn get_results(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<ResultsResponse>> {
    auth::require_admin(&state, &headers)?;

    let ledger = state.ledger.read().await;
    let tally = ledger.tally();
    let total_votes: u64 = tally.values().sum();

    let mut vote_results: Vec<CandidateResult> = tally
        .into_iter()
        .map(|(candidate_id, votes)| CandidateResult {
            name: state
                .candidates
                .get(&candidate_id)
                .cloned()
                .unwrap_or_else(|| candidate_id.clone()),
            percentage: if total_votes > 0 {
                (votes as f64 / total_votes as f64 * 10_000.0).round() / 100.0
            } else {
                0.0
            },
            candidate_id,
            votes,
        })
        .collect();
    vote_results.sort_by(|a, b| b.votes.cmp(&a.votes));

    Ok(Json(ResultsResponse {
        chain: ledger.chain().to_vec(),
        length: ledger.chain().len(),
        total_votes,
        vote_results,
        pending_votes: ledger.pending().len(),
    }))
}

#[derive(Debug, Serialize)]
struct MineResponse {
    message: String,
    index: u64,
    votes: Vec<Vote>,
    proof: u64,
    previous_hash: String,
}

async fn mine_block(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<MineResponse>> {
    auth::require_admin(&state, &headers)?;

    let mut ledger = state.ledger.write().await;
    if ledger.pending().is_empty() {
        return Err(ApiError::NoPendingVotes);
    }

    let proof = ledger.last_block().proof + 1;
    let block = ledger.seal_block(proof);
    tracing::info!("mined block {} with {} vote(s)", block.index, block.votes.len());

    Ok(Json(MineResponse {
        message: "New block mined".to_string(),
        index: block.index,
        votes: block.votes,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

#[derive(Serialize)]
struct ChainResponse {
    chain: Vec<Block>,
    length: usize,
}

async fn get_chain(State(state): State<ApiState>) -> ApiResult<Json<ChainResponse>> {
    let ledger = state.ledger.read().await;
    Ok(Json(ChainResponse {
        chain: ledger.chain().to_vec(),
        length: ledger.chain().len(),
    }))
}

#[derive(Serialize)]
struct ValidateResponse {
    valid: bool,
}

async fn validate_chain(State(state): State<ApiState>) -> ApiResult<Json<ValidateResponse>> {
    let ledger = state.ledger.read().await;
    Ok(Json(ValidateResponse {
        valid: Ledger::is_chain_valid(ledger.chain()),
    }))
}
