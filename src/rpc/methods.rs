//! RPC Method Implementations
//!
//! Each method corresponds to a JSON-RPC call that external apps can make.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{DEFAULT_MATCH_LIMIT, SERVICE_MATCH_LIMIT};
use crate::matching::{predict_outcome, MatchRanker};
use crate::records::{Donor, RecipientRequest};
use crate::service::{InMemoryDonorPool, MatchingService};

const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// JSON-RPC Error
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message }),
            id,
        }
    }
}

/// RPC Handler State
pub struct RpcState {
    pub service: MatchingService<InMemoryDonorPool>,
    /// Ranker for the stateless `rankmatches` call
    pub ranker: MatchRanker,
}

impl RpcState {
    pub fn new(service: MatchingService<InMemoryDonorPool>) -> Self {
        Self {
            service,
            ranker: MatchRanker::new(DEFAULT_MATCH_LIMIT),
        }
    }
}

/// Process a JSON-RPC request and return a response
pub fn handle_request(state: &RpcState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::error(id, INVALID_REQUEST, "Unsupported jsonrpc version".into());
    }

    let result = match request.method.as_str() {
        "rankmatches" => rank_matches(state, request.params),
        "findmatches" => find_matches(state, request.params),
        "createrequest" => create_request(state, request.params),
        "registerdonor" => register_donor(state, request.params),
        "claimdonor" => claim_donor(state, request.params),
        "predictoutcome" => predict(state, request.params),
        "verifychain" => Ok(json!(state.service.audit().verify_chain())),
        "getchainreport" => to_result(state.service.audit().chain_report()),
        "getchain" => to_result(state.service.audit().chain()),
        "getblockcount" => to_result(state.service.audit().chain().map(|c| c.len())),
        "getinfo" => get_info(state),
        _ => Err((METHOD_NOT_FOUND, format!("Method not found: {}", request.method))),
    };

    match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err((code, message)) => JsonRpcResponse::error(id, code, message),
    }
}

pub(crate) type MethodResult = Result<Value, (i32, String)>;

fn to_value<T: Serialize>(value: T) -> MethodResult {
    serde_json::to_value(value).map_err(|e| (INTERNAL_ERROR, e.to_string()))
}

fn to_result<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> MethodResult {
    result
        .map_err(|e| (INTERNAL_ERROR, e.to_string()))
        .and_then(to_value)
}

fn parse<T: DeserializeOwned>(params: Option<Value>) -> Result<T, (i32, String)> {
    let params = params.ok_or((INVALID_PARAMS, "Missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| (INVALID_PARAMS, format!("Invalid params: {e}")))
}

#[derive(Deserialize)]
struct RankParams {
    recipient: RecipientRequest,
    #[serde(default)]
    donors: Vec<Donor>,
    urgency: Option<String>,
    limit: Option<usize>,
}

/// Rank a caller-supplied donor pool for a recipient
/// Params: {recipient, donors, urgency?, limit?}
fn rank_matches(state: &RpcState, params: Option<Value>) -> MethodResult {
    let p: RankParams = parse(params)?;
    let urgency = p
        .urgency
        .as_deref()
        .unwrap_or_else(|| p.recipient.urgency_or_default());
    let limit = p.limit.unwrap_or(state.ranker.default_limit());
    to_value(state.ranker.rank_matches(&p.donors, &p.recipient, urgency, limit))
}

#[derive(Deserialize)]
struct RequestParams {
    request: RecipientRequest,
    limit: Option<usize>,
}

/// Match a request against the node's donor pool
/// Params: {request, limit?}
fn find_matches(state: &RpcState, params: Option<Value>) -> MethodResult {
    let p: RequestParams = parse(params)?;
    let limit = p.limit.unwrap_or(SERVICE_MATCH_LIMIT);
    to_result(state.service.find_matches(&p.request, limit))
}

/// Params: {request}
fn create_request(state: &RpcState, params: Option<Value>) -> MethodResult {
    let p: RequestParams = parse(params)?;
    to_result(state.service.create_request(p.request))
}

#[derive(Deserialize)]
struct DonorParams {
    donor: Donor,
}

/// Params: {donor}
fn register_donor(state: &RpcState, params: Option<Value>) -> MethodResult {
    let p: DonorParams = parse(params)?;
    to_result(state.service.register_donor(p.donor))
}

/// Params: [donor_id] or "donor_id"
fn claim_donor(state: &RpcState, params: Option<Value>) -> MethodResult {
    let donor_id = match params {
        Some(Value::Array(arr)) if !arr.is_empty() => arr[0].as_str().map(str::to_string),
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
    .ok_or((INVALID_PARAMS, "Invalid params: expected donor id".to_string()))?;

    to_result(state.service.claim_donor(&donor_id))
}

#[derive(Deserialize)]
struct OutcomeParams {
    donor: Donor,
    recipient: RecipientRequest,
    match_score: Option<f64>,
}

/// Params: {donor, recipient, match_score?}
fn predict(state: &RpcState, params: Option<Value>) -> MethodResult {
    let p: OutcomeParams = parse(params)?;
    let score = match p.match_score {
        Some(score) => score,
        None => {
            let urgency = p.recipient.urgency_or_default();
            state.ranker.score(&p.donor, &p.recipient, urgency).0
        }
    };
    to_value(predict_outcome(&p.donor, &p.recipient, score))
}

/// Returns general node information
pub(crate) fn get_info(state: &RpcState) -> MethodResult {
    let audit = state.service.audit();
    let report = audit.chain_report().map_err(|e| (INTERNAL_ERROR, e.to_string()))?;
    let donors = state
        .service
        .pool()
        .all()
        .map_err(|e| (INTERNAL_ERROR, e.to_string()))?;

    Ok(json!({
        "name": "lifelink",
        "version": env!("CARGO_PKG_VERSION"),
        "blocks": report.length,
        "tip": report.tip_hash.map(|h| h.to_hex()),
        "chain_valid": report.is_valid,
        "donors": donors.len(),
        "available_donors": donors.iter().filter(|d| d.is_available()).count(),
    }))
}
