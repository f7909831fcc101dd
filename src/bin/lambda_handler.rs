//! AWS Lambda handler for retirement and pension computations
//!
//! Accepts JSON over a Lambda Function URL. Routes:
//! - `/classify`: rank classification and retirement age for `pangkat`
//! - `/person`: full assessment of one `personnel` record
//! - `/pension`: pension breakdown for one `personnel` record
//! - `/roster`: assessments, counts, BUP summary and distribution for `roster`
//!
//! Retirement ages are loaded on every invocation from the file named by
//! `RETIREMENT_AGE_CONFIG` (built-in defaults otherwise), then overridden by an
//! optional `bupAges` object in the request.

use aws_lambda_events::event::lambda_function_urls::{
    LambdaFunctionUrlRequest, LambdaFunctionUrlResponse,
};
use chrono::NaiveDate;
use http::header::{HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use personnel_retirement::{
    classify_rank, compute_pension, config,
    personnel::{parse_record_date, Personnel},
    retirement::retirement_age_for,
    roster::{CountCategory, RosterRunner},
    RecordError, RetirementAgeConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Environment variable naming the retirement age CSV
const CONFIG_ENV: &str = "RETIREMENT_AGE_CONFIG";

/// Request body shared by all routes; each route reads the fields it needs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementRequest {
    /// Reference date (default: today)
    #[serde(default)]
    pub as_of: Option<String>,

    /// Per-request PATI age override, e.g. {"brigjen": 59}
    #[serde(default)]
    pub bup_ages: Option<BTreeMap<String, Value>>,

    #[serde(default)]
    pub pangkat: Option<String>,

    #[serde(default)]
    pub personnel: Option<Personnel>,

    #[serde(default)]
    pub roster: Vec<Personnel>,

    /// Count category for `/roster` (all, group, rank)
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub pangkat: String,
    pub group: &'static str,
    pub grade: Option<&'static str>,
    pub retirement_age: Option<u32>,
    /// Configured age for the rank group (PAMEN, PAMA, OTHER)
    pub group_age: Option<u32>,
}

fn headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    headers
}

fn response(status: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code: status,
        headers: headers(),
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn json_response(status: i64, body: &Value) -> LambdaFunctionUrlResponse {
    response(status, Some(body.to_string()))
}

fn error_response(status: i64, message: &str) -> LambdaFunctionUrlResponse {
    json_response(status, &json!({ "message": message }))
}

fn record_error_response(err: &RecordError) -> LambdaFunctionUrlResponse {
    match err {
        RecordError::MissingFields { fields } => json_response(
            400,
            &json!({ "message": err.to_string(), "missing": fields }),
        ),
        e if e.is_client_error() => error_response(400, &e.to_string()),
        e => {
            log::error!("Request failed: {}", e);
            error_response(500, &e.to_string())
        }
    }
}

/// Config for this invocation: file or defaults, then the request override
fn resolve_config(request: &RetirementRequest) -> Result<RetirementAgeConfig, RecordError> {
    let path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
    let mut age_config = config::load_or_default(path.as_deref())?;
    if let Some(updates) = &request.bup_ages {
        age_config.apply_bup_update(updates)?;
    }
    Ok(age_config)
}

fn route(
    path: &str,
    request: RetirementRequest,
    age_config: RetirementAgeConfig,
    as_of: NaiveDate,
) -> Option<Result<Value, RecordError>> {
    let result = match path {
        "/classify" => {
            let pangkat = request.pangkat.unwrap_or_default();
            let classification = classify_rank(Some(&pangkat));
            let retirement_age = retirement_age_for(Some(&pangkat), &age_config);
            serde_json::to_value(ClassifyResponse {
                group: classification.group.as_str(),
                grade: classification.grade.map(|g| g.as_str()),
                retirement_age,
                group_age: age_config.group_age(classification.group),
                pangkat,
            })
            .map_err(RecordError::from)
        }
        "/person" => {
            let person = request.personnel.unwrap_or_default();
            let runner = RosterRunner::new(age_config, as_of);
            serde_json::to_value(runner.assess(&person)).map_err(RecordError::from)
        }
        "/pension" => {
            let person = request.personnel.unwrap_or_default();
            compute_pension(&person)
                .and_then(|breakdown| serde_json::to_value(breakdown).map_err(RecordError::from))
        }
        "/roster" => roster_summary(request, age_config, as_of),
        _ => return None,
    };
    Some(result)
}

fn roster_summary(
    request: RetirementRequest,
    age_config: RetirementAgeConfig,
    as_of: NaiveDate,
) -> Result<Value, RecordError> {
    let category: CountCategory = request.category.as_deref().unwrap_or("all").parse()?;
    let runner = RosterRunner::new(age_config, as_of);
    let people = request.roster;

    Ok(json!({
        "asOf": runner.as_of().to_string(),
        "bupAges": runner.config().bup_ages(),
        "assessments": runner.assess_all(&people),
        "counts": RosterRunner::counts(&people, category),
        "bupSummary": runner.bup_summary(&people),
        "distribution": runner.retirement_distribution(&people),
    }))
}

/// Lambda handler function
async fn handler(
    event: LambdaEvent<LambdaFunctionUrlRequest>,
) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let event = event.payload;

    // Handle CORS preflight
    let method = event.request_context.http.method.as_deref().unwrap_or("POST");
    if method.eq_ignore_ascii_case("OPTIONS") {
        return Ok(response(200, None));
    }

    if event.is_base64_encoded {
        return Ok(error_response(400, "Binary request bodies are not supported"));
    }

    let body = event.body.as_deref().filter(|b| !b.trim().is_empty()).unwrap_or("{}");
    let request: RetirementRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return Ok(error_response(400, &format!("Invalid JSON: {}", e))),
    };

    let as_of = match request.as_of.as_deref() {
        Some(raw) => match parse_record_date(raw) {
            Some(date) => date,
            None => return Ok(error_response(400, &format!("Invalid asOf date: {}", raw))),
        },
        None => chrono::Local::now().date_naive(),
    };

    let age_config = match resolve_config(&request) {
        Ok(c) => c,
        Err(e) => return Ok(record_error_response(&e)),
    };

    let path = event.raw_path.unwrap_or_default();
    let path = path.trim_end_matches('/').to_string();
    let result = match route(&path, request, age_config, as_of) {
        Some(result) => result,
        None => return Ok(error_response(404, &format!("Unknown route: {}", path))),
    };

    log::info!("{} {} handled in {} ms", method, path, start.elapsed().as_millis());

    Ok(match result {
        Ok(value) => json_response(200, &value),
        Err(e) => record_error_response(&e),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
