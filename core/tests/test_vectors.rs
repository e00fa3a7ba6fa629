//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use farm_core::{
    ApiError, Certificate, CreateRating, FarmClient, HttpMethod, HttpRequest, HttpResponse,
    Message, TokenResponse,
};

const BASE_URL: &str = "http://localhost:8000";

fn client() -> FarmClient {
    FarmClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Check method, path, headers and (if present) body against the vector.
fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let req_body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn assert_error(name: &str, err: ApiError, expected: &serde_json::Value) {
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(u64::from(status), expected["status"].as_u64().unwrap(), "{name}: status");
            assert_eq!(message, expected["message"].as_str().unwrap(), "{name}: message");
        }
        other => panic!("{name}: expected status error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    let raw = include_str!("../../test-vectors/login.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];

        let req = c
            .build_login(input["username"].as_str().unwrap(), input["password"].as_str().unwrap())
            .unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_login(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: TokenResponse = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Update complaint
// ---------------------------------------------------------------------------

#[test]
fn update_complaint_test_vectors() {
    let raw = include_str!("../../test-vectors/update_complaint.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let token = case["token"].as_str();

        let req = c
            .build_update_complaint_status(
                token,
                case["input_id"].as_str().unwrap(),
                case["input_status"].as_str().unwrap(),
            )
            .unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_update_complaint_status(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Message = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Verify certificate
// ---------------------------------------------------------------------------

#[test]
fn verify_certificate_test_vectors() {
    let raw = include_str!("../../test-vectors/verify_certificate.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let req = c.build_verify_certificate(case["input_cert_number"].as_str().unwrap());
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_verify_certificate(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Option<Certificate> =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[test]
fn submit_rating_test_vectors() {
    let raw = include_str!("../../test-vectors/ratings.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: CreateRating = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_submit_rating(case["token"].as_str(), &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_submit_rating(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Message = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}
