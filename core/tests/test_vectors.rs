//! Verify request building and response parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector names an operation by alias and describes its inputs, the
//! expected request, a simulated response and the expected parse result.
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use serde_json::Value;
use todo_core::{
    ClientOptions, Contract, HttpMethod, HttpResponse, Operation, PatchContract, PathParams,
    PutContract, TodoClient,
};

const BASE_URL: &str = "http://localhost:3000";

fn path_params(case: &Value) -> PathParams {
    let mut params = PathParams::new();
    if let Some(map) = case.get("path_params").and_then(Value::as_object) {
        for (name, value) in map {
            params = params.with(name.as_str(), value.as_str().unwrap());
        }
    }
    params
}

fn run_vectors<C: Contract>(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    assert_eq!(vectors["contract"], C::KIND.as_str());

    let client: TodoClient<C, ()> = TodoClient::new(BASE_URL, ClientOptions::default(), ());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let op = Operation::from_alias(case["operation"].as_str().unwrap()).unwrap();
        let params = path_params(case);
        let body = case.get("body");

        // Verify build
        let built = client.build(op, &params, body);
        if let Some(kind) = case.get("expected_build_error") {
            let err = built.unwrap_err();
            assert_eq!(err.kind().as_str(), kind.as_str().unwrap(), "{name}: build error");
            continue;
        }
        let req = built.unwrap();
        let expected_req = &case["expected_request"];
        assert_eq!(
            Some(req.method),
            HttpMethod::parse(expected_req["method"].as_str().unwrap()),
            "{name}: method"
        );
        assert_eq!(
            req.path,
            format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()),
            "{name}: path"
        );

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (
                    arr[0].as_str().unwrap().to_string(),
                    arr[1].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match expected_req.get("body") {
            Some(expected_body) => {
                let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&req_body, expected_body, "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );
        let result = client.parse(op, response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(
                err.kind().as_str(),
                expected_error.as_str().unwrap(),
                "{name}: error kind"
            );
            if let Some(status) = case.get("expected_status") {
                assert_eq!(
                    err.status().map(u64::from),
                    status.as_u64(),
                    "{name}: error status"
                );
            }
        } else {
            let value = result.unwrap();
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
        }
    }
}

#[test]
fn patch_contract_vectors() {
    run_vectors::<PatchContract>(include_str!("../../test-vectors/patch.json"));
}

#[test]
fn put_contract_vectors() {
    run_vectors::<PutContract>(include_str!("../../test-vectors/put.json"));
}
