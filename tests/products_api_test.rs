use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

mod common;
use common::{create, send, send_request, setup_failing_app, setup_test_app, BODY_LIMIT};

async fn seed_catalog(app: &axum::Router) {
    for (name, price) in [
        ("Blue Widget", 25.0),
        ("WIDGET deluxe", 80.0),
        ("Gadget", 10.0),
        ("mini widget", 50.0),
        ("Gizmo", 120.0),
    ] {
        create(app, "products", json!({ "name": name, "price": price })).await;
    }
}

fn names(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_then_get_returns_submitted_fields() {
    let app = setup_test_app();
    let (status, created) = send(&app, "POST", "/products", Some(json!({ "name": "Lamp", "price": 19.99 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Lamp");
    assert_eq!(created["price"], 19.99);
    let id = created["_id"].as_str().unwrap();
    assert_eq!(id.len(), 24);

    let (status, fetched) = send(&app, "GET", &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_list_without_filters_returns_everything() {
    let app = setup_test_app();
    let (status, body) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    seed_catalog(&app).await;
    let (status, body) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_list_max_price_excludes_pricier_products() {
    let app = setup_test_app();
    seed_catalog(&app).await;
    let (status, body) = send(&app, "GET", "/products?max-price=50", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["Blue Widget", "Gadget", "mini widget"]);
    for doc in body.as_array().unwrap() {
        assert!(doc["price"].as_f64().unwrap() <= 50.0);
    }
}

#[tokio::test]
async fn test_list_includes_is_case_insensitive() {
    let app = setup_test_app();
    seed_catalog(&app).await;
    let (_, body) = send(&app, "GET", "/products?includes=widget", None).await;
    assert_eq!(names(&body), ["Blue Widget", "WIDGET deluxe", "mini widget"]);

    let (_, body) = send(&app, "GET", "/products?includes=wid.et", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_limit_caps_results_after_filtering() {
    let app = setup_test_app();
    seed_catalog(&app).await;
    let (_, body) = send(&app, "GET", "/products?includes=widget&max-price=60&limit=2", None).await;
    assert_eq!(names(&body), ["Blue Widget", "mini widget"]);

    let (_, body) = send(&app, "GET", "/products?limit=2", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_ignores_unparsable_numbers_and_zero_limit() {
    let app = setup_test_app();
    seed_catalog(&app).await;
    for uri in ["/products?max-price=cheap", "/products?limit=abc", "/products?limit=0", "/products?includes="] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body.as_array().unwrap().len(), 5, "{uri}");
    }
}

#[tokio::test]
async fn test_replace_with_identical_content_succeeds() {
    let app = setup_test_app();
    let id = create(&app, "products", json!({ "name": "Chair", "price": 45 })).await;
    let uri = format!("/products/{}", id);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "name": "Chair", "price": 45 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "_id": id, "name": "Chair", "price": 45 }));

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "name": "Stool" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Stool");

    let (_, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(fetched, json!({ "_id": id, "name": "Stool" }));
}

#[tokio::test]
async fn test_create_delete_get_is_not_found() {
    let app = setup_test_app();
    let id = create(&app, "products", json!({ "name": "Desk", "price": 300 })).await;
    let uri = format!("/products/{}", id);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": format!("Item with id:{} not found", id) }));

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found_everywhere() {
    let app = setup_test_app();
    let id = "65a1f0c2b3d4e5f6a7b8c9d0";
    let expected = json!({ "message": format!("Item with id:{} not found", id) });
    let uri = format!("/products/{}", id);
    for (method, body) in [("GET", None), ("PUT", Some(json!({ "name": "x" }))), ("DELETE", None)] {
        let (status, resp) = send(&app, method, &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(resp, expected, "{method}");
    }
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let app = setup_test_app();
    for (method, body) in [("GET", None), ("PUT", Some(json!({ "name": "x" }))), ("DELETE", None)] {
        let (status, resp) = send(&app, method, "/products/not-an-id", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(resp, json!({ "message": "Invalid id: not-an-id" }), "{method}");
    }
}

#[tokio::test]
async fn test_invalid_bodies_are_bad_requests() {
    let app = setup_test_app();
    let (status, body) = send(&app, "POST", "/products", Some(json!(["not", "an", "object"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "body must be a JSON object" }));

    let request = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .body(Body::from("{ broken"))
        .unwrap();
    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = setup_test_app();
    let big = "x".repeat(BODY_LIMIT * 2);
    let (status, body) = send(&app, "POST", "/products", Some(json!({ "name": big.clone() }))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["message"].is_string());

    let payload = serde_json::to_string(&json!({ "name": big })).unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["message"].is_string(), "{body}");
}

#[tokio::test]
async fn test_list_tolerates_repeated_keys() {
    let app = setup_test_app();
    seed_catalog(&app).await;
    let (status, body) = send(&app, "GET", "/products?limit=1&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/products?max-price=abc&max-price=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, "GET", "/products?max-price=abc&max-price=30", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["Blue Widget", "Gadget"]);
}

#[tokio::test]
async fn test_undecodable_id_gets_json_error_body() {
    let app = setup_test_app();
    for (method, body) in [("GET", None), ("PUT", Some(json!({ "name": "x" }))), ("DELETE", None)] {
        let (status, resp) = send(&app, method, "/products/%FF", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
        assert!(resp["message"].is_string(), "{method}: {resp}");
    }
}

#[tokio::test]
async fn test_storage_failures_are_generic_500s() {
    let app = setup_failing_app();
    let id = "65a1f0c2b3d4e5f6a7b8c9d0";
    let expected = json!({ "message": "Internal Server Error" });
    for (method, uri, body) in [
        ("GET", "/products".to_string(), None),
        ("POST", "/products".to_string(), Some(json!({ "name": "x" }))),
        ("GET", format!("/products/{}", id), None),
        ("PUT", format!("/products/{}", id), Some(json!({ "name": "x" }))),
        ("DELETE", format!("/products/{}", id), None),
    ] {
        let (status, resp) = send(&app, method, &uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(resp, expected);
    }
}
