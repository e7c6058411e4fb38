//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

const BOUNDARY: &str = "spendscope-test-boundary";

const EXPENSES_CSV: &str = "date,user_id,expense_type,vendor,amount
2024-01-01,alice,food,Cafe,100
2024-01-01,bob,food,Deli,50
2024-01-02,alice,travel,Metro,10
not a date,bob,food,Deli,5
";

fn setup_test_app() -> Router {
    create_router(AnalysisConfig::default(), ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn upload_request(file_name: &str, content: &str) -> Request<Body> {
    upload_bytes_request(file_name, content.as_bytes())
}

fn upload_bytes_request(file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        b = BOUNDARY,
        f = file_name,
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/datasets")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Upload the sample file and return its dataset id
async fn upload_sample(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(upload_request("expenses.csv", EXPENSES_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    json["id"].as_str().unwrap().to_string()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();
    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// ========== Dataset API Tests ==========

#[tokio::test]
async fn test_upload_dataset() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(upload_request("expenses.csv", EXPENSES_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["id"].as_str().unwrap().len(), 64);
    assert_eq!(json["rows"], 3);
    assert_eq!(json["dropped_rows"], 1);
    assert_eq!(json["cached"], false);
    assert_eq!(json["options"]["min_date"], "2024-01-01");
    assert_eq!(json["options"]["max_date"], "2024-01-02");
    assert_eq!(json["options"]["categories"], serde_json::json!(["food", "travel"]));
    assert_eq!(json["options"]["users"], serde_json::json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_repeated_upload_hits_cache() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(upload_request("copy.csv", EXPENSES_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["cached"], true);
}

#[tokio::test]
async fn test_upload_missing_required_column() {
    let app = setup_test_app();
    let response = app
        .oneshot(upload_request("bad.csv", "date,vendor\n2024-01-01,Cafe\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("amount"));
}

fn expenses_workbook() -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows = [
        ["2024-01-01", "alice", "food", "100"],
        ["2024-01-01", "bob", "food", "50"],
        ["2024-01-02", "alice", "travel", "10"],
    ];
    for (col, header) in ["date", "user_id", "expense_type", "amount"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, row[0]).unwrap();
        sheet.write_string(r, 1, row[1]).unwrap();
        sheet.write_string(r, 2, row[2]).unwrap();
        sheet.write_number(r, 3, row[3].parse::<f64>().unwrap()).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn test_upload_spreadsheet() {
    let app = setup_test_app();
    let response = app
        .clone()
        .oneshot(upload_bytes_request("Expenses.XLSX", &expenses_workbook()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    assert_eq!(json["rows"], 3);
    assert_eq!(json["options"]["users"], serde_json::json!(["alice", "bob"]));

    let id = json["id"].as_str().unwrap().to_string();
    let response = app
        .oneshot(get(&format!("/api/datasets/{}/dashboard", id)))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["kpis"]["total_spend"], 160.0);
}

#[tokio::test]
async fn test_upload_unreadable_spreadsheet() {
    let app = setup_test_app();
    let response = app
        .oneshot(upload_request("expenses.xlsx", EXPENSES_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_other_file_types() {
    let app = setup_test_app();
    let response = app
        .oneshot(upload_request("expenses.pdf", EXPENSES_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains(".pdf"));
}

#[tokio::test]
async fn test_concurrent_uploads_share_one_entry() {
    let app = setup_test_app();
    let (a, b) = tokio::join!(
        app.clone().oneshot(upload_request("a.csv", EXPENSES_CSV)),
        app.clone().oneshot(upload_request("b.csv", EXPENSES_CSV)),
    );
    let a = get_body_json(a.unwrap()).await;
    let b = get_body_json(b.unwrap()).await;
    assert_eq!(a["id"], b["id"]);

    let id = a["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(get(&format!("/api/datasets/{}/options", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // one delete removes it; a second finds nothing
    let delete = |uri: String| {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };
    let uri = format!("/api/datasets/{}", id);
    let response = app.clone().oneshot(delete(uri.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.oneshot(delete(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup_test_app();
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/datasets")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "No file provided");
}

#[tokio::test]
async fn test_get_options() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(get(&format!("/api/datasets/{}/options", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["users"], serde_json::json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_unknown_dataset() {
    let app = setup_test_app();
    let response = app
        .oneshot(get("/api/datasets/deadbeef/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_dataset() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;
    let uri = format!("/api/datasets/{}", id);

    let delete = |uri: String| {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete(uri.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(delete(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get(&format!("/api/datasets/{}/options", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Dashboard API Tests ==========

#[tokio::test]
async fn test_dashboard_unfiltered() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(get(&format!("/api/datasets/{}/dashboard", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["kpis"]["total_spend"], 160.0);
    assert_eq!(json["trend"][0]["amount"], 150.0);
    assert_eq!(json["trend"][1]["amount"], 10.0);
    assert_eq!(json["trend"][1]["rolling_mean"], 80.0);
    assert_eq!(json["categories"]["food"], 150.0);
    assert_eq!(json["categories"]["travel"], 10.0);
    assert_eq!(json["users"]["alice"], 110.0);
    assert_eq!(json["distribution"]["histogram"]["bins"].as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn test_dashboard_with_filters() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(get(&format!(
            "/api/datasets/{}/dashboard?from=2024-01-01&to=2024-01-31&categories=food,travel&user=alice",
            id
        )))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["applied"]["matched_records"], 2);
    assert_eq!(json["kpis"]["total_spend"], 110.0);
}

#[tokio::test]
async fn test_dashboard_single_day() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(get(&format!("/api/datasets/{}/dashboard?from=2024-01-02", id)))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["applied"]["matched_records"], 1);
    assert_eq!(json["applied"]["range"]["start"], "2024-01-02");
    assert_eq!(json["applied"]["range"]["end"], "2024-01-02");
}

#[tokio::test]
async fn test_dashboard_no_matches() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(get(&format!("/api/datasets/{}/dashboard?categories=rent", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "empty");
    assert_eq!(json["applied"]["input_records"], 3);
    assert!(json.get("kpis").is_none());
}

#[tokio::test]
async fn test_dashboard_inverted_range() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(get(&format!(
            "/api/datasets/{}/dashboard?from=2024-02-01&to=2024-01-01",
            id
        )))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["applied"]["range"]["recovered"], "inverted");
    assert_eq!(json["applied"]["matched_records"], 3);
}

// ========== Export API Tests ==========

#[tokio::test]
async fn test_export_filtered_csv() {
    let app = setup_test_app();
    let id = upload_sample(&app).await;

    let response = app
        .oneshot(get(&format!("/api/datasets/{}/export?user=bob", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"filtered_expenses.csv\""
    );

    let csv = get_body_text(response).await;
    assert_eq!(
        csv,
        "date,user_id,expense_type,vendor,amount\n2024-01-01,bob,food,Deli,50\n"
    );
}

#[test]
fn test_parse_origins() {
    assert_eq!(
        parse_origins(" http://a.test , ,http://b.test"),
        vec!["http://a.test", "http://b.test"]
    );
    assert!(parse_origins("").is_empty());
}
