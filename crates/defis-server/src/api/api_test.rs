use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use defis_core::{DatasetKind, SourceConfig, SourcesFile, TextEncoding};
use defis_loader::SourceFetcher;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use super::*;

const CATALOGUE: &str = "Code CIS\tCIP13\tDénomination du médicament\tTitulaire(s)\tValeur du SMR\tValeur de l'ASMR\n\
61234567\t3400930000011\tXELJANZ 5 mg\t PFIZER PFE FRANCE\tImportant\tIV\n\
61234567\t3400930000028\tXELJANZ 5 mg\t PFIZER PFE FRANCE\t\tIV\n\
60000001\t3400930000035\tOCREVUS\tROCHE\tImportant\tII\n";

const REVENUE: &str = "Titulaire(s)\tDénomination du médicament\tRevenue_USD\tCA_groupe\tValeur du SMR\tValeur de l'ASMR\n\
PFIZER\tELIQUIS\t300\t1000\tImportant\tIV\n\
PFIZER\tIBRANCE\t700\t1000\tImportant\tII\n";

const DEVICES: &str = "Code dossier\tNom dispositif\tTitulaire(s)\tValeur du SR\tValeur de l'ASR\n\
12345\tSTENT X\tMEDTRONIC\tSuffisant\tIII\n";

const PRODUCTS: &str = "Code CIS\tCIP13\tDénomination du médicament\tCode dossier\tNom dispositif\tValeur du SMR\tValeur de l'ASMR\ttype_produit\tgroupe_racine\n\
1\t11\tALPHA\t\t\tImportant\tI\tmedicament\tA\n\
2\t22\tBETA\t\t\tModéré\tII\tmedicament\tA\n\
3\t33\tGAMMA\t\t\tImportant\tII\tmedicament\tB\n\
4\t44\tDELTA\t\t\tFaible\tNA\tmedicament\tB\n\
\t\t\t900\tVALVE\tImportant\tIII\tdispositif_medical\tA\n";

fn write(dir: &Path, name: &str, body: &str) -> SourceConfig {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write fixture");
    let kind = match name {
        "catalogue.tsv" => DatasetKind::Catalogue,
        "revenue.tsv" => DatasetKind::Revenue,
        "devices.tsv" => DatasetKind::Devices,
        _ => DatasetKind::Products,
    };
    SourceConfig::local(kind, name.trim_end_matches(".tsv"), path)
}

fn app_with(products: &str, auth: AuthState) -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let sources = SourcesFile {
        sources: vec![
            write(dir.path(), "catalogue.tsv", CATALOGUE),
            write(dir.path(), "revenue.tsv", REVENUE),
            write(dir.path(), "devices.tsv", DEVICES),
            write(dir.path(), "products.tsv", products),
        ],
    };
    let fetcher = SourceFetcher::with_settings(5, "defis-test", 0, 0).expect("client");
    let repo = DatasetRepository::new(sources, fetcher, TextEncoding::DEFAULT_ORDER.to_vec());
    let state = AppState {
        repo: Arc::new(repo),
    };
    (build_app(state, auth), dir)
}

fn app() -> (Router, TempDir) {
    app_with(PRODUCTS, AuthState::from_admin_token(Some("admin-secret"), false))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&body).expect("json parse"))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        assert_eq!(ApiError::new("req-1", code, "x").into_response().status(), status);
    }
}

#[test]
fn parse_column_defaults_to_benefit() {
    assert_eq!(parse_column("r", None).unwrap(), RatingColumn::Benefit);
    assert_eq!(
        parse_column("r", Some("asmr")).unwrap(),
        RatingColumn::Improvement
    );
    assert_eq!(
        parse_column("r", Some("price")).unwrap_err().error.code,
        "validation_error"
    );
}

#[tokio::test]
async fn health_reports_cached_sources_and_request_id() {
    let (app, _dir) = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["cached_sources"], json!([]));
    assert_eq!(json["meta"]["request_id"], "req-42");
}

#[tokio::test]
async fn lists_groups_sorted() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/groups").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!(["A", "B"]));
}

#[tokio::test]
async fn group_report_splits_drug_and_device_profiles() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/groups/A?column=improvement").await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["product_count"], 3);
    assert_eq!(data["kpis"]["drugs"], 2);
    assert_eq!(data["kpis"]["devices"], 1);
    assert_eq!(data["drug_profile"]["family"], "asmr");
    assert_eq!(data["device_profile"]["family"], "asr");
}

#[tokio::test]
async fn unknown_group_is_not_found() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/groups/SANOFI").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn comparing_a_group_with_itself_is_rejected() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/groups/compare?left=A&right=A").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn compare_returns_deltas() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/groups/compare?left=A&right=B").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["deltas"]["total"], 1);
    assert_eq!(json["data"]["deltas"]["devices"], 1);
}

#[tokio::test]
async fn drug_lookup_by_cis_returns_presentations() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/drugs?by=cis&value=61234567").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["presentation_count"], 2);
    assert_eq!(json["data"]["smr"], "Important");
    assert_eq!(json["data"]["presentations"][0]["owner"], "PFIZER");
}

#[tokio::test]
async fn drug_options_and_bad_key() {
    let (app, _dir) = app();
    let (status, json) = get_json(app.clone(), "/api/v1/drugs/options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["key"], "name");
    assert_eq!(json["data"]["values"], json!(["OCREVUS", "XELJANZ 5 mg"]));

    let (status, json) = get_json(app, "/api/v1/drugs/options?by=atc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn drug_lookup_requires_a_value() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/drugs?by=name").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("value")));
}

#[tokio::test]
async fn device_lookup_by_dossier_ignores_surrounding_spaces() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/devices?by=dossier&value=%2012345%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["devices"][0]["name"], "STENT X");
}

#[tokio::test]
async fn revenue_breakdown_and_unknown_lab() {
    let (app, _dir) = app();
    let (status, json) = get_json(app.clone(), "/api/v1/revenue/labs/PFIZER").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["top_drug"], "IBRANCE");
    assert_eq!(json["data"]["lines"][0]["drug_name"], "IBRANCE");
    assert_eq!(json["data"]["lines"][0]["share_percent"], 70.0);

    let (status, _) = get_json(app, "/api/v1/revenue/labs/SANOFI").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn portfolio_defaults_split_weights_evenly() {
    let (app, _dir) = app();
    let (status, json) = get_json(app, "/api/v1/portfolio/defaults?groups=A,B,C").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json["data"].as_array().expect("entries");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["weight"], 33.3);
    assert_eq!(entries[0]["product_count"], 3);
    assert_eq!(entries[2]["product_count"], 0);
}

#[tokio::test]
async fn portfolio_report_weights_each_group() {
    let (app, _dir) = app();
    let request = post_json(
        "/api/v1/portfolio",
        &json!({
            "entries": [{"group": "A", "weight": 50}, {"group": "B", "weight": 50}],
            "column": "improvement"
        }),
    );
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json parse");

    let data = &json["data"];
    assert_eq!(data["weight_status"]["status"], "balanced");
    assert!((data["total_mass"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(data["missing_groups"], json!([]));
    // A: I, II, III (device row) / B: II, NA
    let entries = data["profile"]["entries"].as_array().expect("entries");
    let mass = |prefix: &str| {
        entries
            .iter()
            .find(|e| e["label"].as_str().is_some_and(|l| l.starts_with(prefix)))
            .and_then(|e| e["mass"].as_f64())
            .unwrap_or(0.0)
    };
    assert!((mass("II ") - (0.5 / 3.0 + 0.25)).abs() < 1e-9);
    assert!((mass("Non applicable") - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn portfolio_rejects_negative_weights() {
    let (app, _dir) = app();
    let request = post_json(
        "/api/v1/portfolio",
        &json!({"entries": [{"group": "A", "weight": -5}]}),
    );
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_returns_an_xlsx_attachment() {
    let (app, _dir) = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/export/revenue/PFIZER")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        defis_export::XLSX_CONTENT_TYPE
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("ascii header")
        .to_owned();
    assert!(disposition.starts_with("attachment; filename=\"CA_PFIZER_"));
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert_eq!(&body[..2], b"PK");
}

#[tokio::test]
async fn missing_product_column_is_an_upstream_error() {
    let broken = "Code CIS\tValeur du SMR\n1\tImportant\n";
    let (app, _dir) = app_with(broken, AuthState::from_admin_token(None, true));
    let (status, json) = get_json(app, "/api/v1/groups").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("Valeur de l'ASMR")));
}

#[tokio::test]
async fn admin_invalidation_requires_the_token() {
    let (app, _dir) = app();
    let (status, _) = get_json(app.clone(), "/api/v1/groups").await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/admin/cache/invalidate", &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = post_json("/api/v1/admin/cache/invalidate", &json!({"source": "products"}));
    request.headers_mut().insert(
        header::AUTHORIZATION,
        "Bearer admin-secret".parse().expect("header"),
    );
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["data"]["invalidated"], json!(["products"]));
    assert_eq!(json["data"]["remaining"], json!([]));

    let (_, health) = get_json(app, "/api/v1/health").await;
    assert_eq!(health["data"]["cached_sources"], json!([]));
}

#[tokio::test]
async fn admin_rejects_unknown_source() {
    let (app, _dir) = app_with(PRODUCTS, AuthState::from_admin_token(None, true));
    let response = app
        .oneshot(post_json(
            "/api/v1/admin/cache/invalidate",
            &json!({"source": "nope"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
