use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use gtour::sdk::client::ApiClient;
use gtour::sdk::places::PlaceDb;
use gtour::sdk::planner::SolveRequest;
use gtour::sdk::routing::GeodesicProvider;
use gtour::sdk::server::{router, AppState};
use gtour::sdk::solver::OptimizeFor;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn state() -> AppState {
    AppState {
        db: Arc::new(PlaceDb::load().unwrap()),
        provider: Arc::new(GeodesicProvider),
        iterations: 20,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_solve(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/solve_gtsp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn get_clusters_lists_the_catalogue() {
    let app = router(state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/get_clusters")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let clusters = body.as_object().unwrap();
    assert_eq!(clusters.len(), 11);
    assert_eq!(clusters["cluster_q7"]["name"], "Cụm Quận 7");

    // representative pin is the first member's coordinate, [lat, lon]
    let coord = clusters["cluster_q1_core"]["representative_coord"]
        .as_array()
        .unwrap();
    assert_eq!(coord[0], 10.777963);
    assert_eq!(coord[1], 106.695676);
}

#[tokio::test]
async fn solve_returns_a_full_itinerary() {
    let app = router(state());
    let payload = json!({
        "start_address": "Dinh Độc Lập",
        "end_address": "Chợ Bến Thành",
        "cluster_ids": ["cluster_q7"],
        "optimize_for": "distance"
    });

    let response = app.oneshot(post_solve(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["optimize_for"], "distance");
    assert!(body["total_cost"].as_f64().unwrap() > 0.0);

    let tour = body["tour"].as_array().unwrap();
    assert_eq!(tour.len(), 2);
    assert_eq!(tour[0]["from"], "Dinh Độc Lập");
    assert_eq!(tour[1]["to"], "Chợ Bến Thành");

    // one geometry per leg
    let geometries = body["geometries"].as_array().unwrap();
    assert_eq!(geometries.len(), 2);
    assert_eq!(geometries[0]["type"], "LineString");
}

#[tokio::test]
async fn unknown_cluster_ids_still_plan_a_direct_tour() {
    let app = router(state());
    let payload = json!({
        "start_address": "Dinh Độc Lập",
        "end_address": "Chợ Bến Thành",
        "cluster_ids": ["cluster_khong_ton_tai", "also_bogus"]
    });

    let response = app.oneshot(post_solve(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert!(body["total_cost"].as_f64().unwrap() > 0.0);

    // nothing to visit, so the tour is the single start -> end leg
    let tour = body["tour"].as_array().unwrap();
    assert_eq!(tour.len(), 1);
    assert_eq!(tour[0]["from"], "Dinh Độc Lập");
    assert_eq!(tour[0]["to"], "Chợ Bến Thành");
    assert_eq!(body["geometries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_fields_are_rejected() {
    let app = router(state());
    let payload = json!({
        "start_address": "",
        "end_address": "Chợ Bến Thành",
        "cluster_ids": ["cluster_q7"]
    });

    let response = app.oneshot(post_solve(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Thiếu thông tin: start_address, end_address hoặc cluster_ids"
    );
}

#[tokio::test]
async fn omitted_cluster_ids_are_rejected() {
    let app = router(state());
    let payload = json!({
        "start_address": "Dinh Độc Lập",
        "end_address": "Chợ Bến Thành"
    });

    let response = app.oneshot(post_solve(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = router(state());
    let request = Request::builder()
        .method("POST")
        .uri("/solve_gtsp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn unknown_optimize_criterion_is_rejected() {
    let app = router(state());
    let payload = json!({
        "start_address": "Dinh Độc Lập",
        "end_address": "Chợ Bến Thành",
        "cluster_ids": ["cluster_q7"],
        "optimize_for": "fuel"
    });

    let response = app.oneshot(post_solve(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unresolvable_start_address_is_a_client_error() {
    let app = router(state());
    let payload = json!({
        "start_address": "Số 1 Đường Không Tồn Tại",
        "end_address": "Chợ Bến Thành",
        "cluster_ids": ["cluster_q7"]
    });

    let response = app.oneshot(post_solve(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Không tìm thấy tọa độ cho điểm xuất phát: 'Số 1 Đường Không Tồn Tại'"
    );
}

#[tokio::test]
async fn client_round_trips_against_a_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state())).await.unwrap();
    });

    let client = ApiClient::new(format!("http://{}", addr));

    let clusters = client.clusters().await.unwrap();
    assert_eq!(clusters.len(), 11);
    assert!(clusters.contains_key("cluster_q7"));

    let result = client
        .solve(&SolveRequest {
            start_address: "Dinh Độc Lập".to_string(),
            end_address: "Chợ Bến Thành".to_string(),
            cluster_ids: vec!["cluster_q7".to_string(), "cluster_q1_museum_park".to_string()],
            optimize_for: OptimizeFor::Time,
        })
        .await
        .unwrap();
    assert_eq!(result.status, "success");
    assert_eq!(result.optimize_for, OptimizeFor::Time);
    // start, one stop per selected cluster, end
    assert_eq!(result.tour.len(), 3);
    assert_eq!(result.geometries.len(), 3);

    let err = client
        .solve(&SolveRequest {
            start_address: "Số 1 Đường Không Tồn Tại".to_string(),
            end_address: "Chợ Bến Thành".to_string(),
            cluster_ids: vec!["cluster_q7".to_string()],
            optimize_for: OptimizeFor::Distance,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Không tìm thấy tọa độ"));
}
