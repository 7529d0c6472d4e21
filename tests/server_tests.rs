
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use conteo_assign::model::{GroupId, LocationId, WarehouseId, WorkerId};
use conteo_assign::server::{router, ServerState};
use test_harness::fixture_inventory;

const TOKEN: &str = "secreto";

fn create_test_app(token: Option<&str>) -> (Router, ServerState) {
    let state = ServerState::new(fixture_inventory(), token.map(String::from));
    (router(state.clone()), state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_users_endpoint_includes_admins() {
    let (app, _) = create_test_app(Some(TOKEN));

    let response = app.oneshot(get("/api/admin/usuarios")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    let users = json.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["role"], "admin");
    assert_eq!(users[1]["username"], "jperez");
}

#[tokio::test]
async fn test_active_groups_use_api_names() {
    let (app, _) = create_test_app(Some(TOKEN));

    let response = app
        .oneshot(get("/api/conteos/grupos/activos"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(
        json,
        json!([
            {"id": 3, "descripcion": "Cierre 2025", "activo": 1},
            {"id": 4, "descripcion": "Ciclico enero", "activo": 1}
        ])
    );
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let (app, _) = create_test_app(Some(TOKEN));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/bodegas/listar")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = read_json(response).await;
    assert_eq!(json["error"], "Missing or invalid bearer token");
}

#[tokio::test]
async fn test_open_server_accepts_anonymous_requests() {
    let (app, _) = create_test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/bodegas/listar")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json[0]["nombre"], "Principal");
}

#[tokio::test]
async fn test_locations_require_warehouse_query() {
    let (app, _) = create_test_app(Some(TOKEN));

    let response = app
        .clone()
        .oneshot(get("/api/ubicaciones/listar"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/api/ubicaciones/listar?bodegaId=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(
        json,
        json!([{"id": 501, "nombre": "B-01"}, {"id": 502, "nombre": "B-02"}])
    );
}

#[tokio::test]
async fn test_summary_endpoint() {
    let (app, _) = create_test_app(Some(TOKEN));

    let response = app
        .oneshot(get(
            "/api/asignacion/admin/resumen-usuario?usuarioId=8&grupoId=3",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(
        json,
        json!([{"bodega_nombre": "Anexo", "total_ubicaciones": 1}])
    );
}

#[tokio::test]
async fn test_bulk_save_replaces_assignment_set() {
    let (app, state) = create_test_app(Some(TOKEN));

    let response = app
        .oneshot(post_json(
            "/api/asignacion/guardar-masivo",
            json!({
                "usuario_id": 7,
                "conteo_grupo_id": 3,
                "bodega_id": 2,
                "ubicaciones": [101, 103],
                "empresa_id": 1
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"success": true, "total": 2}));

    let inventory = state.inventory.read().await;
    let set = inventory.assignment_set(WorkerId(7), GroupId(3), WarehouseId(2));
    assert_eq!(
        set.into_iter().collect::<Vec<_>>(),
        vec![LocationId(101), LocationId(103)]
    );
}

#[tokio::test]
async fn test_bulk_save_rejects_unknown_group() {
    let (app, state) = create_test_app(Some(TOKEN));

    let response = app
        .oneshot(post_json(
            "/api/asignacion/guardar-masivo",
            json!({
                "usuario_id": 7,
                "conteo_grupo_id": 77,
                "bodega_id": 2,
                "ubicaciones": [101],
                "empresa_id": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = read_json(response).await;
    assert_eq!(json["error"], "Unknown count group: 77");
    assert_eq!(state.inventory.read().await.assignments.len(), 1);
}
