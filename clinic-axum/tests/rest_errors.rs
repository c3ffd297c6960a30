use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::routing::{get, post};
use axum::{Json, Router};
use clinic_axum::{ClinicApp, ClinicAxumError, JsonBody};
use clinic_core::{DiagnosticEntry, Failure, FieldError, Locale, MemorySink, MessageCatalog, Responder};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Debug, Deserialize)]
struct NewPatient {
    nome: String,
}

async fn create_patient(JsonBody(input): JsonBody<NewPatient>) -> Result<Json<Value>, ClinicAxumError> {
    if input.nome.trim().is_empty() {
        return Err(Failure::validation()
            .with_fields([FieldError::new("nome", "nome é obrigatório")])
            .into());
    }
    Ok(Json(json!({"nome": input.nome})))
}

async fn duplicate() -> Result<Json<Value>, ClinicAxumError> {
    Err(Failure::named("SequelizeUniqueConstraintError")
        .with_field_errors(json!([{"path": "cpf", "message": "cpf must be unique"}]))
        .with_technical_message("duplicate key value violates unique constraint \"pacientes_cpf_key\"")
        .into())
}

async fn boom() -> Result<Json<Value>, ClinicAxumError> {
    Err(anyhow::anyhow!("connect ECONNREFUSED 10.0.0.5:5432").into())
}

async fn forbidden() -> Result<Json<Value>, ClinicAxumError> {
    Err(Failure::forbidden()
        .with_user_message("Acesso negado. Apenas administradores.")
        .into())
}

async fn malformed() -> Result<Json<Value>, ClinicAxumError> {
    Err(Failure::validation().with_field_errors(json!("email invalid")).into())
}

async fn panics() -> &'static str {
    panic!("index out of bounds in prescription renderer")
}

fn app(sink: Arc<MemorySink>, ready: bool) -> Router {
    let responder = Responder::new(MessageCatalog::for_locale(Locale::PtBr), sink);
    let api = Router::new()
        .route("/pacientes", post(create_patient))
        .route("/duplicate", get(duplicate))
        .route("/boom", get(boom))
        .route("/forbidden", get(forbidden))
        .route("/malformed", get(malformed))
        .route("/panic", get(panics))
        .route("/test", get(|| async { "ok" }));

    let app = ClinicApp::new(responder)
        .route_get("/health", || async { "ok" })
        .nest("/api", api);
    if ready {
        app.availability().mark_ready();
    }
    app.into_router()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink.clone(), true)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/pacientes")
                .header("content-type", "application/json")
                .body(Body::from("{\"nome\":\"x\""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["details"], json!([{"field": "_schema", "message": "JSON inválido"}]));
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn handler_validation_keeps_field_details() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink, true)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/pacientes")
                .header("content-type", "application/json")
                .body(Body::from("{\"nome\":\"  \"}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let body = json_body(res).await;
    assert_eq!(
        body,
        json!({
            "error": "Dados inválidos. Verifique os campos destacados e tente novamente.",
            "code": "validation_error",
            "details": [{"field": "nome", "message": "nome é obrigatório"}]
        })
    );
}

#[tokio::test]
async fn unique_violation_is_409_with_details() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink.clone(), true).oneshot(get_req("/api/duplicate")).await.unwrap();

    assert_eq!(res.status().as_u16(), 409);
    let body = json_body(res).await;
    assert_eq!(body["code"], "unique_constraint");
    assert_eq!(body["details"], json!([{"field": "cpf", "message": "cpf must be unique"}]));
    assert!(!body.to_string().contains("pacientes_cpf_key"));

    match &sink.entries()[..] {
        [DiagnosticEntry::Classified { technical: Some(t), .. }] => assert!(t.contains("pacientes_cpf_key")),
        other => panic!("unexpected diagnostics {other:?}"),
    }
}

#[tokio::test]
async fn foreign_errors_are_opaque_500s() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink.clone(), true).oneshot(get_req("/api/boom")).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["code"], "unexpected_error");
    assert!(body.get("details").is_none());
    assert!(!body["error"].as_str().unwrap().contains("ECONNREFUSED"));

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status(), 500);
}

#[tokio::test]
async fn user_message_overrides_access_denied_text() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink, true).oneshot(get_req("/api/forbidden")).await.unwrap();

    assert_eq!(res.status().as_u16(), 403);
    let body = json_body(res).await;
    assert_eq!(body["code"], "access_denied");
    assert_eq!(body["error"], "Acesso negado. Apenas administradores.");
}

#[tokio::test]
async fn malformed_failure_falls_back_to_generic_500() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink.clone(), true).oneshot(get_req("/api/malformed")).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body, json!({"error": "Erro interno no servidor.", "code": "unexpected_error"}));
    assert!(matches!(&sink.entries()[..], [DiagnosticEntry::ClassifierFailure { .. }]));
}

#[tokio::test]
async fn panicking_handler_is_normalized() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink.clone(), true).oneshot(get_req("/api/panic")).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["code"], "unexpected_error");
    assert!(!body.to_string().contains("index out of bounds"));

    match &sink.entries()[..] {
        [DiagnosticEntry::Classified { technical: Some(t), .. }] => assert!(t.contains("index out of bounds")),
        other => panic!("unexpected diagnostics {other:?}"),
    }
}

#[tokio::test]
async fn unknown_api_route_is_not_found() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink, true).oneshot(get_req("/api/nao-existe")).await.unwrap();

    assert_eq!(res.status().as_u16(), 404);
    let body = json_body(res).await;
    assert_eq!(body, json!({"error": "Rota de API não encontrada", "code": "not_found"}));
}

#[tokio::test]
async fn unknown_page_is_plain_not_found() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink, true).oneshot(get_req("/dashboard")).await.unwrap();

    assert_eq!(res.status().as_u16(), 404);
    let body = json_body(res).await;
    assert_eq!(body["error"], "Recurso não encontrado.");
}

#[tokio::test]
async fn unsupported_method_is_not_found() {
    let sink = Arc::new(MemorySink::new());
    let router = app(sink.clone(), true);

    for (method, uri) in [("POST", "/api/test"), ("DELETE", "/api/pacientes"), ("PUT", "/api/boom")] {
        let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let res = router.clone().oneshot(req).await.unwrap();

        assert_eq!(res.status().as_u16(), 404, "{method} {uri}");
        let body = json_body(res).await;
        assert_eq!(body, json!({"error": "Rota de API não encontrada", "code": "not_found"}));
    }
    assert_eq!(sink.len(), 3);
}

#[tokio::test]
async fn api_is_unavailable_until_marked_ready() {
    let sink = Arc::new(MemorySink::new());
    let router = app(sink.clone(), false);

    let res = router.clone().oneshot(get_req("/api/boom")).await.unwrap();
    assert_eq!(res.status().as_u16(), 503);
    let body = json_body(res).await;
    assert_eq!(body["code"], "service_unavailable");
    assert_eq!(body["error"], "Banco de dados indisponível no momento");

    let res = router.clone().oneshot(get_req("/api/test")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let res = router.oneshot(get_req("/health")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);

    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn successful_requests_record_nothing() {
    let sink = Arc::new(MemorySink::new());
    let res = app(sink.clone(), true)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/pacientes")
                .header("content-type", "application/json")
                .body(Body::from("{\"nome\":\"Maria\"}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn request_id_is_preserved_on_error_responses() {
    let sink = Arc::new(MemorySink::new());
    let provided = HeaderValue::from_static("req-test-123");
    let res = app(sink, true)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/forbidden")
                .header("x-request-id", provided.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 403);
    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}
