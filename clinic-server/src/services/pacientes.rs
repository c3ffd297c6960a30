//! Patient records, kept in memory per tenant.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use clinic_auth::{admin_only, authenticate, CurrentUser, JwtVerifier};
use clinic_axum::{ClinicAxumError, JsonBody};
use clinic_core::Failure;
use clinic_validator::{unique_violation, validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use super::documents::{only_digits, validate_cpf};

const MODULE: &str = "pacientes";

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    #[validate(length(min = 2, message = "Nome deve ter ao menos 2 caracteres"))]
    pub nome: String,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,

    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Telefone inválido"))]
    pub telefone: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub empresa_id: String,
    pub nome: String,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub telefone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PatientStore {
    by_tenant: RwLock<HashMap<String, Vec<Patient>>>,
}

impl PatientStore {
    /// Insert a patient; a CPF may appear only once per tenant.
    pub async fn insert(&self, tenant: &str, input: NewPatient) -> Result<Patient, Failure> {
        let cpf = input.cpf.as_deref().map(only_digits);
        let mut guard = self.by_tenant.write().await;
        let patients = guard.entry(tenant.to_string()).or_default();

        if let Some(cpf) = &cpf {
            if patients.iter().any(|p| p.cpf.as_ref() == Some(cpf)) {
                return Err(unique_violation("cpf", "CPF já cadastrado para esta empresa")
                    .with_technical_message(format!("duplicate cpf in tenant {tenant}")));
            }
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            empresa_id: tenant.to_string(),
            nome: input.nome.trim().to_string(),
            cpf,
            email: input.email,
            telefone: input.telefone,
            created_at: Utc::now(),
        };
        patients.push(patient.clone());
        Ok(patient)
    }

    pub async fn list(&self, tenant: &str) -> Vec<Patient> {
        self.by_tenant
            .read()
            .await
            .get(tenant)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn get(&self, tenant: &str, id: &str) -> Result<Patient, Failure> {
        let id = parse_id(id)?;
        self.by_tenant
            .read()
            .await
            .get(tenant)
            .and_then(|ps| ps.iter().find(|p| p.id == id).cloned())
            .ok_or_else(|| patient_not_found(tenant, id))
    }

    pub async fn remove(&self, tenant: &str, id: &str) -> Result<Patient, Failure> {
        let id = parse_id(id)?;
        let mut guard = self.by_tenant.write().await;
        let patients = guard.get_mut(tenant).ok_or_else(|| patient_not_found(tenant, id))?;
        let idx = patients
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| patient_not_found(tenant, id))?;
        Ok(patients.remove(idx))
    }
}

fn patient_not_found(tenant: &str, id: Uuid) -> Failure {
    Failure::not_found()
        .with_user_message("Paciente não encontrado")
        .with_technical_message(format!("patient {id} not in tenant {tenant}"))
}

// Malformed ids cannot exist, so they read as "not found".
fn parse_id(id: &str) -> Result<Uuid, Failure> {
    Uuid::parse_str(id).map_err(|e| {
        Failure::not_found()
            .with_user_message("Paciente não encontrado")
            .with_technical_message(format!("bad patient id {id:?}: {e}"))
    })
}

pub fn router(store: Arc<PatientStore>, verifier: Arc<JwtVerifier>) -> Router {
    Router::new()
        .route("/pacientes", post(create).get(list))
        .route(
            "/pacientes/{id}",
            get(fetch).merge(delete(remove).route_layer(middleware::from_fn(admin_only))),
        )
        .route_layer(middleware::from_fn_with_state(verifier, authenticate))
        .with_state(store)
}

async fn create(
    State(store): State<Arc<PatientStore>>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Patient>), ClinicAxumError> {
    user.require_permission(MODULE)?;
    let input: NewPatient = validate(&body)?;
    let patient = store.insert(&user.tenant_id, input).await?;
    tracing::info!(patient = %patient.id, tenant = %user.tenant_id, "patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

async fn list(
    State(store): State<Arc<PatientStore>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Patient>>, ClinicAxumError> {
    user.require_permission(MODULE)?;
    Ok(Json(store.list(&user.tenant_id).await))
}

async fn fetch(
    State(store): State<Arc<PatientStore>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ClinicAxumError> {
    user.require_permission(MODULE)?;
    Ok(Json(store.get(&user.tenant_id, &id).await?))
}

async fn remove(
    State(store): State<Arc<PatientStore>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ClinicAxumError> {
    let removed = store.remove(&user.tenant_id, &id).await?;
    tracing::info!(patient = %removed.id, by = %user.sub, "patient removed");
    Ok(StatusCode::NO_CONTENT)
}
