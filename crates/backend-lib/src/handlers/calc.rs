//! Calculator handlers. Every route here sits behind
//! [`require_auth`](crate::middleware::require_auth).
use std::sync::Arc;

use ::metrics::counter;
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use tracing::info;

use super::json_body;
use crate::error::AppError;
use crate::metrics;
use crate::middleware::AuthUser;
use crate::models::{NewCalculation, NewRegistration};
use crate::scoring::{score, summarize, ScoreInput, HISTORY_LIMIT};
use crate::storage::Storage;
use crate::validation::{sanitize_string, validate_student};
use crate::AppState;
use kokupocket_common::{
    CalculationRequest, CalculationResponse, DashboardResponse, HistoryResponse,
    StudentRegistrationRequest, StudentRegistrationResponse,
};

pub async fn register_student<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<StudentRegistrationRequest>, JsonRejection>,
) -> Result<Json<StudentRegistrationResponse>, AppError> {
    let req = json_body(payload)?;
    validate_student(req.name.as_deref(), req.matric.as_deref(), req.ic.as_deref())
        .into_result()?;

    let registration = state
        .storage
        .insert_registration(NewRegistration {
            user_id: user.id,
            name: sanitize_string(req.name.as_deref().unwrap_or_default()),
            matric: req.matric.unwrap_or_default(),
            ic: req.ic.unwrap_or_default(),
        })
        .await?;

    info!(user_id = user.id, registration_id = registration.id, "student registered");

    Ok(Json(StudentRegistrationResponse {
        success: true,
        message: "Registration saved".to_string(),
        registration_id: registration.id,
    }))
}

pub async fn calculate<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<Json<CalculationResponse>, AppError> {
    let input = ScoreInput::try_from(&json_body(payload)?)?;
    let result = score(&input);

    let calculation = state
        .storage
        .insert_calculation(NewCalculation {
            user_id: user.id,
            attendance: input.attendance,
            assessment: input.assessment,
            involvement: input.involvement,
            achievement: input.achievement,
            position: input.position,
            bonus: input.bonus,
            total: result.total,
            final_percent: result.final_percent,
        })
        .await?;

    counter!(metrics::CALCULATION_SAVED).increment(1);

    Ok(Json(CalculationResponse {
        success: true,
        message: "Calculation saved".to_string(),
        calculation_id: calculation.id,
        total: calculation.total,
        final_percent: calculation.final_percent,
    }))
}

pub async fn dashboard<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>, AppError> {
    let profile = state
        .storage
        .find_user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?
        .profile();

    let registrations = state.storage.list_registrations(user.id).await?;
    let calculations = state.storage.list_calculations(user.id, None).await?;
    let stats = summarize(&calculations);

    Ok(Json(DashboardResponse {
        success: true,
        user: profile,
        registrations,
        calculations,
        stats,
    }))
}

pub async fn history<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HistoryResponse>, AppError> {
    let calculations = state
        .storage
        .list_calculations(user.id, Some(HISTORY_LIMIT))
        .await?;

    Ok(Json(HistoryResponse {
        success: true,
        calculations,
    }))
}
