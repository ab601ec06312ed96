use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::evaluation::assembler::EvaluationRequest;
use crate::evaluation::record::EvaluationRecord;
use crate::evaluation::upload::read_upload;
use crate::rubric::{RubricDefinition, UnitSpec};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UnitSummary {
    pub code: String,
    pub title: String,
    pub rubric_id: String,
    pub criteria_count: usize,
    pub max_score: u32,
}

#[derive(Serialize)]
pub struct UnitListResponse {
    pub default_rubric_id: String,
    pub units: Vec<UnitSummary>,
}

#[derive(Serialize)]
pub struct UnitDetailResponse {
    pub code: String,
    pub title: String,
    pub rubric: RubricDefinition,
    pub assessment_criteria: Vec<String>,
}

/// GET /api/v1/units
pub async fn handle_list_units(State(state): State<AppState>) -> Json<UnitListResponse> {
    let catalogue = state.evaluator.catalogue();
    let units = catalogue
        .units
        .iter()
        .map(|unit: &UnitSpec| {
            let rubric = catalogue.rubric_for(&unit.code);
            UnitSummary {
                code: unit.code.clone(),
                title: unit.title.clone(),
                rubric_id: rubric.id().to_string(),
                criteria_count: unit.assessment_criteria.len(),
                max_score: rubric.max_total(),
            }
        })
        .collect();

    Json(UnitListResponse {
        default_rubric_id: catalogue.default_rubric.id().to_string(),
        units,
    })
}

/// GET /api/v1/units/:code
pub async fn handle_get_unit(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<UnitDetailResponse>, AppError> {
    let catalogue = state.evaluator.catalogue();
    let unit = catalogue
        .unit(&code)
        .ok_or_else(|| AppError::NotFound(format!("Unit '{code}' not found")))?;

    Ok(Json(UnitDetailResponse {
        code: unit.code.clone(),
        title: unit.title.clone(),
        rubric: catalogue.rubric_for(&unit.code).clone(),
        assessment_criteria: unit.assessment_criteria.clone(),
    }))
}

/// POST /api/v1/evaluations
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Json<EvaluationRecord>, AppError> {
    let record = state.evaluator.evaluate(req).await?;
    Ok(Json(record))
}

/// POST /api/v1/evaluations/upload
pub async fn handle_evaluate_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EvaluationRecord>, AppError> {
    let req = read_upload(&mut multipart).await?;
    let record = state.evaluator.evaluate(req).await?;
    Ok(Json(record))
}
