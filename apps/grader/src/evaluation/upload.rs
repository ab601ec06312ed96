//! Multipart upload decoding: form fields and file payloads to plain text.

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::evaluation::assembler::EvaluationRequest;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Reads the upload form into an `EvaluationRequest`. Unknown fields are
/// ignored; `unit_code` and `assignment` are required.
pub async fn read_upload(multipart: &mut Multipart) -> Result<EvaluationRequest, AppError> {
    let mut request = EvaluationRequest::default();
    let mut unit_code = None;
    let mut assignment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;

        match name.as_str() {
            "unit_code" => unit_code = Some(utf8_field(&name, data)?),
            "learner_name" => request.learner_name = non_empty(utf8_field(&name, data)?),
            "learner_id" => request.learner_id = non_empty(utf8_field(&name, data)?),
            "rubric" => {
                let text =
                    payload_text(file_name.as_deref(), content_type.as_deref(), data).await?;
                request.rubric_text = non_empty(text);
            }
            "assignment" => {
                assignment =
                    Some(payload_text(file_name.as_deref(), content_type.as_deref(), data).await?);
            }
            other => debug!(field = other, "ignoring unknown upload field"),
        }
    }

    request.unit_code =
        unit_code.ok_or_else(|| AppError::Validation("Missing field 'unit_code'".to_string()))?;
    request.assignment_text =
        assignment.ok_or_else(|| AppError::Validation("Missing field 'assignment'".to_string()))?;
    Ok(request)
}

/// Text of one uploaded payload. PDFs are extracted on a blocking thread;
/// everything else must already be UTF-8.
pub async fn payload_text(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<String, AppError> {
    if is_pdf(file_name, content_type, &data) {
        return extract_pdf_text(data).await;
    }
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::Validation("non-text submission".to_string()))
}

fn is_pdf(file_name: Option<&str>, content_type: Option<&str>, data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
        || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || file_name.is_some_and(|f| f.to_ascii_lowercase().ends_with(".pdf"))
}

async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    let size = data.len();
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await;

    match extracted {
        Ok(Ok(text)) => {
            debug!(bytes = size, chars = text.len(), "extracted PDF text");
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {e}");
            Err(AppError::UnprocessableEntity(
                "Could not extract text from PDF".to_string(),
            ))
        }
        // pdf-extract can panic on malformed documents.
        Err(e) if e.is_panic() => {
            warn!("PDF extraction panicked");
            Err(AppError::UnprocessableEntity(
                "Could not extract text from PDF".to_string(),
            ))
        }
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "spawn_blocking failed in PDF extraction: {e}"
        ))),
    }
}

fn utf8_field(name: &str, data: Bytes) -> Result<String, AppError> {
    String::from_utf8(data.to_vec())
        .map(|s| s.trim().to_string())
        .map_err(|_| AppError::Validation(format!("Field '{name}' must be UTF-8 text")))
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
