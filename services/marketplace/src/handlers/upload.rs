use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::error::MarketplaceError;
use crate::handlers::extract::CurrentUser;
use crate::state::AppState;
use crate::usecase::upload::{Upload, UploadFileUseCase};

/// Text fields and files of a multipart form, keyed by field name.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Upload>,
}

impl MultipartForm {
    pub fn text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> MarketplaceError {
    MarketplaceError::invalid(format!("invalid multipart body: {}", e.body_text()))
}

/// Drain a multipart body. Parts with a file name are files; an empty file
/// part (a form submitted without choosing a file) is skipped.
pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, MarketplaceError> {
    let mut form = MultipartForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.insert(
                    name,
                    Upload {
                        file_name: Some(file_name),
                        bytes,
                    },
                );
            }
            None => {
                let text = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, text);
            }
        }
    }
    Ok(form)
}

// ── POST /uploads ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn upload_file(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), MarketplaceError> {
    let mut form = read_multipart(multipart).await?;
    let upload = form
        .file("file")
        .ok_or_else(|| MarketplaceError::invalid("file is required"))?;
    let usecase = UploadFileUseCase {
        files: state.file_store(),
    };
    let url = usecase.execute(upload).await?;
    tracing::info!(user_id = %user.id, url = %url, "file uploaded");
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}
