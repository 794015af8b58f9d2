use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::AppError;

/// `Json` whose rejection renders through the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejection renders through the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request(format!("Invalid id: {}", raw)))
}

/// One file out of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Body accepted either as JSON or as multipart with a `data` JSON field and an
/// optional `image` file.
pub struct JsonOrMultipart<T> {
    pub data: T,
    pub image: Option<UploadFile>,
}

impl<S, T> FromRequest<S> for JsonOrMultipart<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(data) = Json::<T>::from_request(req, state).await?;
            return Ok(Self { data, image: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let mut data = None;
        let mut image = None;
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "data" => {
                    let text = field.text().await?;
                    let parsed = serde_json::from_str::<T>(&text)
                        .map_err(|e| AppError::bad_request(format!("Invalid data field: {}", e)))?;
                    data = Some(parsed);
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or("image").to_string();
                    let bytes = field.bytes().await?.to_vec();
                    if !bytes.is_empty() {
                        image = Some(UploadFile {
                            field: "image".to_string(),
                            file_name,
                            bytes,
                        });
                    }
                }
                _ => {}
            }
        }

        let data = data.ok_or_else(|| AppError::bad_request("Missing data field"))?;
        Ok(Self { data, image })
    }
}

/// Text fields and files of a multipart upload, in arrival order.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadFile>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?.to_vec();
                    form.files.push(UploadFile {
                        field: name,
                        file_name,
                        bytes,
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.push((name, value));
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn files_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UploadFile> + 'a {
        self.files.iter().filter(move |f| f.field == name)
    }
}
