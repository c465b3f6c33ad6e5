//! Request extractors that reject with `AppError`
//!
//! Keeps every 4xx body in the same `{ "error": ... }` shape instead of
//! axum's plain-text rejections.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Multipart, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;
use validator::Validate;
use yomitomo_common::errors::{AppError, Result};

/// JSON body deserialized into `T`
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T: DeserializeOwned> JsonBody<T> {
    /// Decode a body that was read as raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Json(value) = Json::<T>::from_bytes(bytes).map_err(json_rejection)?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::Validation {
        message: rejection.body_text(),
        field: None,
    }
}

/// JSON body deserialized into `T` and checked with its `Validate` rules
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
{
    /// Decode and validate a body that was read as raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let JsonBody(value) = JsonBody::<T>::from_bytes(bytes)?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// One file part of a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// A fully read multipart body: text fields by name, files in upload order
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// Drain a multipart stream.
    ///
    /// File inputs left empty by the browser (no name, no bytes) are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.push(UploadedFile {
                        field: name,
                        file_name: Some(file_name).filter(|n| !n.is_empty()),
                        data,
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Raw text field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed text field that must be present and non-empty
    pub fn required_text(&self, name: &str) -> Result<&str> {
        self.text(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::MissingField {
                field: name.to_string(),
            })
    }

    /// Required field parsed into `T`
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let raw = self.required_text(name)?;
        raw.parse().map_err(|_| AppError::Validation {
            message: format!("{} is not a valid number: {}", name, raw),
            field: Some(name.to_string()),
        })
    }

    /// Files uploaded under `field`, in upload order
    pub fn files<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> + 'a {
        self.files.iter().filter(move |file| file.field == field)
    }

    /// First file uploaded under `field`
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|file| file.field == field)
    }
}

impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation {
                message: rejection.body_text(),
                field: None,
            })?;

        Self::read(multipart).await
    }
}
