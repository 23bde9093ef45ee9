//! Multipart form collection for the content editors.

use std::collections::HashMap;

use axum::extract::Multipart;

use arbor_common::{AppError, AppResult};
use arbor_core::ImageUpload;

/// A fully-read multipart form: text fields plus file uploads.
///
/// Text fields keep their raw values; file fields keep the client file
/// name and bytes. Repeated file fields accumulate.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, Vec<ImageUpload>>,
}

impl FormData {
    /// Drain a multipart stream into memory.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();

            if let Some(file_name) = field.file_name().map(ToString::to_string) {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                if !data.is_empty() {
                    form.files
                        .entry(name)
                        .or_default()
                        .push(ImageUpload { file_name, data });
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.texts.insert(name, text);
            }
        }

        Ok(form)
    }

    /// A text field's value, if the field was sent.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    /// A non-empty text field's value.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.text(name).filter(|s| !s.is_empty())
    }

    /// A required text field.
    pub fn required(&self, name: &str) -> AppResult<String> {
        self.non_empty(name)
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("Missing field: {name}")))
    }

    /// Boolean field: `true` or `1` count as set.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.text(name).map(|t| t == "true" || t == "1")
    }

    /// A `YYYY-MM-DD` date field.
    pub fn date(&self, name: &str) -> AppResult<Option<chrono::NaiveDate>> {
        self.non_empty(name)
            .map(|t| {
                chrono::NaiveDate::parse_from_str(t, "%Y-%m-%d")
                    .map_err(|_| AppError::BadRequest(format!("Invalid date in field: {name}")))
            })
            .transpose()
    }

    /// An integer field.
    pub fn int(&self, name: &str) -> AppResult<Option<i32>> {
        self.non_empty(name)
            .map(|t| {
                t.parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid number in field: {name}")))
            })
            .transpose()
    }

    /// Take the first upload sent under the given field name.
    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        self.files.get_mut(name).and_then(|v| {
            if v.is_empty() {
                None
            } else {
                Some(v.remove(0))
            }
        })
    }

    /// Take every upload sent under the given field name.
    pub fn take_files(&mut self, name: &str) -> Vec<ImageUpload> {
        self.files.remove(name).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(texts: &[(&str, &str)]) -> FormData {
        FormData {
            texts: texts
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            files: HashMap::new(),
        }
    }

    #[test]
    fn test_non_empty_filters_blank_values() {
        let form = form_with(&[("title", ""), ("body", "hello")]);
        assert_eq!(form.non_empty("title"), None);
        assert_eq!(form.non_empty("body"), Some("hello"));
    }

    #[test]
    fn test_flag_parsing() {
        let form = form_with(&[("a", "true"), ("b", "1"), ("c", "no")]);
        assert_eq!(form.flag("a"), Some(true));
        assert_eq!(form.flag("b"), Some(true));
        assert_eq!(form.flag("c"), Some(false));
        assert_eq!(form.flag("missing"), None);
    }

    #[test]
    fn test_date_parsing() {
        let form = form_with(&[("date", "2025-03-14"), ("bad", "14/03/2025")]);
        assert_eq!(
            form.date("date").unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        assert!(form.date("bad").is_err());
        assert_eq!(form.date("missing").unwrap(), None);
    }
}
