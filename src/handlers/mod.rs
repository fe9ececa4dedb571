pub mod api;
pub mod pages;
pub mod review;
pub mod templates;

use askama::Template;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::upload;
use templates::ErrorTemplate;

/// Render a template, logging instead of failing the request
fn render(template: &impl Template) -> Html<String> {
  Html(template.render().unwrap_or_else(|e| {
    tracing::error!("Template render failed: {}", e);
    String::new()
  }))
}

/// Error page for form submissions
fn error_page(err: AppError) -> Response {
  let status = err.status();
  if status.is_server_error() {
    tracing::error!("{}", err);
  }
  let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
    "Something went wrong. Please try again.".to_string()
  } else {
    err.to_string()
  };
  (status, render(&ErrorTemplate { message })).into_response()
}

fn format_relative_time(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let duration = dt.signed_duration_since(now);

  let minutes = duration.num_minutes();
  let hours = duration.num_hours();
  let days = duration.num_days();

  if minutes < 1 {
    "now".to_string()
  } else if minutes < 60 {
    format!("in {} minute{}", minutes, if minutes == 1 { "" } else { "s" })
  } else if hours < 24 {
    format!("in {} hour{}", hours, if hours == 1 { "" } else { "s" })
  } else if days == 1 {
    "tomorrow".to_string()
  } else {
    format!("in {} days", days)
  }
}

/// Fields of a generation form: pasted text, an optional file, a card count
#[derive(Debug, Default)]
struct GenerateForm {
  text: String,
  file_text: Option<String>,
  max_items: Option<i64>,
}

impl GenerateForm {
  /// Pasted text wins over the uploaded file
  fn source_text(&self) -> &str {
    if self.text.trim().is_empty() {
      self.file_text.as_deref().unwrap_or("")
    } else {
      &self.text
    }
  }
}

async fn read_generate_form(mut multipart: Multipart) -> Result<GenerateForm> {
  let mut form = GenerateForm::default();

  while let Some(field) = multipart.next_field().await? {
    let name = field.name().unwrap_or_default().to_string();
    match name.as_str() {
      "text" => form.text = field.text().await?,
      "max_items" => form.max_items = field.text().await?.trim().parse().ok(),
      "file" => {
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        // Browsers send an empty part when no file was chosen
        if !file_name.is_empty() || !bytes.is_empty() {
          form.file_text = Some(upload::extract_text(&file_name, content_type.as_deref(), &bytes)?);
        }
      }
      _ => {}
    }
  }

  Ok(form)
}
