//! Review flow: start a session for a deck, reveal, rate, repeat.
//!
//! The session lives in the registry; the browser only holds its id in the
//! review cookie.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use crate::config;
use crate::error::AppError;
use crate::session::ReviewSession;
use crate::srs;
use crate::state::AppState;
use crate::validation;

use super::templates::{OutcomeButton, OutcomeForm, ReviewCardView, ReviewTemplate};
use super::{error_page, render};

fn review_template(session: &ReviewSession) -> ReviewTemplate {
  let (answered, total) = session.progress();
  let card = session.current_card();

  let buttons = card
    .map(|c| {
      srs::preview(&session.scheduling_state(&c.id))
        .into_iter()
        .map(|(outcome, interval)| OutcomeButton {
          value: outcome.as_str(),
          label: outcome.label(),
          interval,
        })
        .collect()
    })
    .unwrap_or_default();

  ReviewTemplate {
    deck_id: session.deck_id().to_string(),
    deck_name: session.deck_name().to_string(),
    answered,
    total,
    card: card.map(|c| ReviewCardView {
      kind: c.card_type.label(),
      question: c.question.clone(),
      answer: c.answer.clone(),
      source: c.source_preview(),
    }),
    revealed: session.is_revealed(),
    buttons,
  }
}

fn session_cookie(session_id: String) -> Cookie<'static> {
  Cookie::build((config::SESSION_COOKIE, session_id))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(time::Duration::hours(config::SESSION_EXPIRY_HOURS))
    .build()
}

fn session_id(jar: &CookieJar) -> Option<String> {
  jar.get(config::SESSION_COOKIE).map(|c| c.value().to_string())
}

/// GET /review/{deck_id}
pub async fn start(State(state): State<AppState>, jar: CookieJar, Path(deck_id): Path<String>) -> Response {
  let session = match state.review_controller().start_session(&deck_id, Utc::now()).await {
    Ok(session) => session,
    Err(AppError::NotFound(_)) => return Redirect::to("/decks").into_response(),
    Err(e) => return error_page(e),
  };

  if let Some(previous) = session_id(&jar) {
    state.sessions.remove(&previous);
  }

  let page = render(&review_template(&session));
  let id = state.sessions.insert(session);
  (jar.add(session_cookie(id)), page).into_response()
}

/// POST /review/reveal
pub async fn reveal(State(state): State<AppState>, jar: CookieJar) -> Response {
  let Some(id) = session_id(&jar) else {
    return Redirect::to("/decks").into_response();
  };

  let page = state.sessions.with_session(&id, |session| {
    if let Err(e) = session.reveal() {
      tracing::debug!("Ignoring reveal: {}", e);
    }
    review_template(session)
  });

  match page {
    Some(template) => render(&template).into_response(),
    None => Redirect::to("/decks").into_response(),
  }
}

/// POST /review/submit
pub async fn submit(State(state): State<AppState>, jar: CookieJar, Form(form): Form<OutcomeForm>) -> Response {
  let outcome = match validation::parse_outcome(&form.outcome) {
    Ok(outcome) => outcome,
    Err(e) => return error_page(e),
  };
  let Some(id) = session_id(&jar) else {
    return Redirect::to("/decks").into_response();
  };

  let page = state.sessions.with_session(&id, |session| {
    // The append handle is dropped; the write finishes on its own
    match session.submit(outcome, Utc::now()) {
      Ok(submission) => tracing::debug!(
        "Card {} rated {}, next in {} min",
        submission.card_id,
        outcome.as_str(),
        submission.step.minutes_for_log
      ),
      Err(e) => tracing::debug!("Ignoring submit: {}", e),
    }
    review_template(session)
  });

  match page {
    Some(template) => render(&template).into_response(),
    None => Redirect::to("/decks").into_response(),
  }
}
