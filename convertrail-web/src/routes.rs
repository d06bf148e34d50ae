//! HTTP routes.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Home page |
//! | POST | `/start_game` | Start or restart a game, then go to the dashboard |
//! | GET | `/game` | Dashboard |
//! | GET | `/run_test` | Test setup form |
//! | POST | `/run_test` | Run a test, then go to its results |
//! | GET | `/results/{test_id}` | Results of one test |
//! | POST | `/implement_change` | Adopt a tested variant, then go to the dashboard |
//! | GET | `/health` | Health check |
//! | GET | `/api/state` | Current game as JSON |
use axum::extract::{Form, Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use convertrail_game::{GameView, TestRequest};
use serde::Deserialize;
use std::num::IntErrorKind;

use crate::error::{Action, WebError, respond};
use crate::i18n::t;
use crate::pages::game::GamePageProps;
use crate::pages::home::HomePageProps;
use crate::pages::results::ResultsPageProps;
use crate::pages::run_test::RunTestPageProps;
use crate::pages::{GamePage, HomePage, ResultsPage, RunTestPage};
use crate::render::render_page;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/start_game", post(start_game))
        .route("/game", get(game))
        .route("/run_test", get(run_test_form).post(run_test))
        .route("/results/{test_id}", get(results))
        .route("/implement_change", post(implement_change))
        .route("/health", get(health))
        .route("/api/state", get(api_state))
        .fallback(not_found)
        .with_state(state)
}

// ── Forms ───────────────────────────────────────────────────────────

/// Fields default to empty so a missing field reads as invalid input
/// rather than a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct RunTestForm {
    #[serde(default)]
    pub element: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub days: String,
}

impl RunTestForm {
    /// # Errors
    ///
    /// Returns `WebError::BadForm` if `days` is not a non-negative integer.
    /// Durations too large for `u32` saturate, so the game rejects them as
    /// running past the horizon.
    pub fn into_request(self) -> Result<TestRequest, WebError> {
        let days = match self.days.trim().parse::<u32>() {
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => u32::MAX,
            _ => parse_field::<u32>("days", &self.days)?,
        };
        Ok(TestRequest {
            element: self.element,
            variant: self.variant,
            days,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ImplementForm {
    #[serde(default)]
    pub test_id: String,
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, WebError> {
    raw.trim().parse().map_err(|_| WebError::BadForm {
        field,
        reason: format!("{raw:?} is not a valid number"),
    })
}

// ── Pages ───────────────────────────────────────────────────────────

async fn home(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let props = HomePageProps {
        config: app.rules.config().clone(),
        has_game: app
            .with_game(&headers, Action::View, |session, _| Ok(session.is_started()))
            .unwrap_or(false),
    };
    respond(page::<HomePage>(t("app.name"), props).await).await
}

async fn start_game(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let existing = app.session_id(&headers);
    let session_id = existing.clone().unwrap_or_else(|| app.sessions.create());
    let started = app
        .sessions
        .with_session(&session_id, |session| session.start_game(&app.rules).day);
    if started.is_none() {
        return WebError::Internal(format!("session {session_id} vanished")).into_page().await;
    }

    let redirect = Redirect::to("/game");
    if existing.is_some() {
        redirect.into_response()
    } else {
        ([(SET_COOKIE, app.signer.set_cookie(&session_id))], redirect).into_response()
    }
}

async fn game(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let result = async {
        let view = app.with_game(&headers, Action::View, |session, rules| session.view(rules))?;
        page::<GamePage>(t("game.title"), GamePageProps { view }).await
    };
    respond(result.await).await
}

async fn run_test_form(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let result = async {
        let view = app.with_game(&headers, Action::View, |session, rules| session.view(rules))?;
        let props = RunTestPageProps {
            view,
            catalog: app.rules.catalog().clone(),
            test_cost_per_day: app.rules.config().test_cost_per_day,
        };
        page::<RunTestPage>(t("run_test.title"), props).await
    };
    respond(result.await).await
}

async fn run_test(
    State(app): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RunTestForm>,
) -> Response {
    let result = form.into_request().and_then(|request| {
        app.with_game(&headers, Action::RunTest, |session, rules| {
            session.run_test(rules, &request, &mut rand::thread_rng())
        })
    });
    match result {
        Ok(outcome) => Redirect::to(&format!("/results/{}", outcome.test_id)).into_response(),
        Err(err) => err.into_page().await,
    }
}

async fn results(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(test_id): Path<String>,
) -> Response {
    let result = async {
        let test_id: usize = test_id
            .parse()
            .map_err(|_| WebError::NotFound(format!("/results/{test_id}")))?;
        let result = app.with_game(&headers, Action::View, |session, rules| {
            session.test_result(rules, test_id)
        })?;
        let props = ResultsPageProps {
            result,
            implementation_cost: app.rules.config().implementation_cost,
        };
        page::<ResultsPage>(t("results.title"), props).await
    };
    respond(result.await).await
}

async fn implement_change(
    State(app): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ImplementForm>,
) -> Response {
    let result = parse_field::<usize>("test_id", &form.test_id).and_then(|test_id| {
        app.with_game(&headers, Action::ImplementChange, |session, rules| {
            session.implement_change(rules, test_id)
        })
    });
    match result {
        Ok(_) => Redirect::to("/game").into_response(),
        Err(err) => err.into_page().await,
    }
}

async fn not_found() -> Response {
    WebError::NotFound("requested path".to_string()).into_page().await
}

async fn page<C>(title: String, props: C::Properties) -> Result<Response, WebError>
where
    C: yew::BaseComponent,
    C::Properties: Send + 'static,
{
    Ok(Html(render_page::<C>(title, props).await?).into_response())
}

// ── JSON ────────────────────────────────────────────────────────────

async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK", "sessions": app.sessions.len() }))
}

async fn api_state(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GameView>, WebError> {
    app.with_game(&headers, Action::View, |session, rules| session.view(rules))
        .map(Json)
}
