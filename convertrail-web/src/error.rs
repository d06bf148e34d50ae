//! HTTP-facing error type.
use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use convertrail_game::GameError;
use convertrail_game::constants::{
    MSG_INSUFFICIENT_BUDGET_IMPLEMENT, MSG_INSUFFICIENT_BUDGET_OR_TIME,
};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::t;
use crate::pages::error::{ErrorPage, ErrorPageProps};
use crate::render::render_page;

/// Player action a game error came from; picks the message shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    RunTest,
    ImplementChange,
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("{source}")]
    Game {
        action: Action,
        #[source]
        source: GameError,
    },
    #[error("invalid form field {field}: {reason}")]
    BadForm { field: &'static str, reason: String },
    #[error("no such page: {0}")]
    NotFound(String),
    #[error("failed to render page: {0}")]
    Render(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<GameError> for WebError {
    fn from(source: GameError) -> Self {
        Self::Game {
            action: Action::View,
            source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl WebError {
    #[must_use]
    pub const fn during(action: Action, source: GameError) -> Self {
        Self::Game { action, source }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Game { source, .. } => match source {
                GameError::SessionNotStarted => "SESSION_NOT_STARTED",
                GameError::InsufficientResources { .. } => "INSUFFICIENT_RESOURCES",
                GameError::NotFound { .. } => "TEST_NOT_FOUND",
                GameError::UnknownElement { .. } => "UNKNOWN_ELEMENT",
                GameError::UnknownVariant { .. } => "UNKNOWN_VARIANT",
                GameError::InvalidDuration => "INVALID_DURATION",
                GameError::Sampling(_) => "SAMPLING_FAILED",
            },
            Self::BadForm { .. } => "BAD_FORM",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Render(_) => "RENDER_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Game { source, .. } => match source {
                GameError::SessionNotStarted => StatusCode::UNAUTHORIZED,
                GameError::InsufficientResources { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                GameError::NotFound { .. } => StatusCode::NOT_FOUND,
                GameError::UnknownElement { .. }
                | GameError::UnknownVariant { .. }
                | GameError::InvalidDuration => StatusCode::BAD_REQUEST,
                GameError::Sampling(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadForm { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Render(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the player.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Game {
                action,
                source: GameError::InsufficientResources { .. },
            } => match action {
                Action::ImplementChange => MSG_INSUFFICIENT_BUDGET_IMPLEMENT.to_string(),
                Action::RunTest | Action::View => MSG_INSUFFICIENT_BUDGET_OR_TIME.to_string(),
            },
            Self::NotFound(_) => t("error.not_found"),
            Self::Render(_) | Self::Internal(_) => t("error.title"),
            other => {
                let mut text = other.to_string();
                if let Some(first) = text.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                text.push('.');
                text
            }
        }
    }

    #[must_use]
    pub const fn is_session_missing(&self) -> bool {
        matches!(
            self,
            Self::Game {
                source: GameError::SessionNotStarted,
                ..
            }
        )
    }

    fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("request rejected ({status}): {self}");
        }
    }

    /// HTML response for browser routes.
    ///
    /// A missing session redirects to the home page; everything else renders
    /// the error page with the mapped status.
    pub async fn into_page(self) -> Response {
        if self.is_session_missing() {
            return Redirect::to("/").into_response();
        }
        self.log();
        let status = self.status_code();
        let message = self.user_message();
        let props = ErrorPageProps {
            status: status.as_u16(),
            message: message.clone(),
        };
        match render_page::<ErrorPage>(t("error.title"), props).await {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                log::error!("{err}");
                (status, message).into_response()
            }
        }
    }
}

/// JSON error body for API routes.
impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorBody {
            code: self.code(),
            message: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Unwrap a page handler's result into a response.
pub async fn respond(result: Result<Response, WebError>) -> Response {
    match result {
        Ok(response) => response,
        Err(err) => err.into_page().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convertrail_game::Shortfall;

    fn short() -> GameError {
        GameError::InsufficientResources {
            shortfall: Shortfall::Budget {
                cost: 500,
                budget: 400,
            },
        }
    }

    #[test]
    fn insufficient_resources_message_depends_on_action() {
        let test = WebError::during(Action::RunTest, short());
        assert_eq!(test.user_message(), "Insufficient budget or time.");
        assert_eq!(test.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let implement = WebError::during(Action::ImplementChange, short());
        assert_eq!(
            implement.user_message(),
            "Insufficient budget to implement change."
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            WebError::from(GameError::NotFound { test_id: 3 }).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::from(GameError::InvalidDuration).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::BadForm {
                field: "days",
                reason: "not a number".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(WebError::from(GameError::SessionNotStarted).is_session_missing());
    }

    #[test]
    fn validation_messages_are_sentences() {
        let err = WebError::from(GameError::UnknownElement {
            element: "footer".into(),
        });
        assert_eq!(err.user_message(), "Unknown element footer.");
        assert_eq!(err.code(), "UNKNOWN_ELEMENT");
    }

    #[tokio::test]
    async fn missing_session_redirects_home() {
        let response = WebError::from(GameError::SessionNotStarted).into_page().await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
    }

    #[tokio::test]
    async fn error_page_carries_status() {
        let response = WebError::from(GameError::NotFound { test_id: 9 })
            .into_page()
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
