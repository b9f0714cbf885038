//! The session endpoints that bridge the external identity provider.
//!
//! Sign-in itself happens at the identity provider. Its integration verifies
//! the user and posts the resulting identity to the session endpoint, which
//! stores it in a private cookie and redirects into the app.

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use maud::html;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, endpoints,
    auth::cookie::{invalidate_session_cookie, set_session_cookie},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    user::UserId,
};

/// A verified identity supplied by the identity provider.
///
/// This is the only thing the application knows about authentication: an
/// opaque subject ID plus optional profile fields. It travels in the session
/// cookie and is inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// The opaque user ID assigned by the identity provider.
    pub user_id: UserId,
    /// The email address on the identity provider profile.
    pub email: String,
    /// The first name on the identity provider profile, if any.
    pub first_name: Option<String>,
    /// The last name on the identity provider profile, if any.
    pub last_name: Option<String>,
}

/// The state needed to create or end a session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SessionState> for Key {
    fn from_ref(state: &SessionState) -> Self {
        state.cookie_key.clone()
    }
}

/// The verified identity assertion posted by the identity provider integration.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionForm {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Where to send the user once the session is established.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    redirect_url: Option<String>,
}

/// Render the sign-in page.
///
/// The form on this page stands in for the identity provider's redirect
/// handler: in a deployment the provider verifies the user and its
/// integration posts the verified identity to the session endpoint.
pub async fn get_sign_in_page(Query(query): Query<SignInQuery>) -> Response {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl my-6"
            {
                "Sign in to Tallybook"
            }

            p class="mb-4 text-sm text-gray-600 dark:text-gray-400"
            {
                "Sign-in is handled by your identity provider. \
                Continue below to establish a session."
            }

            form method="post" action=(endpoints::SESSION_API) class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="user_id" class=(FORM_LABEL_STYLE) { "User ID" }
                    input
                        id="user_id"
                        type="text"
                        name="user_id"
                        placeholder="User ID"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                    input
                        id="email"
                        type="email"
                        name="email"
                        placeholder="you@example.com"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if let Some(redirect_url) = &query.redirect_url {
                    input type="hidden" name="redirect_url" value=(redirect_url);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Sign in" }
            }
        }
    };

    base("Sign in", &content).into_response()
}

/// Establish a session from a verified identity assertion.
///
/// Stores the identity in the private cookie jar and redirects to the page
/// the user originally asked for, defaulting to the ledger.
pub async fn create_session(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    Form(form): Form<SessionForm>,
) -> Response {
    let identity = Identity {
        user_id: UserId::new(form.user_id),
        email: form.email,
        first_name: none_if_blank(form.first_name),
        last_name: none_if_blank(form.last_name),
    };

    let jar = match set_session_cookie(jar, &identity, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not set session cookie: {error}");
            return error.into_response();
        }
    };

    // Only local paths are allowed, which rules out protocol-relative "//host" URLs.
    let redirect_url = form
        .redirect_url
        .filter(|url| url.starts_with('/') && !url.starts_with("//"))
        .unwrap_or_else(|| endpoints::TRANSACTIONS_VIEW.to_owned());

    (jar, Redirect::to(&redirect_url)).into_response()
}

/// End the current session and return to the sign-in page.
pub async fn sign_out(State(_state): State<SessionState>, jar: PrivateCookieJar) -> Response {
    let jar = invalidate_session_cookie(jar);

    (jar, Redirect::to(endpoints::SIGN_IN_VIEW)).into_response()
}

fn none_if_blank(field: Option<String>) -> Option<String> {
    field
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
