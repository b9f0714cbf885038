//! Authentication middleware that validates session cookies, extends
//! sessions, and redirects signed-out users to the sign-in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::cookie::{extend_session_cookie_duration_if_needed, get_identity_from_cookies},
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Build the sign-in page URL carrying the page the user originally asked for.
fn build_sign_in_redirect_url(request: &Request) -> String {
    let target = request
        .uri()
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or(endpoints::TRANSACTIONS_VIEW);

    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => format!("{}?{}", endpoints::SIGN_IN_VIEW, query),
        Err(_) => endpoints::SIGN_IN_VIEW.to_owned(),
    }
}

/// Middleware function that checks for a valid session cookie.
/// The identity is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a redirect to the sign-in page
/// is returned using `get_redirect`.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(identity): Extension<Identity>` to receive the identity.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let sign_in_redirect_url = build_sign_in_redirect_url(&request);

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to sign-in page.");
            return get_redirect(&sign_in_redirect_url);
        }
    };
    let identity = match get_identity_from_cookies(&jar) {
        Ok(identity) => identity,
        Err(_) => return get_redirect(&sign_in_redirect_url),
    };

    parts.extensions.insert(identity);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_session_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid session cookie.
/// The identity is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a redirect to the sign-in page
/// is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(identity): Extension<Identity>` to receive the identity.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key`
/// for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks for a valid session cookie.
/// The identity is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise an HTMX redirect to the sign-in
/// page is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(identity): Extension<Identity>` to receive the identity.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key`
/// for decrypting and verifying the cookie contents.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Router,
        extract::State,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_test::TestServer;
    use time::Duration;

    use crate::{
        app_state::create_cookie_key,
        auth::{
            AuthState, Identity,
            cookie::{COOKIE_SESSION, DEFAULT_COOKIE_DURATION, set_session_cookie},
        },
        endpoints,
        user::UserId,
    };

    use super::{auth_guard, auth_guard_hx};

    async fn test_handler() -> Html<&'static str> {
        Html("<h1>Hello, World!</h1>")
    }

    async fn stub_session_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> PrivateCookieJar {
        let identity = Identity {
            user_id: UserId::new("user_2abc"),
            email: "foo@bar.baz".to_string(),
            first_name: None,
            last_name: None,
        };

        set_session_cookie(jar, &identity, state.cookie_duration)
            .expect("could not set session cookie")
    }

    const TEST_SESSION_ROUTE: &str = "/session";
    const TEST_PROTECTED_ROUTE: &str = "/protected";
    const TEST_API_ROUTE: &str = "/api/protected";

    fn get_test_state(cookie_duration: Duration) -> AuthState {
        AuthState {
            cookie_key: create_cookie_key("nafstenoas"),
            cookie_duration,
        }
    }

    fn get_test_server(cookie_duration: Duration) -> TestServer {
        let state = get_test_state(cookie_duration);

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_SESSION_ROUTE, post(stub_session_route))
            .with_state(state.clone());

        TestServer::new(app)
    }

    fn get_test_server_hx(cookie_duration: Duration) -> TestServer {
        let state = get_test_state(cookie_duration);

        let app = Router::new()
            .route(TEST_API_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx))
            .with_state(state.clone());

        TestServer::new(app)
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(TEST_SESSION_ROUTE).await;

        response.assert_status_ok();
        let session_cookie = response.cookie(COOKIE_SESSION);

        server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(session_cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn get_protected_route_with_no_cookie_redirects_to_sign_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", TEST_PROTECTED_ROUTE)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::SIGN_IN_VIEW, expected_query);
        assert_eq!(response.header("location"), expected_location);
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_cookie_redirects_to_sign_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_SESSION, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", TEST_PROTECTED_ROUTE)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::SIGN_IN_VIEW, expected_query);
        assert_eq!(response.header("location"), expected_location);
    }

    #[tokio::test]
    async fn api_route_redirects_with_hx_redirect_header() {
        let server = get_test_server_hx(DEFAULT_COOKIE_DURATION);
        let response = server.get(TEST_API_ROUTE).await;

        response.assert_status_ok();
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", TEST_API_ROUTE)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::SIGN_IN_VIEW, expected_query);
        assert_eq!(response.header("hx-redirect"), expected_location);
    }

    #[tokio::test]
    async fn auth_guard_extends_session_cookie() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(TEST_SESSION_ROUTE).await;

        response.assert_status_ok();
        let jar = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;
        let jar = response.cookies();
        assert!(
            jar.get(COOKIE_SESSION).is_some(),
            "expected session cookie to be set by auth guard"
        );
    }
}
