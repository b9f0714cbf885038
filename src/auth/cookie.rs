//! Defines functions for storing the session identity in private cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{Error, auth::Identity};

/// The cookie holding the JSON-encoded session identity.
pub const COOKIE_SESSION: &str = "session";
/// The cookie holding the session expiry date-time.
pub const COOKIE_EXPIRY: &str = "expiry";
/// The default duration for which session cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

/// Add session cookies to the cookie jar, indicating that a user is signed in.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
/// You can use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookies added.
///
/// # Errors
///
/// Returns an [Error::JsonSerializationError] if the identity cannot be
/// serialized, or an [Error::InvalidDateFormat] if the expiry time cannot be
/// formatted.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    identity: &Identity,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let payload = serde_json::to_string(identity)
        .map_err(|error| Error::JsonSerializationError(error.to_string()))?;

    let expiry = OffsetDateTime::now_utc() + duration;
    // Use format instead of to_string to avoid errors at midnight when the hour is printed as
    // a single digit when [DATE_TIME_FORMAT] expects two digits.
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    Ok(jar
        .add(
            Cookie::build((COOKIE_SESSION, payload))
                .expires(expiry)
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        )
        .add(
            Cookie::build((COOKIE_EXPIRY, expiry_string))
                .expires(expiry)
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        ))
}

/// Set the session cookies to an invalid value and set their max age to zero,
/// which should delete the cookies on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
    .add(
        Cookie::build((COOKIE_EXPIRY, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the expiry of the session cookies in `jar` to the latest of UTC now
/// plus `duration` and the cookies' current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns an [Error::SessionMissing] if either cookie is absent, or an
/// [Error::InvalidDateFormat] if the expiry cannot be parsed or formatted.
pub fn extend_session_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::SessionMissing)?;
    let current_expiry = extract_date_time(&expiry_cookie)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or(Error::InvalidDateFormat(
            "date-time overflow".to_string(),
            duration.to_string(),
        ))?;

    let expiry = max(current_expiry, new_expiry);

    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    let mut session_cookie = jar.get(COOKIE_SESSION).ok_or(Error::SessionMissing)?;
    let mut expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::SessionMissing)?;

    session_cookie.set_expires(expiry);
    expiry_cookie.set_expires(expiry);
    expiry_cookie.set_value(expiry_string);

    Ok(jar.add(session_cookie).add(expiry_cookie))
}

/// Read the session identity back out of the cookie jar.
///
/// # Errors
///
/// Returns an [Error::SessionMissing] if the session cookie is absent, cannot
/// be decoded, or the recorded expiry has passed.
pub fn get_identity_from_cookies(jar: &PrivateCookieJar) -> Result<Identity, Error> {
    let session_cookie = jar.get(COOKIE_SESSION).ok_or(Error::SessionMissing)?;
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::SessionMissing)?;

    let expiry = extract_date_time(&expiry_cookie).map_err(|_| Error::SessionMissing)?;

    if expiry < OffsetDateTime::now_utc() {
        return Err(Error::SessionMissing);
    }

    serde_json::from_str(session_cookie.value_trimmed()).map_err(|_| Error::SessionMissing)
}

fn extract_date_time(cookie: &Cookie) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::parse(cookie.value_trimmed(), DATE_TIME_FORMAT).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), cookie.value_trimmed().to_string())
    })
}
