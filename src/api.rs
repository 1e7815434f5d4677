// API client module: a small blocking HTTP client for the LevelOS API.
// Every call is a form-encoded POST to `<base_url>/<endpoint>`; the session
// cookie handed out by `auth.php` is attached to all later calls.

use reqwest::blocking::Client;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Serialize;
use tracing::{debug, info};

use crate::cloud::LevelCloud;
use crate::error::{Error, Rejection, Result};
use crate::store::LStore;

pub const DEFAULT_URL: &str = "https://os.leveloper.cc";

const AUTH_ENDPOINT: &str = "auth.php";

/// Login request payload.
#[derive(Serialize, Debug)]
pub struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// What came back over the wire, before any status validation.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    /// Every `Set-Cookie` header value, in the order received.
    pub set_cookies: Vec<String>,
}

/// A validated response from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Sends one form-encoded POST and reports the raw outcome. The production
/// implementation is [`HttpTransport`]; tests substitute a scripted one.
pub trait Transport {
    fn post_form<F>(&self, url: &str, form: &F, cookie: Option<&str>) -> Result<RawResponse>
    where
        F: Serialize + ?Sized;
}

/// `reqwest` blocking transport. No timeout is configured beyond the
/// client's default.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post_form<F>(&self, url: &str, form: &F, cookie: Option<&str>) -> Result<RawResponse>
    where
        F: Serialize + ?Sized,
    {
        let mut req = self.client.post(url).form(form);
        if let Some(cookie) = cookie {
            req = req.header(COOKIE, cookie);
        }
        let res = req.send()?;
        let status = res.status().as_u16();
        let set_cookies = res
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = res.text()?;
        Ok(RawResponse {
            status,
            body,
            set_cookies,
        })
    }
}

/// The credential obtained at login. Lives only in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    cookie: String,
}

impl Session {
    /// Keep the `name=value` part of every `Set-Cookie` header and drop the
    /// attributes (`Path`, `Expires`, ...).
    fn from_set_cookies(headers: &[String]) -> Option<Self> {
        let pairs: Vec<&str> = headers
            .iter()
            .filter_map(|h| h.split(';').next())
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(Session {
                cookie: pairs.join("; "),
            })
        }
    }
}

/// Milliseconds since the Unix epoch, unless the caller supplied one.
pub fn timestamp_or_now(timestamp: Option<i64>) -> i64 {
    timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
}

/// The numeric code carried in a response body, if the body is an integer.
///
/// Accepts an optional sign followed by decimal digits, with single
/// underscores allowed between digits. Values beyond `i64` saturate, so an
/// oversized code still reads as "not 200".
fn body_code(body: &str) -> Option<i64> {
    let text = body.trim();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let well_formed = !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'_');
    if !well_formed {
        return None;
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let signed = if negative { format!("-{}", cleaned) } else { cleaned };
    Some(match signed.parse::<i64>() {
        Ok(code) => code,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    })
}

/// Check both success signals of a response: the HTTP status must be 200,
/// and a body that reads as an integer must equal 200. A body that is not
/// a number counts as success.
pub fn validate(status: u16, body: &str) -> std::result::Result<(), Rejection> {
    if status != 200 {
        return Err(Rejection::Http(status));
    }
    match body_code(body) {
        Some(code) if code != 200 => Err(Rejection::Body(code)),
        _ => Ok(()),
    }
}

/// Client for the LevelOS API. Holds the transport, the base URL and the
/// session established by [`ApiClient::login`].
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient<HttpTransport> {
    /// Client talking to `base_url` over HTTP.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_transport(base_url, HttpTransport::new()?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        ApiClient {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Authenticate and keep the session cookie for all later calls.
    pub fn login(&mut self, username: &str, password: &str) -> Result<ApiResponse> {
        let form = AuthRequest { username, password };
        debug!(endpoint = AUTH_ENDPOINT, "POST");
        let raw = self.transport.post_form(&self.url(AUTH_ENDPOINT), &form, None)?;
        validate(raw.status, &raw.body).map_err(Error::Authentication)?;

        let session = Session::from_set_cookies(&raw.set_cookies).ok_or(Error::MissingSessionCookie)?;
        self.session = Some(session);
        info!(user = username, "logged in");

        Ok(ApiResponse {
            status: raw.status,
            body: raw.body,
        })
    }

    /// POST `form` to `endpoint` with the session cookie attached.
    pub fn post<F>(&self, endpoint: &str, form: &F) -> Result<ApiResponse>
    where
        F: Serialize + ?Sized,
    {
        let session = self.session.as_ref().ok_or(Error::NotLoggedIn)?;
        debug!(endpoint, "POST");
        let raw = self
            .transport
            .post_form(&self.url(endpoint), form, Some(&session.cookie))?;
        if let Err(rejection) = validate(raw.status, &raw.body) {
            debug!(endpoint, %rejection, "rejected");
            return Err(Error::UnexpectedStatus(rejection));
        }
        Ok(ApiResponse {
            status: raw.status,
            body: raw.body,
        })
    }

    /// File operations on the cloud drive.
    pub fn cloud(&self) -> LevelCloud<'_, T> {
        LevelCloud::new(self)
    }

    /// The project store.
    pub fn store(&self) -> LStore<'_, T> {
        LStore::new(self)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::cloud::PathRequest;

    #[test]
    fn validate_accepts_ok_status_and_plain_text() {
        assert_eq!(validate(200, "200"), Ok(()));
        assert_eq!(validate(200, "pkg-4f2a"), Ok(()));
        assert_eq!(validate(200, ""), Ok(()));
        assert_eq!(validate(200, " 200\n"), Ok(()));
    }

    #[test]
    fn validate_rejects_numeric_body() {
        assert_eq!(validate(200, "404"), Err(Rejection::Body(404)));
        assert_eq!(validate(200, "-1"), Err(Rejection::Body(-1)));
    }

    #[test]
    fn validate_rejects_codes_beyond_i64() {
        assert_eq!(validate(200, "99999999999999999999"), Err(Rejection::Body(i64::MAX)));
        assert_eq!(validate(200, "-99999999999999999999"), Err(Rejection::Body(i64::MIN)));
    }

    #[test]
    fn validate_reads_signs_and_digit_separators() {
        assert_eq!(validate(200, "1_000"), Err(Rejection::Body(1000)));
        assert_eq!(validate(200, "+200"), Ok(()));
        assert_eq!(validate(200, "2_00"), Ok(()));
        assert_eq!(validate(200, "0200"), Ok(()));
    }

    #[test]
    fn validate_keeps_malformed_numbers_as_text() {
        assert_eq!(validate(200, "1__000"), Ok(()));
        assert_eq!(validate(200, "_404"), Ok(()));
        assert_eq!(validate(200, "404_"), Ok(()));
        assert_eq!(validate(200, "+"), Ok(()));
        assert_eq!(validate(200, "4 04"), Ok(()));
        assert_eq!(validate(200, "404.0"), Ok(()));
    }

    #[test]
    fn validate_prefers_http_status_over_body() {
        assert_eq!(validate(500, "200"), Err(Rejection::Http(500)));
        assert_eq!(validate(403, "not a number"), Err(Rejection::Http(403)));
    }

    #[test]
    fn explicit_timestamp_wins() {
        assert_eq!(timestamp_or_now(Some(1234)), 1234);
    }

    #[test]
    fn default_timestamp_is_now_in_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let ts = timestamp_or_now(None);
        let after = chrono::Utc::now().timestamp_millis();
        assert!(before <= ts && ts <= after);
    }

    #[test]
    fn login_stores_cookie_used_by_later_calls() {
        let transport = ScriptedTransport::default().reply_with_cookies(
            200,
            "200",
            &["PHPSESSID=xyz; path=/; HttpOnly"],
        );
        let mut api = ApiClient::with_transport("https://os.example/", transport);
        api.login("alice", "secret").unwrap();
        assert!(api.is_logged_in());

        api.post("cMkDir.php", &PathRequest { path: "temp-x" }).unwrap();
        api.post("cDelete.php", &PathRequest { path: "temp-x" }).unwrap();

        let calls = api.transport().calls.borrow();
        assert_eq!(calls[0].url, "https://os.example/auth.php");
        assert_eq!(calls[0].field("username"), Some("alice"));
        assert_eq!(calls[0].field("password"), Some("secret"));
        assert_eq!(calls[0].cookie, None);
        for call in &calls[1..] {
            assert_eq!(call.cookie.as_deref(), Some("PHPSESSID=xyz"));
        }
    }

    #[test]
    fn login_joins_multiple_cookies_into_one_credential() {
        let transport = ScriptedTransport::default().reply_with_cookies(
            200,
            "ok",
            &["a=1; Path=/", "b=2"],
        );
        let mut api = ApiClient::with_transport("https://os.example", transport);
        api.login("u", "p").unwrap();
        api.post("cMkDir.php", &PathRequest { path: "x" }).unwrap();
        let calls = api.transport().calls.borrow();
        assert_eq!(calls[1].cookie.as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn login_rejects_bad_status() {
        let transport = ScriptedTransport::default().reply_with_cookies(401, "", &["a=1"]);
        let mut api = ApiClient::with_transport("https://os.example", transport);
        let err = api.login("u", "p").unwrap_err();
        assert!(matches!(err, Error::Authentication(Rejection::Http(401))));
        assert!(!api.is_logged_in());
    }

    #[test]
    fn login_rejects_numeric_body_code() {
        let transport = ScriptedTransport::default().reply_with_cookies(200, "403", &["a=1"]);
        let mut api = ApiClient::with_transport("https://os.example", transport);
        let err = api.login("u", "p").unwrap_err();
        assert!(matches!(err, Error::Authentication(Rejection::Body(403))));
    }

    #[test]
    fn login_without_cookie_fails() {
        let transport = ScriptedTransport::default().reply(200, "200");
        let mut api = ApiClient::with_transport("https://os.example", transport);
        assert!(matches!(api.login("u", "p"), Err(Error::MissingSessionCookie)));
    }

    #[test]
    fn post_before_login_never_hits_the_network() {
        let api = ApiClient::with_transport("https://os.example", ScriptedTransport::default());
        let err = api.post("cMkDir.php", &PathRequest { path: "x" }).unwrap_err();
        assert!(matches!(err, Error::NotLoggedIn));
        assert!(api.transport().calls.borrow().is_empty());
    }

    #[test]
    fn post_reports_http_status_regardless_of_body() {
        let api = logged_in(ScriptedTransport::default().reply(500, "200"));
        let err = api.post("cMkDir.php", &PathRequest { path: "x" }).unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatus(Rejection::Http(500))));
    }

    #[test]
    fn post_reports_body_code() {
        let api = logged_in(ScriptedTransport::default().reply(200, "418"));
        let err = api.post("cMkDir.php", &PathRequest { path: "x" }).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::Body(418)));
    }

    #[test]
    fn post_accepts_non_numeric_body() {
        let api = logged_in(ScriptedTransport::default().reply(200, "done"));
        let res = api.post("cMkDir.php", &PathRequest { path: "x" }).unwrap();
        assert_eq!(res.text(), "done");
    }
}
