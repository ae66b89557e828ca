//! Context Resolver: per-request identity plus transport handles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::{AUTHORIZATION, COOKIE, ORIGIN, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Method, Uri};
use ifrof_security::{AuthError, Caller};
use parking_lot::Mutex;

/// Read-only view of the inbound request available to procedures.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    inner: Arc<RequestParts>,
}

#[derive(Debug)]
struct RequestParts {
    method: Method,
    protocol: String,
    headers: HeaderMap,
}

impl RequestHandle {
    #[must_use]
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let forwarded = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase());
        let protocol = forwarded
            .or_else(|| uri.scheme_str().map(str::to_ascii_lowercase))
            .unwrap_or_else(|| "http".to_owned());

        Self {
            inner: Arc::new(RequestParts {
                method: method.clone(),
                protocol,
                headers: headers.clone(),
            }),
        }
    }

    /// Handle for calls that do not originate from HTTP (tests, CLI, internal jobs).
    #[must_use]
    pub fn internal() -> Self {
        Self::from_parts(&Method::POST, &Uri::from_static("/"), &HeaderMap::new())
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.inner.protocol
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.inner.protocol == "https"
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.inner
            .headers
            .get(ORIGIN)
            .and_then(|v| v.to_str().ok())
    }

    /// Token from `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self
            .inner
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())?;
        let (scheme, token) = value.split_once(' ')?;
        if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
            Some(token.trim())
        } else {
            None
        }
    }

    /// Value of cookie `name` across all `Cookie` headers.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.inner
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }
}

/// Collects response-side effects (cookies) produced by a procedure.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    set_cookies: Arc<Mutex<Vec<String>>>,
    secure: bool,
}

impl ResponseHandle {
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self {
            set_cookies: Arc::default(),
            secure,
        }
    }

    pub fn set_cookie(&self, name: &str, value: &str, max_age: Duration) {
        let mut cookie = format!(
            "{name}={value}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            max_age.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        self.set_cookies.lock().push(cookie);
    }

    /// Expire cookie `name` on the client (sign-out).
    pub fn clear_cookie(&self, name: &str) {
        self.set_cookie(name, "", Duration::ZERO);
    }

    #[must_use]
    pub fn take_set_cookies(&self) -> Vec<String> {
        std::mem::take(&mut *self.set_cookies.lock())
    }
}

/// Per-request context handed to every procedure body.
#[derive(Debug, Clone)]
pub struct CallContext {
    caller: Option<Caller>,
    request: RequestHandle,
    response: ResponseHandle,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: Option<Caller>, request: RequestHandle, response: ResponseHandle) -> Self {
        Self {
            caller,
            request,
            response,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(None, RequestHandle::internal(), ResponseHandle::default())
    }

    #[must_use]
    pub fn for_caller(caller: Caller) -> Self {
        Self::new(Some(caller), RequestHandle::internal(), ResponseHandle::default())
    }

    #[must_use]
    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    /// The authenticated caller.
    ///
    /// # Errors
    /// Returns [`AuthError::Unauthenticated`] when the request carries no identity.
    pub fn require_caller(&self) -> Result<&Caller, AuthError> {
        self.caller.as_ref().ok_or(AuthError::Unauthenticated)
    }

    #[must_use]
    pub fn request(&self) -> &RequestHandle {
        &self.request
    }

    #[must_use]
    pub fn response(&self) -> &ResponseHandle {
        &self.response
    }
}

/// Derives the caller from the transport. Must never fail: anything that
/// prevents resolution yields `None` and rejection is left to the policy.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, request: &RequestHandle) -> Option<Caller>;
}

/// Resolver that treats every request as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

#[async_trait]
impl IdentityResolver for NoIdentity {
    async fn resolve(&self, _request: &RequestHandle) -> Option<Caller> {
        None
    }
}

/// Axum middleware installing a [`CallContext`] extension on every request and
/// applying cookie mutations recorded by the handler.
pub async fn resolve_context(
    State(resolver): State<Arc<dyn IdentityResolver>>,
    mut req: Request,
    next: Next,
) -> Response {
    let request = RequestHandle::from_parts(req.method(), req.uri(), req.headers());
    let caller = resolver.resolve(&request).await;
    let response_handle = ResponseHandle::new(request.is_secure());

    if let Some(caller) = caller.as_ref() {
        tracing::trace!(caller_id = %caller.id(), role = %caller.role(), "Resolved caller");
    }

    req.extensions_mut()
        .insert(CallContext::new(caller, request, response_handle.clone()));

    let mut resp = next.run(req).await;
    for cookie in response_handle.take_set_cookies() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                resp.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping invalid Set-Cookie value"),
        }
    }
    resp
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn handle(headers: &[(&'static str, &'static str)]) -> RequestHandle {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.append(*k, HeaderValue::from_static(v));
        }
        RequestHandle::from_parts(&Method::POST, &Uri::from_static("/rpc/auth.me"), &map)
    }

    #[test]
    fn reads_bearer_token() {
        let h = handle(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(h.bearer_token(), Some("abc.def.ghi"));

        let h = handle(&[("authorization", "Basic dXNlcg==")]);
        assert_eq!(h.bearer_token(), None);
    }

    #[test]
    fn reads_cookie_from_any_cookie_header() {
        let h = handle(&[("cookie", "theme=dark"), ("cookie", "a=1; ifrof_session=tok")]);
        assert_eq!(h.cookie("ifrof_session"), Some("tok"));
        assert_eq!(h.cookie("missing"), None);
    }

    #[test]
    fn protocol_honors_forwarded_proto() {
        assert_eq!(handle(&[]).protocol(), "http");
        let h = handle(&[("x-forwarded-proto", "HTTPS, http")]);
        assert_eq!(h.protocol(), "https");
        assert!(h.is_secure());
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let resp = ResponseHandle::new(true);
        resp.clear_cookie("ifrof_session");
        let cookies = resp.take_set_cookies();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("ifrof_session=; Max-Age=0"));
        assert!(cookies[0].ends_with("; Secure"));
        assert!(resp.take_set_cookies().is_empty());
    }
}
