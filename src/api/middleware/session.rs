use actix_web::{
    cookie::{Cookie, SameSite},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use std::{
    future::{ready, Future, Ready},
    pin::Pin,
    rc::Rc,
};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "jarvis_session";

/// Identity of the browsing session that issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for SessionId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<SessionId>()
                .copied()
                .ok_or_else(|| ErrorInternalServerError("Session middleware is not installed")),
        )
    }
}

/// Reads the session cookie, or issues a new one when it is missing or
/// malformed, and exposes the id to handlers as [`SessionId`].
pub struct SessionCookie;

impl<S, B> Transform<S, ServiceRequest> for SessionCookie
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionCookieMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionCookieMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionCookieMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionCookieMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        let existing = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
        let (id, is_new) = match existing {
            Some(id) => (id, false),
            None => (Uuid::new_v4(), true),
        };
        req.extensions_mut().insert(SessionId(id));

        Box::pin(async move {
            let mut res = srv.call(req).await?;

            if is_new {
                debug!("Issuing session cookie for {}", id);
                let cookie = Cookie::build(SESSION_COOKIE, id.to_string())
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .finish();
                res.response_mut()
                    .add_cookie(&cookie)
                    .map_err(ErrorInternalServerError)?;
            }

            Ok(res)
        })
    }
}
