use crate::{errors::FrontendResult, session::Session};
use errors::FrontendError;
use http::{Method, StatusCode};
use jokebox_common::user::UserIdentity;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    sync::{Arc, PoisonError, RwLock},
};

pub mod admin;
pub mod comment;
pub mod errors;
pub mod feed;
pub mod joke;
pub mod session;
pub mod social;
pub mod user;

/// Client for the jokes REST api.
///
/// Cloning is cheap and all clones share the same [Session].
#[derive(Clone, Debug)]
pub struct ApiClient {
    #[cfg(not(target_family = "wasm"))]
    client: reqwest::Client,
    base_url: String,
    session: Arc<RwLock<Session>>,
}

impl ApiClient {
    #[cfg(not(target_family = "wasm"))]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[cfg(not(target_family = "wasm"))]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Default::default(),
        }
    }

    #[cfg(target_family = "wasm")]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Default::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_session(&self, session: Session) {
        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.session().identity().cloned()
    }

    fn token(&self) -> Option<String> {
        self.session().token().map(ToString::to_string)
    }

    async fn get<T, R>(&self, endpoint: &str, query: Option<R>) -> FrontendResult<T>
    where
        T: for<'de> Deserialize<'de>,
        R: Serialize + Debug,
    {
        self.send(Method::GET, endpoint, query).await
    }

    async fn post<T, R>(&self, endpoint: &str, params: Option<R>) -> FrontendResult<T>
    where
        T: for<'de> Deserialize<'de>,
        R: Serialize + Debug,
    {
        self.send(Method::POST, endpoint, params).await
    }

    async fn delete<T, R>(&self, endpoint: &str, query: Option<R>) -> FrontendResult<T>
    where
        T: for<'de> Deserialize<'de>,
        R: Serialize + Debug,
    {
        self.send(Method::DELETE, endpoint, query).await
    }

    #[cfg(not(target_family = "wasm"))]
    async fn send<P, T>(&self, method: Method, path: &str, params: Option<P>) -> FrontendResult<T>
    where
        P: Serialize + Debug,
        T: for<'de> Deserialize<'de>,
    {
        let url = self.request_endpoint(path);
        let mut req = self.client.request(method.clone(), &url);
        if let Some(params) = &params {
            req = if uses_query(&method) {
                req.query(params)
            } else {
                req.json(params)
            };
        }
        if let Some(token) = self.token() {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        Self::response(status.as_u16(), text, &url)
    }

    #[cfg(target_family = "wasm")]
    fn send<'a, P, T>(
        &'a self,
        method: Method,
        path: &'a str,
        params: Option<P>,
    ) -> impl std::future::Future<Output = FrontendResult<T>> + Send + 'a
    where
        P: Serialize + Debug + 'a,
        T: for<'de> Deserialize<'de>,
    {
        use gloo_net::http::RequestBuilder;
        use jokebox_common::AUTH_HEADER_SCHEME;
        use send_wrapper::SendWrapper;

        SendWrapper::new(async move {
            let mut url = self.request_endpoint(path);
            if uses_query(&method) {
                if let Some(params) = &params {
                    // Cannot pass the query directly but need to convert it manually
                    // https://github.com/rustwasm/gloo/issues/378
                    url = format!("{url}?{}", serde_urlencoded::to_string(params)?);
                }
            }
            let mut builder = RequestBuilder::new(&url).method(method.clone());
            if let Some(token) = self.token() {
                builder =
                    builder.header("Authorization", &format!("{AUTH_HEADER_SCHEME} {token}"));
            }
            let req = match (&params, uses_query(&method)) {
                (Some(params), false) => builder.json(params)?,
                _ => builder.build()?,
            };
            let res = req.send().await?;
            let status = res.status();
            let text = res.text().await?;
            Self::response(status, text, &url)
        })
    }

    fn response<T>(status: u16, text: String, url: &str) -> FrontendResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let success = StatusCode::from_u16(status)
            .map(|s| s.is_success())
            .unwrap_or(false);
        if !success {
            info!("API error: {text} on {url} status {status}");
            return Err(FrontendError::new(text.trim()));
        }
        // eg 204 No Content after a vote
        let body = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };
        serde_json::from_str(body).map_err(|e| {
            info!("Failed to deserialize api response: {e} from {text} on {url}");
            FrontendError::new(format!("Invalid response from {url}: {e}"))
        })
    }

    fn request_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn uses_query(method: &Method) -> bool {
    *method == Method::GET || *method == Method::DELETE
}

/// Logs a failed request and turns it into `None`.
pub fn result_to_option<T>(val: FrontendResult<T>) -> Option<T> {
    match val {
        Ok(v) => Some(v),
        Err(e) => {
            error!("API error: {e}");
            None
        }
    }
}
