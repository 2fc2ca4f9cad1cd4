//! The seam between this library and the network.

use crate::errors::{check, FileIOError, Ip2Error};
use crate::types::{Ip2Url, Ip2UrlRef};
use camino::Utf8Path;
use log::debug;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;

/// Ordered key-value pairs of a query string or form body.
pub type Params<'a> = [(&'a str, String)];

/// A successful response from IP2.
#[derive(Debug, Clone)]
pub struct Page {
    /// URL of the final response, after redirects were followed.
    pub url: String,
    pub text: String,
}

/// Everything IP2 is asked to do goes through a [Transport].
///
/// Endpoints are relative to [Transport::base_url] (e.g. `ip2/viewProject.html`)
/// or absolute links found in IP2 pages. Implementations keep the session
/// cookie between calls and turn non-successful status codes into
/// [Ip2Error::Status].
pub trait Transport {
    fn base_url(&self) -> &Ip2UrlRef;

    fn get(&self, endpoint: &str, query: &Params) -> Result<Page, Ip2Error>;

    /// POST an urlencoded form.
    fn post_form(&self, endpoint: &str, form: &Params) -> Result<Page, Ip2Error>;

    /// POST an urlencoded form to the DWR servlet, which wants it labeled `plain/text`.
    fn post_dwr(&self, endpoint: &str, form: &Params) -> Result<Page, Ip2Error>;

    /// POST a multipart form with `fields` followed by the contents of `file`.
    fn upload(
        &self,
        endpoint: &str,
        query: &Params,
        fields: &Params,
        file: &Utf8Path,
    ) -> Result<Page, FileIOError>;

    /// Remember a cookie, e.g. `JSESSIONID=...`, for the base URL.
    fn add_cookie(&self, cookie: &str);
}

/// [Transport] over HTTP(S) with a cookie store.
pub struct HttpTransport {
    client: Client,
    url: Ip2Url,
    jar: Arc<Jar>,
}

impl HttpTransport {
    pub fn new(url: Ip2Url) -> Result<Self, reqwest::Error> {
        let jar = Arc::new(Jar::default());
        // uploads of raw files easily take longer than any sensible timeout
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(None)
            .build()?;
        Ok(Self { client, url, jar })
    }

    fn resolve(&self, endpoint: &str) -> Result<url::Url, Ip2Error> {
        self.url
            .join(endpoint)
            .map_err(|_| Ip2Error::malformed("a valid link", endpoint))
    }

    fn send(req: RequestBuilder) -> Result<Page, Ip2Error> {
        let res = check(req.send()?)?;
        let url = res.url().to_string();
        let text = res.text()?;
        Ok(Page { url, text })
    }
}

impl Transport for HttpTransport {
    fn base_url(&self) -> &Ip2UrlRef {
        &self.url
    }

    fn get(&self, endpoint: &str, query: &Params) -> Result<Page, Ip2Error> {
        let url = self.resolve(endpoint)?;
        debug!("GET {}", url);
        Self::send(self.client.get(url).query(query))
    }

    fn post_form(&self, endpoint: &str, form: &Params) -> Result<Page, Ip2Error> {
        let url = self.resolve(endpoint)?;
        debug!("POST {}", url);
        Self::send(self.client.post(url).form(form))
    }

    fn post_dwr(&self, endpoint: &str, form: &Params) -> Result<Page, Ip2Error> {
        let url = self.resolve(endpoint)?;
        debug!("POST (DWR) {}", url);
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "plain/text")
            .body(body);
        Self::send(req)
    }

    fn upload(
        &self,
        endpoint: &str,
        query: &Params,
        fields: &Params,
        file: &Utf8Path,
    ) -> Result<Page, FileIOError> {
        let url = self.resolve(endpoint)?;
        let filename = file
            .file_name()
            .ok_or_else(|| FileIOError::PathError(file.to_string()))?
            .to_string();
        debug!("POST (multipart) {} <- {}", url, file);
        let part = Part::file(file)?
            .file_name(filename)
            .mime_str("application/octet-stream")?;
        let form = fields
            .iter()
            .fold(Form::new(), |form, (k, v)| form.text(k.to_string(), v.clone()))
            .part("file", part);
        let req = self.client.post(url).query(query).multipart(form);
        Ok(Self::send(req)?)
    }

    fn add_cookie(&self, cookie: &str) {
        if let Ok(url) = url::Url::parse(self.url.as_str()) {
            self.jar.add_cookie_str(cookie, &url);
        }
    }
}
