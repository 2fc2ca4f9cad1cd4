//! NewType for the address of an IP2 instance.

use crate::errors::InvalidIp2Url;
use aliri_braid::braid;

/// An [Ip2Url] is the base URL of an IP2 instance, e.g.
/// `http://goldfish.scripps.edu`
///
/// Endpoints such as `ip2/viewProject.html` are joined onto it.
#[braid(validator, serde)]
pub struct Ip2Url(String);

impl aliri_braid::Validator for Ip2Url {
    type Error = InvalidIp2Url;

    fn validate(s: &str) -> Result<(), Self::Error> {
        if !(s.starts_with("http://") || s.starts_with("https://")) {
            return Err(InvalidIp2Url::Protocol(s.to_string()));
        }
        url::Url::parse(s)
            .map(|_| ())
            .map_err(|e| InvalidIp2Url::Parse(s.to_string(), e))
    }
}

impl Ip2UrlRef {
    /// Resolve an endpoint or link against this base URL.
    ///
    /// Relative endpoints replace the last path segment of the base,
    /// absolute links are returned as-is.
    pub fn join(&self, endpoint: &str) -> Result<url::Url, url::ParseError> {
        url::Url::parse(self.as_str())?.join(endpoint)
    }
}
