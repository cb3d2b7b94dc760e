//! Microversion negotiation.
//!
//! Clients select an API version with `OpenStack-API-Version: volume 3.5`
//! (or `volume latest`). Requests without the header run at the minimum
//! version. Handlers read the negotiated [`ApiVersion`] from request
//! extensions and ask [`Capabilities`] what it enables.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;

use crate::models::ErrorResponse;

/// Request and response header carrying the microversion.
pub const VERSION_HEADER: &str = "OpenStack-API-Version";

/// Service type prefix inside the header value.
pub const SERVICE_TYPE: &str = "volume";

/// A `major.minor` API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl ApiVersion {
    pub const MIN: ApiVersion = ApiVersion::new(3, 0);
    pub const MAX: ApiVersion = ApiVersion::new(3, 5);

    /// First version exposing the messages resource.
    pub const MESSAGES: ApiVersion = ApiVersion::new(3, 3);
    /// First version honoring pagination, sorting and filters on listings.
    pub const LIST_PARAMS: ApiVersion = ApiVersion::new(3, 5);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Negotiate a version from the raw header value, if present.
    pub fn negotiate(header: Option<&str>) -> Result<Self, ErrorResponse> {
        let Some(raw) = header else {
            return Ok(Self::MIN);
        };

        let mut parts = raw.split_whitespace();
        let (Some(service), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid_header(raw));
        };
        if !service.eq_ignore_ascii_case(SERVICE_TYPE) {
            return Err(invalid_header(raw));
        }

        let version = if value.eq_ignore_ascii_case("latest") {
            Self::MAX
        } else {
            value.parse().map_err(|_| invalid_header(raw))?
        };

        if version < Self::MIN || version > Self::MAX {
            return Err(ErrorResponse::new(
                "NOT_ACCEPTABLE",
                format!(
                    "Version {} is not supported by the API. Minimum is {} and maximum is {}.",
                    version,
                    Self::MIN,
                    Self::MAX
                ),
                StatusCode::NOT_ACCEPTABLE,
            ));
        }
        Ok(version)
    }

    /// Value to echo back in the response header.
    pub fn header_value(&self) -> String {
        format!("{} {}", SERVICE_TYPE, self)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities { version: *self }
    }
}

fn invalid_header(raw: &str) -> ErrorResponse {
    ErrorResponse::bad_request(format!(
        "Invalid {} header value '{}', expected '{} <major>.<minor>'",
        VERSION_HEADER, raw, SERVICE_TYPE
    ))
}

impl FromStr for ApiVersion {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').unwrap_or((s, ""));
        Ok(Self::new(major.parse()?, minor.parse()?))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Feature switches resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    version: ApiVersion,
}

impl Capabilities {
    /// Whether the messages resource exists at this version.
    pub fn messages(&self) -> bool {
        self.version >= ApiVersion::MESSAGES
    }

    /// Whether listing parameters are honored rather than ignored.
    pub fn list_params(&self) -> bool {
        self.version >= ApiVersion::LIST_PARAMS
    }
}
