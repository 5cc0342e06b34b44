//! Request methods and their protocol properties

use std::fmt;

/// HTTP methods the client can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

/// Which profile header carries the schema name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileHeader {
    Accept,
    Content,
}

impl ProfileHeader {
    pub fn header_name(self) -> &'static str {
        match self {
            Self::Accept => "Accept-Profile",
            Self::Content => "Content-Profile",
        }
    }
}

/// Static per-method request shaping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodProperties {
    /// A JSON body is sent
    pub body_expected: bool,
    /// The response carries a `Content-Range` to decode
    pub range_expected: bool,
    /// Value of `return=` in the `Prefer` header
    pub response_return: &'static str,
    pub profile: ProfileHeader,
}

impl RequestMethod {
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
        Self::Trace,
    ];

    pub fn properties(self) -> MethodProperties {
        let (body_expected, range_expected, response_return, profile) = match self {
            Self::Get => (false, true, "minimal", ProfileHeader::Accept),
            Self::Head => (false, false, "minimal", ProfileHeader::Accept),
            Self::Post => (true, false, "representation", ProfileHeader::Content),
            Self::Put => (true, false, "minimal", ProfileHeader::Content),
            Self::Patch => (true, false, "representation", ProfileHeader::Content),
            Self::Delete | Self::Options | Self::Trace => {
                (false, false, "minimal", ProfileHeader::Content)
            }
        };

        MethodProperties {
            body_expected,
            range_expected,
            response_return,
            profile,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RequestMethod> for reqwest::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => Self::GET,
            RequestMethod::Head => Self::HEAD,
            RequestMethod::Post => Self::POST,
            RequestMethod::Put => Self::PUT,
            RequestMethod::Patch => Self::PATCH,
            RequestMethod::Delete => Self::DELETE,
            RequestMethod::Options => Self::OPTIONS,
            RequestMethod::Trace => Self::TRACE,
        }
    }
}
