use core::fmt::{self, Display, Formatter};

/// HTTP status reported by the download step that fetched the content
///
/// Only a handful of codes carry meaning for the receive workflow; every other
/// value is kept verbatim in `Unknown`. A value of `0` means the download step
/// did not report a status at all.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FetchStatus {
    Ok,
    BadRequest,
    NotFound,
    Unknown(u16),
}

impl FetchStatus {
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Unknown(code) => code,
        }
    }

    /// Checks if the relay reported a failure
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.code() >= 400
    }

    /// Checks if the relay considers the content gone or the request malformed,
    /// making the pending notification for it stale.
    #[must_use]
    pub const fn is_stale_notification(self) -> bool {
        matches!(self, Self::BadRequest | Self::NotFound)
    }
}

impl From<u16> for FetchStatus {
    fn from(value: u16) -> Self {
        match value {
            200 => Self::Ok,
            400 => Self::BadRequest,
            404 => Self::NotFound,
            _ => Self::Unknown(value),
        }
    }
}

impl From<FetchStatus> for u16 {
    fn from(value: FetchStatus) -> Self {
        value.code()
    }
}

impl Display for FetchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "200 OK"),
            Self::BadRequest => write!(f, "400 Bad Request"),
            Self::NotFound => write!(f, "404 Not Found"),
            Self::Unknown(code) => write!(f, "{code}"),
        }
    }
}
