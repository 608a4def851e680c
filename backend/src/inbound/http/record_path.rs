//! Record identifiers taken from the request path.
//!
//! Update and delete routes capture everything after the operation name with
//! an `{id:.*}` segment. Only the last `/`-separated piece names the record,
//! so `/api/person/delete/a/b` targets `b` and `/api/person/delete/` targets
//! the empty identifier, which no record holds.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::RecordId;

const ID_SEGMENT: &str = "id";

/// Identifier in the trailing path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPath(pub RecordId);

impl RecordPath {
    /// Identifier named by the last segment of `tail`.
    pub fn from_tail(tail: &str) -> Self {
        Self(RecordId::new(tail.rsplit('/').next().unwrap_or_default()))
    }

    /// The record identifier.
    pub fn into_inner(self) -> RecordId {
        self.0
    }
}

impl FromRequest for RecordPath {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let tail = req.match_info().get(ID_SEGMENT).unwrap_or_default();
        ready(Ok(Self::from_tail(tail)))
    }
}
