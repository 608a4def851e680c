//! Roster: person and user records behind a credential login.
//!
//! Hexagonal layout: `domain` holds entities, services and ports; `inbound`
//! adapts HTTP onto the driving ports; `outbound` implements the driven ports
//! over PostgreSQL, memory and bcrypt; `server` wires it all together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
