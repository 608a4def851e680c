//! Request middleware: trace identifiers and the optional HTTPS redirect.

pub mod https_redirect;
pub mod trace;

pub use https_redirect::HttpsRedirect;
pub use trace::Trace;
