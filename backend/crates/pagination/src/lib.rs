//! Pagination primitives shared by backend collection endpoints.
//!
//! Collections are paginated by 1-indexed page number. The serving layer
//! parses caller-supplied parameters into a [`PageRequest`] (clamping the
//! page size to a bounded maximum), repositories return a [`Page`] envelope
//! carrying the items and totals, and [`PageLinks`] builds the navigation
//! links for collection responses.

mod envelope;
mod links;
mod request;

pub use envelope::Page;
pub use links::PageLinks;
pub use request::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageParamError, PageRequest};
