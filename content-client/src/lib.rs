//! Read-only access to the headless content backend.
//!
//! [`FetchClient`] turns page requests into `GET /api/<resource>` calls,
//! checks the status, and decodes the `{ data, meta.pagination }` envelope.
//! The HTTP layer sits behind [`Transport`] and paginators consume pages
//! through [`PageSource`], so both can be replaced in tests.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{decode_page, Collection, FetchClient, PageRequest, PageSource, SortSpec};
pub use config::{ClientConfig, ConfigError, ENV_API_TOKEN, ENV_API_URL};
pub use error::FetchError;
pub use transport::{HttpTransport, RawResponse, Transport};
