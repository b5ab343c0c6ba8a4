//! OAuth 1.0a and OAuth 2.0 client handshakes: request signing, token exchanges, and
//! per-provider request shaping driven by data-only provider descriptors.
//!
//! A [`flows::Client`] binds one [`provider::ProviderDescriptor`] to one set of
//! [`auth::ClientCredentials`] and one [`http::HttpTransport`]. The OAuth 1.0a flow walks
//! request token → authorize URL → access token, the OAuth 2.0 flow builds the authorize URL
//! and exchanges the returned code, and [`flows::Client::build_request`] decorates every
//! later API call with the credentials the descriptor asks for.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod encode;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod request;
pub mod response;
pub mod sign;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use oauth2::http::{HeaderMap, HeaderValue, Method};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
