//! Representation fetcher: request, status check, adapter selection, binding.

use oslc_spec::{DomainModule, Format, ResourceType};
use tracing::debug;

use crate::error::{FetchError, ParseError, UnitError};
use crate::representation::{Document, ParsedRepresentation, Syntax};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Retrieves and parses representations through a [`Transport`].
#[derive(Clone, Copy)]
pub struct Fetcher<'t> {
    transport: &'t dyn Transport,
}

impl<'t> Fetcher<'t> {
    /// Wraps a transport.
    #[must_use]
    pub fn new(transport: &'t dyn Transport) -> Self {
        Self { transport }
    }

    /// The wrapped transport.
    #[must_use]
    pub fn transport(&self) -> &'t dyn Transport {
        self.transport
    }

    /// Sends a request and rejects non-2xx answers.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, timeout or error status.
    pub fn send_checked(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let response = self.transport.send(request)?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: response.status,
            });
        }
        Ok(response)
    }

    /// GETs `address` negotiated for `format` and parses it as a document.
    ///
    /// `accept` overrides the format's default media type.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError`] when the request or the parse fails.
    pub fn fetch_document(
        &self,
        address: &str,
        format: Format,
        accept: &str,
        domain: &'static DomainModule,
    ) -> Result<Document, UnitError> {
        let request = HttpRequest::get(address, accept)
            .with_core_version(domain.version.core_version_header());
        debug!(url = %address, accept = %accept, "fetching representation");
        let response = self.send_checked(&request)?;
        Ok(parse_response(&response, address, format, domain)?)
    }

    /// Fetches `address` and binds it to the node of `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError`] when the request, parse or bind fails.
    pub fn fetch(
        &self,
        address: &str,
        format: Format,
        resource: &ResourceType,
        domain: &'static DomainModule,
    ) -> Result<ParsedRepresentation, UnitError> {
        let document = self.fetch_document(address, format, resource.media_type(format), domain)?;
        Ok(ParsedRepresentation::bind(document, address, resource, domain)?)
    }
}

/// Parses a response body with the adapter its content type selects.
///
/// # Errors
///
/// Returns [`ParseError::UnsupportedContentType`] when no adapter applies and
/// [`ParseError::Syntax`] for malformed payloads.
pub fn parse_response(
    response: &HttpResponse,
    address: &str,
    requested: Format,
    domain: &'static DomainModule,
) -> Result<Document, ParseError> {
    let content_type = response.content_type.as_deref();
    let syntax = Syntax::from_content_type(content_type, requested).ok_or_else(|| {
        ParseError::UnsupportedContentType {
            url: address.to_string(),
            content_type: content_type.unwrap_or_default().to_string(),
        }
    })?;
    Document::parse(&response.body, syntax, address, domain)
}
