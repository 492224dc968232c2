//! Resource locator: turns a test group into candidate instance addresses.
//!
//! Traversal is driven by the group domain's [`DiscoveryProfile`]: a path of
//! qualified property names from the catalog to providers, and from a
//! provider to query capabilities or creation factories. The same
//! interpreter walks OSLC 2.0 catalogs and CM 1.0 service descriptions.
//!
//! [`DiscoveryProfile`]: oslc_spec::DiscoveryProfile

use oslc_spec::{DomainId, DomainModule, Format, SpecVersion};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::DiscoveryError;
use crate::fetcher::Fetcher;
use crate::representation::{
    dedup, expand_name, resolve, Document, Entry, NodeRef, PropertyValue, Syntax,
};
use crate::suite::{DiscoveryPath, TestGroupSpec};

/// Override key that pins traversal to one service provider.
pub const PINNED_PROVIDER: &str = "ServiceProvider";

/// A query capability or creation factory found on a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// Query base or creation URL.
    pub url: String,
    /// Resource types the capability declares, expanded.
    pub resource_types: Vec<String>,
}

/// Resolves candidate addresses for test groups.
pub struct Locator<'a> {
    config: &'a Config,
    fetcher: Fetcher<'a>,
}

/// Serialization used for catalog, provider and query base documents.
fn discovery_format(version: SpecVersion) -> Format {
    match version {
        SpecVersion::V1 => Format::Xml,
        SpecVersion::V2 => Format::RdfXml,
    }
}

/// Format and media type for a query base, following the syntax the
/// provider served its catalog in.
fn query_base_negotiation(group: &TestGroupSpec, served: Syntax) -> (Format, &'static str) {
    match served {
        Syntax::RdfXml => (Format::RdfXml, group.resource_type.media_type(Format::RdfXml)),
        Syntax::Turtle => (Format::RdfXml, "text/turtle"),
        Syntax::Xml => (Format::Xml, group.resource_type.media_type(Format::Xml)),
        Syntax::Json => (Format::Json, group.resource_type.media_type(Format::Json)),
    }
}

/// Media type to request for a discovery document of `type_name`.
fn accept_for(domain: &DomainModule, type_name: &str, format: Format) -> &'static str {
    domain
        .resource_types
        .iter()
        .find(|r| r.type_name == type_name)
        .map_or_else(|| format.media_type(), |r| r.media_type(format))
}

/// Address carried by a value: a reference, or a URL given as text.
fn entry_address(entry: &Entry, base: &str) -> Option<String> {
    match &entry.value {
        PropertyValue::Resource(address) => Some(address.clone()),
        PropertyValue::Literal(text) if !text.trim().is_empty() => Some(resolve(base, text.trim())),
        _ => None,
    }
}

/// Walks `path` from `node`, returning the entries reached by the last step.
fn walk(
    document: &Document,
    node: &NodeRef,
    path: &[&str],
    domain: &DomainModule,
) -> Result<Vec<Entry>, DiscoveryError> {
    let mut frontier = vec![Entry {
        value: PropertyValue::Node,
        node: Some(node.clone()),
    }];
    for step in path {
        let iri = expand_name(domain, step)?;
        let mut next = Vec::new();
        for entry in &frontier {
            if let Some(node) = &entry.node {
                next.extend(document.children(node, &iri)?);
            }
        }
        frontier = next;
    }
    Ok(frontier)
}

impl<'a> Locator<'a> {
    /// Creates a locator over a configuration and a fetcher.
    #[must_use]
    pub fn new(config: &'a Config, fetcher: Fetcher<'a>) -> Self {
        Self { config, fetcher }
    }

    /// Candidate instance addresses for `group`, deduplicated in order.
    ///
    /// A configured override for the group's resource type short-circuits
    /// discovery without any request.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when a discovery document cannot be
    /// retrieved, parsed or traversed.
    pub fn locate(&self, group: &TestGroupSpec) -> Result<Vec<String>, DiscoveryError> {
        if let Some(address) = self.config.override_for(group.resource_type.name) {
            debug!(group = %group.label(), address, "using configured instance");
            return Ok(vec![address.to_string()]);
        }
        let profile = group.domain.discovery;
        let addresses = match group.discovery {
            DiscoveryPath::Catalog => vec![self.base_uri()?.to_string()],
            DiscoveryPath::ServiceProviders => self.provider_addresses(group)?,
            DiscoveryPath::QueryCapabilities => {
                self.matching_urls(group, profile.query_path, profile.query_base)?
            }
            DiscoveryPath::CreationFactories => {
                self.matching_urls(group, profile.creation_path, profile.creation_base)?
            }
            DiscoveryPath::Instances => self.instances(group)?,
        };
        Ok(dedup(addresses))
    }

    fn base_uri(&self) -> Result<&str, DiscoveryError> {
        self.config
            .base_uri
            .as_deref()
            .ok_or(DiscoveryError::MissingBaseUri)
    }

    /// Fetches `address` and binds the node of `type_name`.
    fn discovery_document(
        &self,
        address: &str,
        type_name: &str,
        domain: &'static DomainModule,
    ) -> Result<(Document, NodeRef), DiscoveryError> {
        let format = discovery_format(domain.version);
        let accept = accept_for(domain, type_name, format);
        let document = self.fetcher.fetch_document(address, format, accept, domain)?;
        let type_iri = expand_name(domain, type_name)?;
        let node = document.bind(address, &type_iri).ok_or_else(|| {
            DiscoveryError::Unusable(format!("no {type_name} node in {address}"))
        })?;
        Ok((document, node))
    }

    /// Provider references listed by the catalog, with the catalog document.
    fn provider_entries(
        &self,
        group: &TestGroupSpec,
    ) -> Result<(String, Document, Vec<Entry>), DiscoveryError> {
        let base = self.base_uri()?;
        let profile = group.domain.discovery;
        let (catalog, node) = self.discovery_document(base, profile.catalog_type, group.domain)?;
        let entries = walk(&catalog, &node, profile.provider_path, group.domain)?;
        debug!(catalog = %base, providers = entries.len(), "read service provider catalog");
        Ok((base.to_string(), catalog, entries))
    }

    fn provider_addresses(&self, group: &TestGroupSpec) -> Result<Vec<String>, DiscoveryError> {
        if let Some(pinned) = self.config.override_for(PINNED_PROVIDER) {
            return Ok(vec![pinned.to_string()]);
        }
        let (base, _, entries) = self.provider_entries(group)?;
        Ok(entries
            .iter()
            .filter_map(|entry| entry_address(entry, &base))
            .collect())
    }

    /// Every capability reached by `path` on every provider.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the catalog or a provider document is
    /// unusable.
    pub fn capabilities(
        &self,
        group: &TestGroupSpec,
        path: &[&str],
        base_property: &str,
    ) -> Result<Vec<Capability>, DiscoveryError> {
        self.survey(group, path, base_property).map(|(capabilities, _)| capabilities)
    }

    /// Capabilities, with the syntax of the document traversal started
    /// from (the catalog, or the pinned provider).
    fn survey(
        &self,
        group: &TestGroupSpec,
        path: &[&str],
        base_property: &str,
    ) -> Result<(Vec<Capability>, Syntax), DiscoveryError> {
        let domain = group.domain;
        let profile = domain.discovery;
        let mut found = Vec::new();

        let mut collect = |document: &Document,
                           node: &NodeRef,
                           address: &str|
         -> Result<(), DiscoveryError> {
            let base_iri = expand_name(domain, base_property)?;
            let type_iri = profile
                .resource_type
                .map(|name| expand_name(domain, name))
                .transpose()?;
            for capability in walk(document, node, path, domain)? {
                let Some(cap_node) = &capability.node else {
                    continue;
                };
                let resource_types = match &type_iri {
                    Some(iri) => document
                        .children(cap_node, iri)?
                        .iter()
                        .filter_map(|e| entry_address(e, address))
                        .collect(),
                    None => Vec::new(),
                };
                for url in document.children(cap_node, &base_iri)? {
                    if let Some(url) = entry_address(&url, address) {
                        found.push(Capability {
                            url,
                            resource_types: resource_types.clone(),
                        });
                    }
                }
            }
            Ok(())
        };

        if let Some(pinned) = self.config.override_for(PINNED_PROVIDER) {
            let (document, node) = self.discovery_document(pinned, profile.provider_type, domain)?;
            collect(&document, &node, pinned)?;
            return Ok((found, document.syntax()));
        }

        let (base, catalog, entries) = self.provider_entries(group)?;
        for entry in &entries {
            let inline = match &entry.node {
                Some(node) => !walk(&catalog, node, path, domain)?.is_empty(),
                None => false,
            };
            if inline {
                if let Some(node) = &entry.node {
                    collect(&catalog, node, &base)?;
                }
            } else if let Some(address) = entry_address(entry, &base) {
                let (document, node) =
                    self.discovery_document(&address, profile.provider_type, domain)?;
                collect(&document, &node, &address)?;
            }
        }
        Ok((found, catalog.syntax()))
    }

    /// Capability URLs applicable to the group's resource type.
    ///
    /// Core resource types accept every capability. Otherwise capabilities
    /// declaring the type are preferred; failing those, capabilities that
    /// declare no type are used.
    fn matching_urls(
        &self,
        group: &TestGroupSpec,
        path: &[&str],
        base_property: &str,
    ) -> Result<Vec<String>, DiscoveryError> {
        self.matching(group, path, base_property).map(|(urls, _)| urls)
    }

    fn matching(
        &self,
        group: &TestGroupSpec,
        path: &[&str],
        base_property: &str,
    ) -> Result<(Vec<String>, Syntax), DiscoveryError> {
        let (capabilities, served) = self.survey(group, path, base_property)?;
        if group.resource_type.domain == DomainId::Core {
            return Ok((capabilities.into_iter().map(|c| c.url).collect(), served));
        }
        let type_iri = expand_name(group.domain, group.resource_type.type_name)?;
        let matching: Vec<String> = capabilities
            .iter()
            .filter(|c| c.resource_types.contains(&type_iri))
            .map(|c| c.url.clone())
            .collect();
        if !matching.is_empty() {
            return Ok((matching, served));
        }
        let untyped: Vec<String> = capabilities
            .into_iter()
            .filter(|c| c.resource_types.is_empty())
            .map(|c| c.url)
            .collect();
        if !untyped.is_empty() && group.domain.discovery.resource_type.is_some() {
            warn!(
                group = %group.label(),
                "no capability declares {}; using capabilities without a resource type",
                group.resource_type.type_name
            );
        }
        Ok((untyped, served))
    }

    fn instances(&self, group: &TestGroupSpec) -> Result<Vec<String>, DiscoveryError> {
        let profile = group.domain.discovery;
        let (bases, served) = self.matching(group, profile.query_path, profile.query_base)?;
        let (format, accept) = query_base_negotiation(group, served);
        let type_iri = expand_name(group.domain, group.resource_type.type_name)?;
        let mut addresses = Vec::new();
        for base in dedup(bases) {
            let document = self.fetcher.fetch_document(&base, format, accept, group.domain)?;
            let members = document.member_addresses(&type_iri);
            debug!(query = %base, members = members.len(), "read query base");
            addresses.extend(members);
        }
        Ok(addresses)
    }
}
