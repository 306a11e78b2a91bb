//! Server Resolver.

use crate::ir::{IrServer, IrServerVariable};
use crate::spec::v3;
use url::Url;

/// First input location that parses as an absolute `http`/`https` URL.
fn http_location(input_locations: &[String]) -> Option<Url> {
    input_locations
        .iter()
        .filter_map(|location| Url::parse(location).ok())
        .find(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
}

/// Swagger 2.0: `schemes × host × basePath`.
///
/// Without `host`, scheme and host come from the document's own location.
/// Without any scheme, one schemeless `host + basePath` URL is produced.
#[must_use]
pub fn v2_servers(
    schemes: &[String],
    host: Option<&str>,
    base_path: Option<&str>,
    input_locations: &[String],
) -> Vec<IrServer> {
    let base = base_path.unwrap_or("");
    let mut schemes = schemes.to_vec();

    let host = match host {
        Some(host) => Some(host.to_string()),
        None => http_location(input_locations).and_then(|url| {
            if schemes.is_empty() {
                schemes.push(url.scheme().to_string());
            }
            let host = url.host_str()?;
            Some(match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            })
        }),
    };

    let Some(host) = host else {
        let url = if base.is_empty() { "/" } else { base };
        return vec![IrServer::url(url)];
    };
    if schemes.is_empty() {
        return vec![IrServer::url(format!("{host}{base}"))];
    }
    schemes
        .iter()
        .map(|scheme| IrServer::url(format!("{scheme}://{host}{base}")))
        .collect()
}

/// OpenAPI 3.x: declared servers verbatim, else the origin of the document's
/// location, else `/`.
#[must_use]
pub fn v3_servers(servers: &[v3::Server], input_locations: &[String]) -> Vec<IrServer> {
    if !servers.is_empty() {
        return servers.iter().map(server_to_ir).collect();
    }
    match http_location(input_locations) {
        Some(url) => vec![IrServer::url(url.origin().ascii_serialization())],
        None => vec![IrServer::url("/")],
    }
}

#[must_use]
pub fn server_to_ir(server: &v3::Server) -> IrServer {
    IrServer {
        url: server.url.clone(),
        description: server.description.clone(),
        variables: server
            .variables
            .iter()
            .map(|(name, variable)| {
                (
                    name.clone(),
                    IrServerVariable {
                        default: variable.default.clone(),
                        values: variable.values.clone(),
                        description: variable.description.clone(),
                    },
                )
            })
            .collect(),
    }
}
