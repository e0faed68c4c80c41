//! services/client/src/app/bootstrap.rs
//!
//! Startup discovery: fetch the root document and publish the links it
//! advertises as the resolved endpoint set.

use moviereview_core::domain::{Endpoint, Hypermedia, HypermediaDocument};
use moviereview_core::ports::{LinkResolver, PortResult};
use moviereview_core::state::Action;
use tracing::{debug, info};

use crate::app::store::Store;

/// Fetches the root document and applies it to the store.
pub async fn bootstrap(store: &Store, resolver: &dyn LinkResolver) -> PortResult<HypermediaDocument> {
    let root = resolver.fetch_root().await?;
    let advertised = apply_root(store, &root);
    info!("Root document loaded; {} of {} endpoints advertised", advertised, Endpoint::ALL.len());
    Ok(root)
}

/// Sets every known endpoint the document advertises and unsets the rest, so
/// the store always mirrors the latest root document. Returns how many were set.
pub fn apply_root(store: &Store, root: &HypermediaDocument) -> usize {
    let mut advertised = 0;
    for endpoint in Endpoint::ALL {
        match root.control(endpoint.relation()) {
            Some(link) => {
                advertised += 1;
                store.dispatch(Action::SetLink {
                    endpoint,
                    link: link.clone(),
                });
            }
            None => {
                debug!("Root document does not advertise {}", endpoint);
                store.dispatch(Action::UnsetLink { endpoint });
            }
        }
    }
    advertised
}
