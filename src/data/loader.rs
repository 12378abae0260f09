//! Fetching the two input resources.
//!
//! Both requests are issued together and joined; rendering proceeds only when
//! both have succeeded. A failure of either fetch fails the whole load.

use gloo_net::http::Request;
use tracing::debug;

use super::airports::AirportGraphData;
use crate::error::AtlasError;
use crate::topology::Topology;

/// Fetch a resource as text.
pub async fn fetch_text(url: &str) -> Result<String, AtlasError> {
    let fetch_error = |reason: String| AtlasError::Fetch {
        url: url.to_string(),
        reason,
    };

    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    if !response.ok() {
        return Err(fetch_error(format!(
            "HTTP {} {}",
            response.status(),
            response.status_text()
        )));
    }

    response.text().await.map_err(|e| fetch_error(e.to_string()))
}

/// Fetch and parse the airport graph and the world topology concurrently.
pub async fn load_resources(
    airports_url: &str,
    world_url: &str,
) -> Result<(AirportGraphData, Topology), AtlasError> {
    let (airports_json, world_json) =
        futures::try_join!(fetch_text(airports_url), fetch_text(world_url))?;

    let airports = AirportGraphData::from_json(&airports_json)?;
    let topology = Topology::from_json(&world_json)?;

    debug!(
        airports = airports.nodes.len(),
        links = airports.links.len(),
        objects = topology.objects.len(),
        "loaded resources"
    );

    Ok((airports, topology))
}
