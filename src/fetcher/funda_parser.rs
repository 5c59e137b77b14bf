//! Search API response parsing
//!
//! The feed answers with a JSON document shaped like:
//!
//! ```json
//! {
//!   "Objects": [{ "Id": "…", "Adres": "…", "MakelaarId": 24067, "MakelaarNaam": "…" }],
//!   "Paging": { "AantalPaginas": 12, "HuidigePagina": 1, "VolgendeUrl": "/~/koop/…/p2/" },
//!   "TotaalAantalObjecten": 290
//! }
//! ```

use super::{FetcherError, FetcherResult, PageResult};
use crate::Listing;
use serde::Deserialize;
use tracing::debug;

/// Raw search response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<ListingDto>,
    paging: PagingDto,
    #[serde(default)]
    totaal_aantal_objecten: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListingDto {
    id: String,
    #[serde(default)]
    adres: Option<String>,
    makelaar_id: u64,
    #[serde(default)]
    makelaar_naam: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PagingDto {
    aantal_paginas: u32,
    #[serde(default)]
    huidige_pagina: u32,
    #[serde(default)]
    volgende_url: Option<String>,
}

impl From<ListingDto> for Listing {
    fn from(dto: ListingDto) -> Self {
        Listing {
            id: dto.id,
            address: dto.adres.filter(|a| !a.trim().is_empty()),
            agent_id: dto.makelaar_id,
            agent_name: dto.makelaar_naam.trim().to_string(),
        }
    }
}

/// Parse one response body into a successful page.
///
/// The page has a successor when `Paging.VolgendeUrl` is present and
/// non-empty.
pub fn parse_search_response(body: &str) -> FetcherResult<PageResult<Listing>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| FetcherError::ParseError(format!("Failed to deserialize response: {e}")))?;

    let has_next_page = response
        .paging
        .volgende_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty());

    debug!(
        "Parsed page {}/{} with {} listings ({} total objects)",
        response.paging.huidige_pagina,
        response.paging.aantal_paginas,
        response.objects.len(),
        response.totaal_aantal_objecten
    );

    let listings = response.objects.into_iter().map(Listing::from).collect();
    Ok(PageResult::success(
        listings,
        response.paging.aantal_paginas,
        has_next_page,
    ))
}
