//! Top selling agents over a listing set

use crate::Listing;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Number of listings on sale for one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSales {
    /// Agent identifier
    pub agent_id: u64,
    /// Agent display name
    pub agent_name: String,
    /// Listings on sale
    pub listings: usize,
}

/// The `limit` agents with the most listings.
///
/// Ties are broken by agent name, then agent id, so the ranking does not
/// depend on the order listings were retrieved in.
pub fn top_agents(listings: &[Listing], limit: usize) -> Vec<AgentSales> {
    let mut by_agent: HashMap<u64, AgentSales> = HashMap::new();
    for listing in listings {
        by_agent
            .entry(listing.agent_id)
            .or_insert_with(|| AgentSales {
                agent_id: listing.agent_id,
                agent_name: listing.agent_name.clone(),
                listings: 0,
            })
            .listings += 1;
    }

    let mut ranking: Vec<AgentSales> = by_agent.into_values().collect();
    ranking.sort_by(|a, b| {
        (Reverse(a.listings), &a.agent_name, a.agent_id).cmp(&(Reverse(b.listings), &b.agent_name, b.agent_id))
    });
    ranking.truncate(limit);
    ranking
}
