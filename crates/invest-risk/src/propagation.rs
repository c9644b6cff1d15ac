//! Network risk propagation: intrinsic risk assigned to each connected
//! entity propagates to the subject with decay per hop, weighted by
//! centrality (§4.G "Network propagation").
//!
//! This module deliberately takes `intrinsic_risk` as a caller-supplied
//! map rather than deriving it itself: deciding whether a connected
//! entity is sanctioned, a PEP, or a shell company requires running the
//! same screening pipeline on that entity, which is the orchestrator's
//! job, not this crate's.

use invest_config::NetworkPropagationWeights;
use invest_core::Id;
use invest_resolver::Neighbor;
use std::collections::HashMap;

/// Degree centrality: how many discovered edges terminate at this entity.
/// A crude stand-in for betweenness that needs only the neighbor list
/// already in hand, rather than the full graph.
fn degree_centrality(entity_id: Id, neighbors: &[Neighbor]) -> f64 {
    neighbors.iter().filter(|n| n.entity_id == entity_id).count().max(1) as f64
}

/// Propagate `intrinsic_risk` (keyed by entity id, each a 0-100 score from
/// screening that connected entity) across `neighbors` back to the
/// subject, decayed per hop and scaled by centrality (§4.G).
pub fn propagate(neighbors: &[Neighbor], intrinsic_risk: &HashMap<Id, f64>, weights: &NetworkPropagationWeights) -> f64 {
    if neighbors.is_empty() {
        return 0.0;
    }

    let max_centrality = neighbors.iter().map(|n| degree_centrality(n.entity_id, neighbors)).fold(1.0_f64, f64::max);

    neighbors
        .iter()
        .filter_map(|neighbor| {
            let risk = *intrinsic_risk.get(&neighbor.entity_id)?;
            let decay = match neighbor.hop {
                1 => weights.d2_decay,
                _ => weights.d3_decay,
            };
            let centrality_factor = 1.0 + weights.centrality_weight * (degree_centrality(neighbor.entity_id, neighbors) / max_centrality);
            Some(risk * decay * neighbor.strength.clamp(0.0, 1.0) * centrality_factor)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor(entity_id: Id, hop: u8, strength: f64) -> Neighbor {
        Neighbor { entity_id, hop, strength }
    }

    #[test]
    fn no_neighbors_propagates_nothing() {
        assert_eq!(propagate(&[], &HashMap::new(), &NetworkPropagationWeights::defaults()), 0.0);
    }

    #[test]
    fn neighbor_with_no_intrinsic_risk_contributes_nothing() {
        let id = Id::new();
        let neighbors = vec![neighbor(id, 1, 0.9)];
        assert_eq!(propagate(&neighbors, &HashMap::new(), &NetworkPropagationWeights::defaults()), 0.0);
    }

    #[test]
    fn d2_neighbor_propagates_more_than_equivalent_d3_neighbor() {
        let weights = NetworkPropagationWeights::defaults();
        let d2_id = Id::new();
        let d3_id = Id::new();
        let mut risk = HashMap::new();
        risk.insert(d2_id, 50.0);
        risk.insert(d3_id, 50.0);

        let d2_adj = propagate(&[neighbor(d2_id, 1, 1.0)], &risk, &weights);
        let d3_adj = propagate(&[neighbor(d3_id, 2, 1.0)], &risk, &weights);
        assert!(d2_adj > d3_adj);
    }
}
