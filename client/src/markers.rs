use std::collections::{HashMap, HashSet};

use sticker_shared::{Coordinate, RecordId, Sighting};
use thiserror::Error;

use crate::time_format::spotted_label;
use crate::viewport::ViewportBounds;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("map rejected marker for sighting {id}: {reason}")]
pub struct MapError {
    pub id: RecordId,
    pub reason: String,
}

/// Map collaborator driven by the registry. Marker handles are opaque to everything else.
pub trait MapSurface {
    type Marker;

    fn add_marker(&mut self, at: Coordinate, popup: &str) -> Result<Self::Marker, String>;
    fn remove_marker(&mut self, marker: Self::Marker);
    fn fit_bounds(&mut self, bounds: &ViewportBounds);
}

/// Outcome of one reconciliation. `added` and `kept` follow input order; `removed` is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileDiff {
    pub added: Vec<RecordId>,
    pub removed: Vec<RecordId>,
    pub kept: Vec<RecordId>,
}

impl ReconcileDiff {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

struct PlacedMarker<H> {
    coordinate: Coordinate,
    handle: H,
}

/// Sole owner of the map surface and of every marker on it, keyed by sighting id.
pub struct MarkerRegistry<M: MapSurface> {
    surface: M,
    markers: HashMap<RecordId, PlacedMarker<M::Marker>>,
}

impl<M: MapSurface> MarkerRegistry<M> {
    pub fn new(surface: M) -> Self {
        Self {
            surface,
            markers: HashMap::new(),
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    #[cfg(test)]
    pub(crate) fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.markers.contains_key(id)
    }

    /// Make the marker set match `sightings` exactly.
    ///
    /// Markers whose id is absent are removed, new ids get a marker, and a known id whose
    /// coordinate changed is replaced rather than moved. Only the first occurrence of a
    /// repeated id counts. If the surface refuses a marker, the markers created so far in
    /// this call are removed again and the registry is left as it was.
    pub fn reconcile(&mut self, sightings: &[Sighting]) -> Result<ReconcileDiff, MapError> {
        let mut incoming: HashMap<&RecordId, Coordinate> = HashMap::with_capacity(sightings.len());
        let mut ordered: Vec<&Sighting> = Vec::with_capacity(sightings.len());
        for sighting in sightings {
            if !incoming.contains_key(&sighting.id) {
                incoming.insert(&sighting.id, sighting.coordinate);
                ordered.push(sighting);
            }
        }

        let mut stale: Vec<RecordId> = self
            .markers
            .iter()
            .filter(|(id, placed)| incoming.get(id) != Some(&placed.coordinate))
            .map(|(id, _)| id.clone())
            .collect();
        stale.sort();
        let stale_set: HashSet<&RecordId> = stale.iter().collect();

        let mut kept = Vec::new();
        let mut to_add = Vec::new();
        for sighting in ordered {
            if self.markers.contains_key(&sighting.id) && !stale_set.contains(&sighting.id) {
                kept.push(sighting.id.clone());
            } else {
                to_add.push(sighting);
            }
        }

        let mut created = Vec::with_capacity(to_add.len());
        for sighting in to_add {
            let popup = spotted_label(&sighting.spotted_at);
            match self.surface.add_marker(sighting.coordinate, &popup) {
                Ok(handle) => created.push((sighting, handle)),
                Err(reason) => {
                    for (_, handle) in created {
                        self.surface.remove_marker(handle);
                    }
                    return Err(MapError {
                        id: sighting.id.clone(),
                        reason,
                    });
                }
            }
        }

        for id in &stale {
            if let Some(placed) = self.markers.remove(id) {
                self.surface.remove_marker(placed.handle);
            }
        }

        let mut added = Vec::with_capacity(created.len());
        for (sighting, handle) in created {
            added.push(sighting.id.clone());
            self.markers.insert(
                sighting.id.clone(),
                PlacedMarker {
                    coordinate: sighting.coordinate,
                    handle,
                },
            );
        }

        tracing::debug!(
            added = added.len(),
            removed = stale.len(),
            kept = kept.len(),
            "markers reconciled"
        );

        Ok(ReconcileDiff {
            added,
            removed: stale,
            kept,
        })
    }

    pub fn fit_view(&mut self, bounds: &ViewportBounds) {
        self.surface.fit_bounds(bounds);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSurface;
    use super::*;
    use sticker_shared::Timestamp;

    fn sighting(id: i64, lat: f64, lon: f64) -> Sighting {
        Sighting {
            id: RecordId::Int(id),
            coordinate: Coordinate::new(lat, lon),
            spotted_at: Timestamp::parse("2024-01-01").unwrap(),
        }
    }

    fn ids(values: &[i64]) -> Vec<RecordId> {
        values.iter().copied().map(RecordId::Int).collect()
    }

    #[test]
    fn first_pass_adds_everything() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        let diff = registry
            .reconcile(&[sighting(1, 40.0, -74.0), sighting(2, 40.1, -74.1)])
            .unwrap();
        assert_eq!(diff.added, ids(&[1, 2]));
        assert!(diff.removed.is_empty());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.surface().live.len(), 2);
        let popups: Vec<_> = registry.surface().live.values().map(|(_, p)| p.as_str()).collect();
        assert_eq!(popups, vec!["Spotted: 2024-01-01", "Spotted: 2024-01-01"]);
    }

    #[test]
    fn replace_set_removes_absent_and_adds_new() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        registry
            .reconcile(&[sighting(1, 40.0, -74.0), sighting(2, 40.1, -74.1)])
            .unwrap();
        let diff = registry
            .reconcile(&[sighting(2, 40.1, -74.1), sighting(3, 40.2, -74.2)])
            .unwrap();

        assert_eq!(diff.removed, ids(&[1]));
        assert_eq!(diff.added, ids(&[3]));
        assert_eq!(diff.kept, ids(&[2]));
        assert_eq!(registry.surface().created, 3);
        assert_eq!(registry.surface().removed, 1);
        assert!(!registry.contains(&RecordId::Int(1)));
        assert!(registry.contains(&RecordId::Int(2)));
        assert!(registry.contains(&RecordId::Int(3)));
    }

    #[test]
    fn unchanged_pass_is_noop() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        let pass = [sighting(1, 40.0, -74.0)];
        registry.reconcile(&pass).unwrap();
        let diff = registry.reconcile(&pass).unwrap();
        assert!(diff.is_noop());
        assert_eq!(diff.kept, ids(&[1]));
        assert_eq!(registry.surface().created, 1);
    }

    #[test]
    fn moved_sighting_is_replaced_not_moved() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        registry.reconcile(&[sighting(1, 40.0, -74.0)]).unwrap();
        let diff = registry.reconcile(&[sighting(1, 41.0, -75.0)]).unwrap();
        assert_eq!(diff.removed, ids(&[1]));
        assert_eq!(diff.added, ids(&[1]));
        assert!(diff.kept.is_empty());
        assert_eq!(
            registry.surface().live_coordinates(),
            vec![Coordinate::new(41.0, -75.0)]
        );
    }

    #[test]
    fn empty_pass_clears_map() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        registry
            .reconcile(&[sighting(1, 1.0, 1.0), sighting(2, 2.0, 2.0)])
            .unwrap();
        let diff = registry.reconcile(&[]).unwrap();
        assert_eq!(diff.removed, ids(&[1, 2]));
        assert!(registry.is_empty());
        assert!(registry.surface().live.is_empty());
    }

    #[test]
    fn repeated_id_in_one_pass_yields_one_marker() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        let diff = registry
            .reconcile(&[sighting(1, 1.0, 1.0), sighting(1, 2.0, 2.0)])
            .unwrap();
        assert_eq!(diff.added, ids(&[1]));
        assert_eq!(registry.surface().live.len(), 1);
    }

    #[test]
    fn one_marker_per_id_regardless_of_history() {
        let passes: Vec<Vec<Sighting>> = vec![
            vec![sighting(1, 1.0, 1.0), sighting(2, 2.0, 2.0), sighting(3, 3.0, 3.0)],
            vec![sighting(3, 3.0, 3.0)],
            vec![],
            vec![sighting(2, 2.5, 2.0), sighting(4, 4.0, 4.0)],
            vec![sighting(4, 4.0, 4.0), sighting(2, 2.5, 2.0), sighting(1, 1.0, 1.0)],
        ];
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        for pass in &passes {
            registry.reconcile(pass).unwrap();
            assert_eq!(registry.len(), pass.len());
            assert_eq!(registry.surface().live.len(), pass.len());
            for s in pass {
                assert!(registry.contains(&s.id));
            }
        }
        let mut live = registry.surface().live_coordinates();
        live.sort_by(|a, b| a.lat.total_cmp(&b.lat));
        assert_eq!(
            live,
            vec![
                Coordinate::new(1.0, 1.0),
                Coordinate::new(2.5, 2.0),
                Coordinate::new(4.0, 4.0)
            ]
        );
    }

    #[test]
    fn failed_marker_rolls_back_pass() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        registry.reconcile(&[sighting(1, 1.0, 1.0)]).unwrap();
        registry.surface.fail_after = Some(2);

        let err = registry
            .reconcile(&[sighting(2, 2.0, 2.0), sighting(3, 3.0, 3.0)])
            .unwrap_err();
        assert_eq!(err.id, RecordId::Int(3));
        assert!(registry.contains(&RecordId::Int(1)));
        assert!(!registry.contains(&RecordId::Int(2)));
        assert_eq!(
            registry.surface().live_coordinates(),
            vec![Coordinate::new(1.0, 1.0)]
        );
    }

    #[test]
    fn fit_view_reaches_surface() {
        let mut registry = MarkerRegistry::new(RecordingSurface::default());
        let bounds = ViewportBounds {
            south_west: Coordinate::new(0.0, 0.0),
            north_east: Coordinate::new(1.0, 1.0),
        };
        registry.fit_view(&bounds);
        assert_eq!(registry.surface().fits, vec![bounds]);
    }
}
