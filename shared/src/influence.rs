//! Zone-of-influence math: how far and how strongly each location projects
//! over the hex grid, and how overlapping zones combine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assignments::InfluenceAssignment;
use crate::coords::{AxialCoord, coords_in_radius, parse_coordinates};
use crate::location::{LocationData, LocationType, OwnerType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceArea {
    pub name: String,
    pub center: AxialCoord,
    pub radius: u32,
    /// Strength at the center, 0..=100.
    pub strength: f64,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npc: Option<String>,
}

impl InfluenceArea {
    pub fn owner(&self) -> (OwnerType, Option<&str>) {
        if let Some(faction) = self.faction.as_deref() {
            (OwnerType::Faction, Some(faction))
        } else if let Some(npc) = self.npc.as_deref() {
            (OwnerType::Npc, Some(npc))
        } else {
            (OwnerType::None, None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluencedHex {
    pub hex: AxialCoord,
    pub strength: f64,
}

/// Strongest-wins merge result for one cell. Indices refer to the slice that
/// was passed to [`merge_influence_areas`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergedInfluence {
    pub hex: AxialCoord,
    pub strength: f64,
    pub strongest: usize,
    pub sources: Vec<usize>,
}

impl MergedInfluence {
    pub fn is_contested(&self) -> bool {
        self.sources.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfluencingLocation<'a> {
    pub location: &'a LocationData,
    pub area: InfluenceArea,
    pub strength: f64,
}

pub fn calculate_influence_area(location: &LocationData) -> Option<InfluenceArea> {
    let center = parse_coordinates(location.coordinates.as_deref())?;
    let (radius, strength) = location.location_type.influence_profile();

    let owner = location
        .owner_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let (faction, npc) = match location.owner_type {
        Some(OwnerType::Faction) => (owner, None),
        Some(OwnerType::Npc) => (None, owner),
        _ => (None, None),
    };

    Some(InfluenceArea {
        name: location.name.trim().to_string(),
        center,
        radius,
        strength,
        location_type: location.location_type.clone(),
        faction,
        npc,
    })
}

/// Linear decay from full strength at the center to zero at the rim.
pub fn get_influence_strength_at(area: &InfluenceArea, coord: &AxialCoord) -> f64 {
    let distance = area.center.distance(coord);
    if distance > area.radius {
        return 0.0;
    }
    if area.radius == 0 {
        return area.strength;
    }
    let falloff = 1.0 - distance as f64 / area.radius as f64;
    (area.strength * falloff).max(0.0)
}

pub fn get_influenced_hexes(area: &InfluenceArea) -> Vec<InfluencedHex> {
    coords_in_radius(area.center, area.radius)
        .into_iter()
        .filter_map(|hex| {
            let strength = get_influence_strength_at(area, &hex);
            (strength > 0.0).then_some(InfluencedHex { hex, strength })
        })
        .collect()
}

pub fn merge_influence_areas(areas: &[InfluenceArea]) -> BTreeMap<AxialCoord, MergedInfluence> {
    let mut merged: BTreeMap<AxialCoord, MergedInfluence> = BTreeMap::new();
    for (idx, area) in areas.iter().enumerate() {
        for InfluencedHex { hex, strength } in get_influenced_hexes(area) {
            merged
                .entry(hex)
                .and_modify(|current| {
                    current.sources.push(idx);
                    if strength > current.strength {
                        current.strength = strength;
                        current.strongest = idx;
                    }
                })
                .or_insert_with(|| MergedInfluence {
                    hex,
                    strength,
                    strongest: idx,
                    sources: vec![idx],
                });
        }
    }
    merged
}

/// Locations whose zone reaches `coord`, strongest first.
pub fn get_influencing_locations<'a>(
    coord: &AxialCoord,
    locations: &'a [LocationData],
) -> Vec<InfluencingLocation<'a>> {
    let mut out: Vec<InfluencingLocation<'a>> = locations
        .iter()
        .filter_map(|location| {
            let area = calculate_influence_area(location)?;
            let strength = get_influence_strength_at(&area, coord);
            (strength > 0.0).then_some(InfluencingLocation {
                location,
                area,
                strength,
            })
        })
        .collect();
    out.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    out
}

/// One influence-store assignment per covered cell; the strongest zone owns it.
pub fn influence_assignments(locations: &[LocationData]) -> Vec<InfluenceAssignment> {
    let areas: Vec<InfluenceArea> = locations
        .iter()
        .filter_map(calculate_influence_area)
        .collect();

    merge_influence_areas(&areas)
        .into_values()
        .map(|merged| {
            let area = &areas[merged.strongest];
            let mut assignment = InfluenceAssignment::new(
                merged.hex.to_offset(),
                &area.name,
                area.location_type.clone(),
                merged.strength.round(),
            );
            if let (owner_type, Some(owner_name)) = area.owner() {
                assignment = assignment.owned_by(owner_type, owner_name);
            }
            assignment
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{COORD_LIMIT, OffsetCoord};

    fn area_for(name: &str, kind: &str, coords: &str) -> InfluenceArea {
        calculate_influence_area(&LocationData::new(name, kind, coords))
            .expect("location with coordinates should project influence")
    }

    #[test]
    fn area_profiles_follow_location_type() {
        let city = area_for("Salzstadt", "Stadt", "10,10");
        assert_eq!(city.radius, 8);
        assert_eq!(city.strength, 90.0);
        assert_eq!(city.location_type.as_str(), "Stadt");

        let village = area_for("Kleindorf", "Dorf", "5,5");
        assert_eq!((village.radius, village.strength), (5, 70.0));

        let building = area_for("Taverne", "Gebäude", "3,3");
        assert_eq!((building.radius, building.strength), (1, 40.0));
    }

    #[test]
    fn location_without_coordinates_has_no_area() {
        let mut nameless = LocationData::new("Nameless", "Dorf", "");
        assert!(calculate_influence_area(&nameless).is_none());
        nameless.coordinates = None;
        assert!(calculate_influence_area(&nameless).is_none());
    }

    #[test]
    fn extreme_coordinates_have_no_area() {
        for coordinates in ["0,2147483647", "-2147483647,2147483647", "q:-2147483648,r:0"] {
            let location = LocationData::new("Edge", "Stadt", coordinates);
            assert_eq!(calculate_influence_area(&location), None, "{coordinates}");
        }
        let rim = area_for("Rim", "Stadt", &format!("0,{COORD_LIMIT}"));
        assert!(!get_influenced_hexes(&rim).is_empty());
    }

    #[test]
    fn owner_is_copied_by_kind() {
        let fort = LocationData::new("Fort Eisenfaust", "Festung", "20,20")
            .owned_by(OwnerType::Faction, "Eiserne Legion");
        let area = calculate_influence_area(&fort).expect("fort should project influence");
        assert_eq!(area.faction.as_deref(), Some("Eiserne Legion"));
        assert!(area.npc.is_none());

        let tower = LocationData::new("Turm", "Gebäude", "15,15")
            .owned_by(OwnerType::Npc, "Gandalf der Graue");
        let area = calculate_influence_area(&tower).expect("tower should project influence");
        assert_eq!(area.npc.as_deref(), Some("Gandalf der Graue"));
        assert!(area.faction.is_none());
    }

    #[test]
    fn strength_decays_monotonically() {
        let area = area_for("Test Stadt", "Stadt", "0,0");
        let c = area.center;
        let strengths: Vec<f64> = (0..=4)
            .map(|d| get_influence_strength_at(&area, &AxialCoord::new(c.q + d, c.r)))
            .collect();
        assert_eq!(strengths[0], 90.0);
        for pair in strengths.windows(2) {
            assert!(pair[1] <= pair[0], "{strengths:?} is not non-increasing");
        }
        assert!(strengths[4] > 0.0);
    }

    #[test]
    fn strength_is_zero_at_and_beyond_rim() {
        let area = area_for("Test Dorf", "Dorf", "5,5");
        let c = area.center;
        assert_eq!(get_influence_strength_at(&area, &AxialCoord::new(c.q + 5, c.r)), 0.0);
        assert_eq!(get_influence_strength_at(&area, &AxialCoord::new(c.q + 20, c.r)), 0.0);
    }

    #[test]
    fn influenced_hexes_form_a_disk_peaking_at_center() {
        let area = area_for("Camp", "Camp", "0,0");
        let hexes = get_influenced_hexes(&area);
        assert!(!hexes.is_empty());
        for InfluencedHex { hex, strength } in &hexes {
            assert!(hex.distance(&area.center) <= area.radius);
            assert!(*strength > 0.0 && *strength <= 100.0);
        }
        let max = hexes.iter().map(|h| h.strength).fold(0.0, f64::max);
        let center = hexes
            .iter()
            .find(|h| h.hex == area.center)
            .expect("center hex should be influenced");
        assert_eq!(center.strength, max);
    }

    #[test]
    fn merge_keeps_strongest_and_records_sources() {
        let city = area_for("Stadt", "Stadt", "10,10");
        let village = area_for("Dorf", "Dorf", "12,12");
        let areas = [city.clone(), village.clone()];
        let merged = merge_influence_areas(&areas);

        let mut contested = 0;
        for entry in merged.values() {
            let best = get_influence_strength_at(&city, &entry.hex)
                .max(get_influence_strength_at(&village, &entry.hex));
            assert!(entry.strength >= best * 0.9);
            if get_influence_strength_at(&city, &entry.hex) > 0.0
                && get_influence_strength_at(&village, &entry.hex) > 0.0
            {
                assert!(entry.is_contested());
                contested += 1;
            }
        }
        assert!(contested > 0);
    }

    #[test]
    fn merge_of_far_apart_areas_has_no_overlap() {
        let areas = [area_for("A", "Stadt", "0,0"), area_for("B", "Stadt", "40,40")];
        let merged = merge_influence_areas(&areas);
        let expected = get_influenced_hexes(&areas[0]).len() + get_influenced_hexes(&areas[1]).len();
        assert_eq!(merged.len(), expected);
        assert!(merged.values().all(|entry| !entry.is_contested()));
    }

    #[test]
    fn influencing_locations_sorted_and_filtered() {
        let locations = vec![
            LocationData::new("Weak Camp", "Camp", "0,0"),
            LocationData::new("Strong Stadt", "Stadt", "2,2"),
            LocationData::new("Far", "Camp", "50,50"),
            LocationData {
                coordinates: None,
                ..LocationData::new("No Coords", "Dorf", "")
            },
        ];
        let hex = OffsetCoord::new(0, 1).to_axial();
        let found = get_influencing_locations(&hex, &locations);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].location.name, "Strong Stadt");
        assert!(found.windows(2).all(|w| w[0].strength >= w[1].strength));
        assert!(found.iter().all(|f| f.strength > 0.0));
    }

    #[test]
    fn assignments_cover_every_merged_cell_once() {
        let locations = vec![
            LocationData::new("Burg", "Festung", "4,4").owned_by(OwnerType::Faction, "Legion"),
            LocationData::new("Hof", "Weiler", "5,6"),
        ];
        let assignments = influence_assignments(&locations);
        let mut keys: Vec<_> = assignments
            .iter()
            .filter_map(|a| a.coord.and_then(|c| c.normalize()))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);

        let center = assignments
            .iter()
            .find(|a| a.coord.and_then(|c| c.normalize()) == Some(OffsetCoord::new(4, 4)))
            .expect("fortress center should be assigned");
        assert_eq!(center.location_name, "Burg");
        assert_eq!(center.strength, 80.0);
        assert_eq!(center.owner_type, OwnerType::Faction);
        assert_eq!(center.owner_name.as_deref(), Some("Legion"));
    }
}
