//! Shared map fixtures for integration tests.
//!
//! Every fixture is built in memory from `geo` primitives; none touch the
//! filesystem. Coordinates are chosen so that, with the default 25-unit grid
//! spacing, no terrain boundary lands exactly on a grid cell.

use geo::{line_string, polygon};
use wayfarer_lib::{MapData, Marker, TerrainFeature, TerrainKind};

/// Open grassland with two markers 160 units apart.
#[allow(dead_code)]
pub fn plains_map() -> MapData {
    let ground = TerrainFeature::polygon(
        "ground",
        TerrainKind::Normal,
        polygon![
            (x: 40.0, y: 40.0),
            (x: 280.0, y: 40.0),
            (x: 280.0, y: 160.0),
            (x: 40.0, y: 160.0),
        ],
    );
    MapData::new(
        vec![
            Marker::poi("a", "Alpha", 80.0, 100.0),
            Marker::poi("b", "Bravo", 240.0, 100.0),
        ],
        vec![ground],
    )
}

/// The plains fixture plus a straight road joining the two markers.
#[allow(dead_code)]
pub fn road_map() -> MapData {
    let mut map = plains_map();
    let mut features = map.features().to_vec();
    features.push(TerrainFeature::line(
        "high_road",
        TerrainKind::Road,
        line_string![
            (x: 80.0, y: 100.0),
            (x: 120.0, y: 100.0),
            (x: 160.0, y: 100.0),
            (x: 200.0, y: 100.0),
            (x: 240.0, y: 100.0),
        ],
    ));
    map.set_features(features);
    map
}

/// Two landmasses split by a 100-unit sea strait.
///
/// `port_west` and `port_east` sit on opposite shores; `inland` is a plain
/// marker deep in the western landmass. With sea travel off the strait is a
/// hard barrier between the halves.
#[allow(dead_code)]
pub fn island_map() -> MapData {
    let west = TerrainFeature::polygon(
        "west_land",
        TerrainKind::Normal,
        polygon![
            (x: 40.0, y: 40.0),
            (x: 240.0, y: 40.0),
            (x: 240.0, y: 260.0),
            (x: 40.0, y: 260.0),
        ],
    );
    let strait = TerrainFeature::polygon(
        "strait",
        TerrainKind::Sea,
        polygon![
            (x: 240.0, y: 0.0),
            (x: 340.0, y: 0.0),
            (x: 340.0, y: 300.0),
            (x: 240.0, y: 300.0),
        ],
    );
    let east = TerrainFeature::polygon(
        "east_land",
        TerrainKind::Normal,
        polygon![
            (x: 340.0, y: 40.0),
            (x: 540.0, y: 40.0),
            (x: 540.0, y: 260.0),
            (x: 340.0, y: 260.0),
        ],
    );
    MapData::new(
        vec![
            Marker::port("port_west", "West Harbour", 230.0, 150.0),
            Marker::port("port_east", "East Harbour", 350.0, 150.0),
            Marker::poi("inland", "Inland Village", 60.0, 150.0),
        ],
        vec![west, strait, east],
    )
}

/// A marker sealed inside a solid block of impassable terrain, plus one
/// reachable marker outside it.
#[allow(dead_code)]
pub fn sealed_marker_map() -> MapData {
    let ground = TerrainFeature::polygon(
        "ground",
        TerrainKind::Normal,
        polygon![
            (x: 0.0, y: 0.0),
            (x: 300.0, y: 0.0),
            (x: 300.0, y: 300.0),
            (x: 0.0, y: 300.0),
        ],
    );
    let wall = TerrainFeature::polygon(
        "wall",
        TerrainKind::Blocked,
        polygon![
            (x: 90.0, y: 90.0),
            (x: 210.0, y: 90.0),
            (x: 210.0, y: 210.0),
            (x: 90.0, y: 210.0),
        ],
    );
    MapData::new(
        vec![
            Marker::poi("sealed", "Sealed Keep", 150.0, 150.0),
            Marker::poi("outside", "Outside Camp", 30.0, 150.0),
        ],
        vec![ground, wall],
    )
}

/// Clones the named markers out of a fixture map, in order.
#[allow(dead_code)]
pub fn route_markers(map: &MapData, ids: &[&str]) -> Vec<Marker> {
    ids.iter()
        .map(|id| {
            map.marker(id)
                .unwrap_or_else(|| panic!("fixture marker {id} exists"))
                .clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_carry_valid_geometry() {
        for map in [plains_map(), road_map(), island_map(), sealed_marker_map()] {
            map.validate().expect("fixture geometry is finite");
        }
    }
}
