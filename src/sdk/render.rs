//! Terminal rendering of a solved itinerary and assembly of the
//! GeoJSON artifact.

use crate::sdk::format::{format_distance, format_duration, maneuver_text};
use crate::sdk::planner::{SolveResult, END_POINT, START_POINT};
use crate::sdk::solver::OptimizeFor;
use serde_json::{json, Value};

fn start_label(name: &str) -> String {
    name.replace(START_POINT, "Điểm xuất phát")
}

fn end_label(name: &str) -> String {
    name.replace(END_POINT, "Điểm kết thúc")
}

/// Multi-line itinerary: summary block, then numbered stops with
/// per-leg totals and turn instructions.
pub fn render_itinerary(result: &SolveResult) -> String {
    let solver_cost = match result.optimize_for {
        OptimizeFor::Distance => format_distance(result.total_cost),
        OptimizeFor::Time => format_duration(result.total_cost),
    };
    let criterion = match result.optimize_for {
        OptimizeFor::Distance => "Quãng đường",
        OptimizeFor::Time => "Thời gian",
    };

    let mut out = String::new();
    out.push_str("Hoàn thành!\n");
    out.push_str(&format!("Tối ưu theo: {}\n", criterion));
    out.push_str(&format!("Chi phí tối ưu (Solver): {}\n", solver_cost));
    out.push('\n');
    out.push_str(&format!(
        "Tổng quãng đường (OSRM): {}\n",
        format_distance(result.total_distance_km)
    ));
    out.push_str(&format!(
        "Tổng thời gian (OSRM): {}\n",
        format_duration(result.total_duration_min)
    ));
    out.push('\n');
    out.push_str("Chi tiết lộ trình:\n");

    if let Some(first) = result.tour.first() {
        out.push_str(&format!("  1. {}\n", start_label(&first.from)));
    }
    for (index, leg) in result.tour.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", index + 2, end_label(&leg.to)));
        out.push_str(&format!(
            "     Chặng {}: {} / {}\n",
            index + 1,
            format_distance(leg.distance_km),
            format_duration(leg.duration_min)
        ));
        for step in &leg.steps {
            out.push_str(&format!("       - {}\n", maneuver_text(step)));
        }
    }
    out
}

fn stop_feature(index: usize, name: &str, coord: &[f64; 2]) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": coord },
        "properties": { "name": name, "index": index }
    })
}

/// FeatureCollection for the solved tour: one LineString feature per
/// leg plus one Point feature per stop. Stop 1 sits on the first
/// coordinate of the first leg, every later stop on the last
/// coordinate of the leg arriving at it.
pub fn feature_collection(result: &SolveResult) -> Value {
    let mut features: Vec<Value> = result
        .geometries
        .iter()
        .map(|geom| {
            json!({
                "type": "Feature",
                "geometry": geom,
                "properties": {}
            })
        })
        .collect();

    if let (Some(leg), Some(geom)) = (result.tour.first(), result.geometries.first()) {
        if let Some(coord) = geom.coordinates.first() {
            features.push(stop_feature(1, &start_label(&leg.from), coord));
        }
    }
    for (index, (leg, geom)) in result.tour.iter().zip(&result.geometries).enumerate() {
        if let Some(coord) = geom.coordinates.last() {
            features.push(stop_feature(index + 2, &end_label(&leg.to), coord));
        }
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::planner::TourLeg;
    use crate::sdk::routing::{LineString, RouteStep};

    fn sample() -> SolveResult {
        SolveResult {
            status: "success".to_string(),
            optimize_for: OptimizeFor::Distance,
            total_cost: 12.3,
            total_distance_km: 15.2,
            total_duration_min: 45.0,
            tour: vec![
                TourLeg {
                    from: START_POINT.to_string(),
                    to: "Nhà thờ Đức Bà".to_string(),
                    distance_km: 2.1,
                    duration_min: 5.4,
                    steps: vec![RouteStep {
                        name: "Lê Lợi".to_string(),
                        maneuver_type: "turn".to_string(),
                        maneuver_modifier: "left".to_string(),
                        distance: 500.0,
                        duration: 60.0,
                    }],
                },
                TourLeg {
                    from: "Nhà thờ Đức Bà".to_string(),
                    to: END_POINT.to_string(),
                    distance_km: 3.0,
                    duration_min: 8.0,
                    steps: Vec::new(),
                },
            ],
            geometries: vec![
                LineString::straight((10.0, 106.0), (10.1, 106.1)),
                LineString::straight((10.1, 106.1), (10.2, 106.2)),
            ],
        }
    }

    #[test]
    fn renders_summary_and_stops() {
        let text = render_itinerary(&sample());
        assert!(text.contains("Hoàn thành!"));
        assert!(text.contains("Tối ưu theo: Quãng đường"));
        assert!(text.contains("Chi phí tối ưu (Solver): 12.3 km"));
        assert!(text.contains("Tổng quãng đường (OSRM): 15.2 km"));
        assert!(text.contains("Tổng thời gian (OSRM): 45 phút"));
        assert!(text.contains("  1. Điểm xuất phát"));
        assert!(text.contains("  2. Nhà thờ Đức Bà"));
        assert!(text.contains("Chặng 1: 2.1 km / 5.4 phút"));
        assert!(text.contains("  3. Điểm kết thúc"));
        assert!(text.contains("Chặng 2: 3 km / 8 phút"));
        assert!(text.contains("- Rẽ trái vào Lê Lợi (trong 500 m)"));
    }

    #[test]
    fn time_criterion_formats_cost_as_duration() {
        let mut result = sample();
        result.optimize_for = OptimizeFor::Time;
        result.total_cost = 95.0;
        let text = render_itinerary(&result);
        assert!(text.contains("Tối ưu theo: Thời gian"));
        assert!(text.contains("Chi phí tối ưu (Solver): 1 giờ 35 phút"));
    }

    #[test]
    fn real_stop_names_pass_through_untouched() {
        assert_eq!(start_label("Dinh Độc Lập"), "Dinh Độc Lập");
        assert_eq!(end_label("Chợ Bến Thành"), "Chợ Bến Thành");
        assert_eq!(start_label(START_POINT), "Điểm xuất phát");
        assert_eq!(end_label(END_POINT), "Điểm kết thúc");
    }

    #[test]
    fn feature_collection_carries_legs_and_stops() {
        let result = sample();
        let collection = feature_collection(&result);
        assert_eq!(collection["type"], "FeatureCollection");
        let features = collection["features"].as_array().unwrap();
        assert_eq!(features.len(), 5);

        assert_eq!(features[0]["type"], "Feature");
        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert!(features[0]["properties"].as_object().unwrap().is_empty());
        let first = features[0]["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(first[0], 106.0);
        assert_eq!(first[1], 10.0);

        assert_eq!(features[2]["geometry"]["type"], "Point");
        assert_eq!(features[2]["properties"]["name"], "Điểm xuất phát");
        assert_eq!(features[2]["properties"]["index"], 1);
        let start = features[2]["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(start[0], 106.0);
        assert_eq!(start[1], 10.0);

        assert_eq!(features[3]["properties"]["name"], "Nhà thờ Đức Bà");
        assert_eq!(features[3]["properties"]["index"], 2);

        assert_eq!(features[4]["properties"]["name"], "Điểm kết thúc");
        assert_eq!(features[4]["properties"]["index"], 3);
        let last = features[4]["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(last[0], 106.2);
        assert_eq!(last[1], 10.2);
    }
}
