//! Vietnamese display strings for durations, distances and turn
//! instructions.

use crate::sdk::routing::RouteStep;

fn strip_trailing_zero(value: f64) -> String {
    let text = format!("{:.1}", value);
    match text.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => text,
    }
}

/// Renders minutes as "X phút" below an hour, "X giờ Y phút" above.
pub fn format_duration(total_minutes: f64) -> String {
    if total_minutes < 0.1 {
        return "0 phút".to_string();
    }
    if total_minutes < 1.0 {
        return "dưới 1 phút".to_string();
    }
    let rounded = total_minutes.round() as i64;
    if rounded < 60 {
        return format!("{} phút", strip_trailing_zero(total_minutes));
    }
    let hours = rounded / 60;
    let minutes = rounded % 60;
    if minutes == 0 {
        format!("{} giờ", hours)
    } else {
        format!("{} giờ {} phút", hours, minutes)
    }
}

/// Renders kilometers as "X km", switching to "Y m" below one
/// kilometer.
pub fn format_distance(total_km: f64) -> String {
    if total_km < 0.01 {
        return "0 m".to_string();
    }
    if total_km < 1.0 {
        return format!("{} m", (total_km * 1000.0).round() as i64);
    }
    format!("{} km", strip_trailing_zero(total_km))
}

fn translate(term: &str) -> Option<&'static str> {
    let translated = match term {
        "depart" => "Khởi hành",
        "arrive" => "Đến nơi",
        "turn" => "Rẽ",
        "new name" => "Đi vào",
        "continue" => "Tiếp tục",
        "fork" => "Đi theo lối",
        "end of road" => "Hết đường",
        "roundabout" | "rotary" => "Đi vào vòng xuyến",
        "left" => "trái",
        "right" => "phải",
        "slight left" => "hơi rẽ trái",
        "slight right" => "hơi rẽ phải",
        "sharp left" => "rẽ trái gắt",
        "sharp right" => "rẽ phải gắt",
        "straight" => "đi thẳng",
        "uturn" => "quay đầu",
        _ => return None,
    };
    Some(translated)
}

/// One-line instruction for a turn step, e.g.
/// "Rẽ trái vào Lê Lợi (trong 500 m)". Untranslated maneuver types
/// pass through as-is, untranslated modifiers are dropped.
pub fn maneuver_text(step: &RouteStep) -> String {
    let mut text = translate(&step.maneuver_type)
        .map(str::to_string)
        .unwrap_or_else(|| step.maneuver_type.clone());

    if !step.maneuver_modifier.is_empty() {
        if let Some(modifier) = translate(&step.maneuver_modifier) {
            text.push(' ');
            text.push_str(modifier);
        }
    }

    if !step.name.is_empty() {
        text.push_str(" vào ");
        text.push_str(&step.name);
    }

    text.push_str(" (trong ");
    text.push_str(&format_distance(step.distance / 1000.0));
    text.push(')');
    text
}
