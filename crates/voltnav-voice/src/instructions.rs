//! Turn-by-turn instruction generation from a bare route polyline.

use voltnav_geo::{bearing_degrees, direction_name};
use voltnav_types::{Instruction, InstructionKind, Position};

/// Text of the instruction placed at the first route point.
pub const START_TEXT: &str = "Navigation started. Proceed to the highlighted route.";

/// Number of waypoint prompts a route is split into, roughly.
const WAYPOINT_SECTIONS: usize = 4;

/// Builds a coarse instruction list for `route`.
///
/// The list always starts with a `continue` prompt at the first point and
/// ends with an `arrive` prompt naming `destination` at the last point. In
/// between, a "Continue <direction>" prompt is placed every
/// `len / 4` points (at least every point), pointing along the segment
/// leading into that point. Routes with fewer than two points produce no
/// instructions. Distances are left at zero; proximity is measured live.
pub fn generate_instructions(route: &[Position], destination: &str) -> Vec<Instruction> {
    if route.len() < 2 {
        return Vec::new();
    }

    let mut instructions = Vec::new();
    instructions.push(Instruction::new(
        "start",
        START_TEXT,
        route[0],
        InstructionKind::Continue,
    ));

    let stride = (route.len() / WAYPOINT_SECTIONS).max(1);
    let last = route.len() - 1;
    for i in (stride..last).step_by(stride) {
        let direction = direction_name(bearing_degrees(route[i - 1], route[i]));
        instructions.push(Instruction::new(
            format!("waypoint-{i}"),
            format!("Continue {direction}"),
            route[i],
            InstructionKind::Continue,
        ));
    }

    instructions.push(Instruction::new(
        "arrive",
        format!("Arriving at {destination}"),
        route[last],
        InstructionKind::Arrive,
    ));

    instructions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_routes_produce_nothing() {
        assert!(generate_instructions(&[], "Home").is_empty());
        assert!(generate_instructions(&[Position::new(0.0, 0.0)], "Home").is_empty());
    }

    #[test]
    fn two_point_route_has_start_and_arrival() {
        let route = [Position::new(0.0, 0.0), Position::new(0.0, 1.0)];
        let instructions = generate_instructions(&route, "Home");

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].kind, InstructionKind::Continue);
        assert_eq!(instructions[0].position, route[0]);
        assert_eq!(instructions[0].text, START_TEXT);
        assert_eq!(instructions[1].kind, InstructionKind::Arrive);
        assert_eq!(instructions[1].position, route[1]);
        assert!(instructions[1].text.contains("Home"));
        assert!(instructions.iter().all(|i| i.distance == 0.0));
    }

    #[test]
    fn waypoints_follow_stride_and_bearing() {
        // Eight points heading east, then turning north for the last leg.
        let mut route: Vec<Position> = (0..7).map(|i| Position::new(i as f64 * 0.01, 0.0)).collect();
        route.push(Position::new(0.06, 0.01));

        let instructions = generate_instructions(&route, "Depot");
        let ids: Vec<&str> = instructions.iter().map(|i| i.id.as_str()).collect();

        // stride = 8 / 4 = 2; waypoints at 2, 4, 6 (7 is the arrival point).
        assert_eq!(ids, ["start", "waypoint-2", "waypoint-4", "waypoint-6", "arrive"]);
        assert_eq!(instructions[1].text, "Continue east");
        assert_eq!(instructions[1].position, route[2]);
        assert_eq!(instructions[4].text, "Arriving at Depot");
    }

    #[test]
    fn small_routes_use_every_interior_point() {
        let route = [
            Position::new(0.0, 0.0),
            Position::new(0.0, 0.01),
            Position::new(0.0, 0.02),
        ];
        let instructions = generate_instructions(&route, "Home");
        let ids: Vec<&str> = instructions.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["start", "waypoint-1", "arrive"]);
        assert_eq!(instructions[1].text, "Continue north");
    }
}
