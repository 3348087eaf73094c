//! End-to-end planning scenarios over realistic store layouts

use std::sync::Arc;
use wayfinder_core::{
    Location, Navigator, PassableArea, PixelPoint, Rect, RobotPoint, TransformManager,
    WalkableGrid,
};

/// A single narrow corridor holding the entry, three stops, and the
/// checkout. The route must come out continuous with no degraded legs.
#[test]
fn corridor_route_is_continuous() {
    let corridor = PassableArea::new(Rect::new(200.0, 129.0, 220.0, 363.0));
    let grid = Arc::new(WalkableGrid::build(90, 51, 10.0, &[corridor], &[]).unwrap());
    let navigator = Navigator::new(Arc::clone(&grid));

    let stops = vec![
        Location::new("stop-1", "Shelf A", PixelPoint::new(210.0, 200.0)),
        Location::new("stop-2", "Shelf B", PixelPoint::new(215.0, 300.0)),
        Location::new("stop-3", "Shelf C", PixelPoint::new(212.0, 340.0)),
    ];
    let entry = PixelPoint::new(218.0, 160.0);
    let checkout = PixelPoint::new(218.0, 360.0);

    let route = navigator.plan_route(entry, &stops, checkout).unwrap();

    assert!(route.total_length > 0.0);
    assert!(!route.is_degraded());
    assert!(route.unreachable.is_empty());
    assert_eq!(route.stops.len(), 3);

    // Every consecutive pair of points is 8-connected grid-adjacent and
    // lands on a walkable cell
    for pair in route.points.windows(2) {
        let a = grid.pixel_to_grid(pair[0].position);
        let b = grid.pixel_to_grid(pair[1].position);
        assert!(
            (a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1,
            "route jumps from {:?} to {:?}",
            a,
            b
        );
        assert!(grid.is_walkable(b));
    }

    // Down a single corridor the stops come back in shelf order
    let visited: Vec<&str> = route.stops.iter().map(|s| s.location.id.as_str()).collect();
    assert_eq!(visited, vec!["stop-1", "stop-2", "stop-3"]);

    // Each stop is tagged exactly once on the polyline
    for stop in &stops {
        let tags = route
            .points
            .iter()
            .filter(|p| p.stop_id.as_deref() == Some(stop.id.as_str()))
            .count();
        assert_eq!(tags, 1, "stop {} tagged {} times", stop.id, tags);
    }
}

/// A stop on a disconnected island degrades its legs but never aborts the
/// route; the rest of the trip is still planned.
#[test]
fn island_stop_degrades_but_route_completes() {
    let grid = Arc::new(
        WalkableGrid::build(
            30,
            30,
            10.0,
            &[
                PassableArea::new(Rect::new(0.0, 0.0, 150.0, 300.0)),
                // Disconnected island on the far side
                PassableArea::new(Rect::new(250.0, 130.0, 290.0, 170.0)),
            ],
            &[],
        )
        .unwrap(),
    );
    let navigator = Navigator::new(grid);

    let stops = vec![
        Location::new("aisle", "Main aisle", PixelPoint::new(75.0, 150.0)),
        Location::new("island", "Cut-off corner", PixelPoint::new(270.0, 150.0)),
    ];

    let route = navigator
        .plan_route(
            PixelPoint::new(15.0, 15.0),
            &stops,
            PixelPoint::new(15.0, 285.0),
        )
        .unwrap();

    assert!(route.is_degraded());
    assert_eq!(route.stops.len(), 2);
    assert!(route.unreachable.is_empty());
    let island = route.stops.iter().find(|s| s.location.id == "island").unwrap();
    assert!(island.teleported);
    // The route still ends at the checkout cell
    let last = route.points.last().unwrap();
    assert_eq!(last.position, PixelPoint::new(15.0, 285.0));
}

/// Removing the third calibration point drops the manager below the
/// minimum and the transform falls back to identity passthrough.
#[test]
fn removing_third_calibration_point_disables_transform() {
    let manager = TransformManager::new();
    manager
        .add_point("a", "front-left", PixelPoint::new(100.0, 100.0), RobotPoint::new(0.0, 0.0))
        .unwrap();
    manager
        .add_point("b", "front-right", PixelPoint::new(300.0, 100.0), RobotPoint::new(4.0, 0.0))
        .unwrap();
    manager
        .add_point("c", "back-left", PixelPoint::new(100.0, 300.0), RobotPoint::new(0.0, 4.0))
        .unwrap();
    assert!(manager.parameters().enabled);

    assert!(manager.remove_point("c").unwrap());
    assert!(!manager.parameters().enabled);

    let p = RobotPoint::new(2.0, 3.0);
    let mapped = manager.forward(p);
    assert_eq!((mapped.x, mapped.y), (2.0, 3.0));
}

/// Planning-frame goals convert into the robot frame and back without
/// drifting, while the navigator keeps working against the same map.
#[test]
fn calibrated_goal_round_trip_with_planning() {
    let grid = Arc::new(
        WalkableGrid::build(
            40,
            40,
            10.0,
            &[PassableArea::new(Rect::new(0.0, 0.0, 400.0, 400.0))],
            &[],
        )
        .unwrap(),
    );
    let navigator = Navigator::new(grid);

    let manager = TransformManager::new();
    // Store maps at 50 px per meter with the robot origin at the entry
    manager
        .add_point("o", "origin", PixelPoint::new(20.0, 20.0), RobotPoint::new(0.0, 0.0))
        .unwrap();
    manager
        .add_point("x", "x axis", PixelPoint::new(320.0, 20.0), RobotPoint::new(6.0, 0.0))
        .unwrap();
    manager
        .add_point("y", "y axis", PixelPoint::new(20.0, 320.0), RobotPoint::new(0.0, 6.0))
        .unwrap();

    let params = manager.parameters();
    assert!(params.enabled);
    assert!(params.mean_residual_px < 0.1);

    // A planned goal survives the frame round trip within a tenth of a pixel
    let goal = PixelPoint::new(275.0, 135.0);
    let path = navigator.plan_path(PixelPoint::new(25.0, 25.0), goal).unwrap();
    assert!(!path.is_empty());

    let robot_goal = manager.inverse(goal);
    let back = manager.forward(robot_goal);
    assert!((back.x - goal.x).abs() < 0.1);
    assert!((back.y - goal.y).abs() < 0.1);
}
