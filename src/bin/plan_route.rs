//! Demo: plan a multi-stop shopping route through a small store layout
//! and run the calibration workflow against it.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use wayfinder_core::{
    Location, Navigator, PassableArea, PixelPoint, Rect, RobotPoint, TransformManager,
    WalkableGrid,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wayfinder_core=info".parse()?)
                .add_directive("plan_route=info".parse()?),
        )
        .init();

    // A toy store: three vertical aisles joined by corridors at the top
    // and bottom, with shelf fixtures blocking the spaces in between.
    let passable = vec![
        PassableArea::new(Rect::new(0.0, 0.0, 400.0, 60.0)),
        PassableArea::new(Rect::new(0.0, 340.0, 400.0, 400.0)),
        PassableArea::new(Rect::new(0.0, 0.0, 60.0, 400.0)),
        PassableArea::narrow(Rect::new(170.0, 60.0, 230.0, 340.0)),
        PassableArea::new(Rect::new(340.0, 0.0, 400.0, 400.0)),
    ];
    let blocked = vec![
        Rect::new(60.0, 60.0, 170.0, 340.0),
        Rect::new(230.0, 60.0, 340.0, 340.0),
    ];

    let grid = Arc::new(WalkableGrid::build(40, 40, 10.0, &passable, &blocked)?);
    let mut navigator = Navigator::new(grid);
    info!(planner = navigator.planner_name(), "navigator ready");

    let mut params = HashMap::new();
    params.insert("two_opt_max_passes".to_string(), 32.0);
    navigator.configure(&params)?;

    let shopping_list = vec![
        Location::new("oat-milk", "Oat milk", PixelPoint::new(390.0, 200.0)),
        Location::new("pasta", "Pasta", PixelPoint::new(200.0, 120.0)),
        Location::new("coffee", "Coffee", PixelPoint::new(30.0, 250.0)),
        Location::new("bread", "Bread", PixelPoint::new(200.0, 300.0)),
    ];

    let entry = PixelPoint::new(20.0, 20.0);
    let checkout = PixelPoint::new(380.0, 380.0);
    let route = navigator.plan_route(entry, &shopping_list, checkout)?;

    println!("Visiting order:");
    for (i, stop) in route.stops.iter().enumerate() {
        println!(
            "  {}. {} at ({:.0}, {:.0}){}",
            i + 1,
            stop.location.name,
            stop.location.position.x,
            stop.location.position.y,
            if stop.teleported { "  [degraded leg]" } else { "" },
        );
    }
    println!("Total path length: {:.1} px over {} points", route.total_length, route.points.len());
    if !route.unreachable.is_empty() {
        println!("Unreachable stops: {:?}", route.unreachable);
    }

    // Calibration: three reference points measured in both frames
    let transforms = TransformManager::new();
    transforms.add_point(
        "entry-door",
        "Store entry door",
        PixelPoint::new(20.0, 20.0),
        RobotPoint::new(0.0, 0.0),
    )?;
    transforms.add_point(
        "endcap-3",
        "Aisle 3 endcap",
        PixelPoint::new(380.0, 20.0),
        RobotPoint::new(7.2, 0.0),
    )?;
    transforms.add_point(
        "checkout-1",
        "Checkout lane 1",
        PixelPoint::new(380.0, 380.0),
        RobotPoint::new(7.2, 7.2),
    )?;

    let fitted = transforms.parameters();
    println!(
        "Calibration: scale {:.2} px/m, rotation {:.1} deg, residual {:.2} px",
        fitted.scale,
        fitted.rotation.to_degrees(),
        fitted.mean_residual_px,
    );

    let telemetry = RobotPoint::new(3.6, 3.6);
    let on_map = transforms.forward(telemetry);
    println!(
        "Robot at ({:.1}, {:.1}) m shows at ({:.0}, {:.0}) px",
        telemetry.x, telemetry.y, on_map.x, on_map.y
    );

    let goal = transforms.inverse(checkout);
    println!(
        "Checkout goal ({:.0}, {:.0}) px is ({:.2}, {:.2}) m in the robot frame",
        checkout.x, checkout.y, goal.x, goal.y
    );

    Ok(())
}
