// Hybrid-A* planning demo on a small synthetic track

use std::sync::Arc;

use track_planner::common::{Point2D, TrajectoryPlanner, VehicleState};
use track_planner::planning::{HybridAStarConfig, HybridAStarPlanner};
use track_planner::track::{Circuit, Track};
use track_planner::utils::Visualizer;
use track_planner::vehicle::{ActionSet, VehicleParams};

fn main() {
    println!("Hybrid-A* track planning start!!");

    // 50x30 m track with a chicane of two walls
    let mut track = Track::open(1.0, 50, 30);
    for row in 8..30 {
        track.set_occupied(18, row);
    }
    for row in 0..22 {
        track.set_occupied(34, row);
    }

    let circuit = Circuit::new(
        Point2D::new(6.0, 15.0),
        3.0,
        vec![Point2D::new(26.0, 4.0), Point2D::new(44.0, 26.0)],
    );

    let params = VehicleParams {
        max_speed: 10.0,
        ..Default::default()
    };
    let actions = ActionSet::generate(3, 5).expect("action set");
    let mut planner = HybridAStarPlanner::new(
        Arc::new(track.clone()),
        &circuit,
        params,
        actions,
        HybridAStarConfig::default(),
    )
    .expect("planner");

    let progress = planner.subscribe_progress();
    let initial = VehicleState::at_rest(circuit.start, 0.0);

    match planner.find_optimal_plan(initial) {
        Ok(Some(plan)) => {
            println!(
                "Plan found: {} steps, {:.1} s trajectory",
                plan.len(),
                plan.duration()
            );

            let explored: Vec<Point2D> =
                progress.try_iter().map(|s| s.position).collect();
            println!("Explored {} states", explored.len());

            let mut vis = Visualizer::new("Hybrid-A* Track Planning");
            vis.draw_track(&track)
                .draw_explored(&explored)
                .draw_circuit(&circuit)
                .draw_plan(&plan, "Plan");
            match vis.save_png("img/plan_track.png", 800, 600) {
                Ok(()) => println!("Plot saved to: img/plan_track.png"),
                Err(e) => println!("Plotting failed: {}", e),
            }
        }
        Ok(None) => println!("No plan found!"),
        Err(e) => println!("Planning failed: {}", e),
    }

    println!("Hybrid-A* track planning finish!!");
}
