//! Visualization utilities for track_planner
//!
//! Provides a unified interface for plotting tracks, circuits, and planned
//! trajectories using gnuplot. A debugging aid, not part of the planning
//! core.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::Point2D;
use crate::planning::Plan;
use crate::track::{Circuit, Track};

/// Color palette for consistent styling
pub mod colors {
    pub const OBSTACLE: &str = "#000000";
    pub const START: &str = "#00FF00";
    pub const WAYPOINT: &str = "#0000FF";
    pub const PLAN: &str = "#FF0000";
    pub const EXPLORED: &str = "#35C788";
}

enum Layer {
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        color: &'static str,
        caption: String,
        size: f64,
    },
    Lines {
        x: Vec<f64>,
        y: Vec<f64>,
        color: &'static str,
        caption: String,
        width: f64,
    },
}

/// Accumulates drawing layers and renders them in one gnuplot figure
pub struct Visualizer {
    layers: Vec<Layer>,
    title: String,
}

impl Visualizer {
    pub fn new(title: &str) -> Self {
        Self {
            layers: Vec::new(),
            title: title.to_string(),
        }
    }

    /// Draw occupied tiles as obstacle points at their centers
    pub fn draw_track(&mut self, track: &Track) -> &mut Self {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let tile = track.tile_size();
        for row in 0..track.rows() as i32 {
            for col in 0..track.cols() as i32 {
                if track.is_occupied(col, row) {
                    x.push((col as f64 + 0.5) * tile);
                    y.push((row as f64 + 0.5) * tile);
                }
            }
        }
        self.layers.push(Layer::Points {
            x,
            y,
            color: colors::OBSTACLE,
            caption: "Track".to_string(),
            size: 0.6,
        });
        self
    }

    /// Draw the start position and the ordered waypoints
    pub fn draw_circuit(&mut self, circuit: &Circuit) -> &mut Self {
        self.layers.push(Layer::Points {
            x: vec![circuit.start.x],
            y: vec![circuit.start.y],
            color: colors::START,
            caption: "Start".to_string(),
            size: 1.5,
        });
        self.layers.push(Layer::Points {
            x: circuit.waypoints.iter().map(|p| p.x).collect(),
            y: circuit.waypoints.iter().map(|p| p.y).collect(),
            color: colors::WAYPOINT,
            caption: "Waypoints".to_string(),
            size: 1.5,
        });
        self
    }

    /// Draw a planned trajectory as a line through its states
    pub fn draw_plan(&mut self, plan: &Plan, caption: &str) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: plan.steps.iter().map(|s| s.state.position.x).collect(),
            y: plan.steps.iter().map(|s| s.state.position.y).collect(),
            color: colors::PLAN,
            caption: caption.to_string(),
            width: 2.0,
        });
        self
    }

    /// Draw loose exploration states (e.g. drained progress events)
    pub fn draw_explored(&mut self, points: &[Point2D]) -> &mut Self {
        self.layers.push(Layer::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            color: colors::EXPLORED,
            caption: "Explored".to_string(),
            size: 0.4,
        });
        self
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        {
            let axes = figure
                .axes2d()
                .set_title(&self.title, &[])
                .set_x_label("x [m]", &[])
                .set_y_label("y [m]", &[])
                .set_aspect_ratio(AutoOption::Fix(1.0));
            for layer in &self.layers {
                match layer {
                    Layer::Points { x, y, color, caption, size } => {
                        axes.points(
                            x,
                            y,
                            &[
                                Caption(caption),
                                Color(color),
                                PointSymbol('O'),
                                PointSize(*size),
                            ],
                        );
                    }
                    Layer::Lines { x, y, color, caption, width } => {
                        axes.lines(x, y, &[Caption(caption), Color(color), LineWidth(*width)]);
                    }
                }
            }
        }
        figure
    }

    /// Save the figure as a PNG file
    pub fn save_png(&self, path: &str, width: u32, height: u32) -> Result<(), String> {
        self.render()
            .save_to_png(path, width, height)
            .map_err(|e| format!("{:?}", e))
    }

    /// Show the figure in an interactive window
    pub fn show(&self) -> Result<(), String> {
        self.render().show().map(|_| ()).map_err(|e| format!("{:?}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_accumulate() {
        let mut track = Track::open(1.0, 5, 5);
        track.set_occupied(2, 2);
        let circuit = Circuit::new(Point2D::new(1.0, 1.0), 1.0, vec![Point2D::new(4.0, 4.0)]);

        let mut vis = Visualizer::new("test");
        vis.draw_track(&track).draw_circuit(&circuit);
        assert_eq!(vis.layers.len(), 3);
    }
}
