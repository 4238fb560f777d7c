//! Prints an ASCII cross-section of the pile after a partial pour.
//!
//! Useful for eyeballing the angle-of-repose behavior: the stack should
//! be tallest under the neck and fall away toward the glass.
//!
//! Run with: cargo run --example pile_profile -p sandglass --release

use sandglass::{HourglassSimulation, ProgressSnapshot, SimParams};

fn main() {
    let params = SimParams::default();
    let cell_size = params.pile_cell_size;
    let floor_y = params.floor_y;
    let mut sim = HourglassSimulation::new(params).expect("default params are valid");

    // Pour at a steady mid-interval rate for twenty simulated seconds.
    let snapshot = ProgressSnapshot {
        progress: 0.6,
        active: true,
    };
    for _ in 0..1200 {
        sim.step(1.0 / 60.0, snapshot);
    }

    println!(
        "{} grains settled over {} cells after 20s\n",
        sim.settled_in_pile_count(),
        sim.pile.occupied_cells()
    );

    // Column heights along x through the central z row.
    let span = 12i32;
    let rows = 16usize;
    let max_height = sim.pile.max_height();
    let scale = (max_height - floor_y).max(1e-3);

    for row in (0..rows).rev() {
        let level = floor_y + scale * (row as f32 + 0.5) / rows as f32;
        let mut line = String::new();
        for cx in -span..=span {
            let h = sim.pile.query((cx, 0));
            line.push(if h >= level { '#' } else { ' ' });
        }
        println!("|{line}|");
    }
    println!("+{}+", "-".repeat((span * 2 + 1) as usize));
    println!(
        "x in [{:.2}, {:.2}], pile top {:.3}, floor {:.3}",
        -span as f32 * cell_size,
        span as f32 * cell_size,
        max_height,
        floor_y
    );
}
