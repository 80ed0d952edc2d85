// ------------------------------------------------------------------------------- MODULES

pub mod bitset;
pub mod cli;
mod constants;
pub mod functions;
mod io;
pub mod lattice;
pub mod model;
pub mod neighborhood;
pub mod prelude;

// ------------------------------------------------------------------------------- IMPORTS

use crate::cli::{Config, LgResult};
use colored::*;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CellType {
    Fluid = 0,
    SolidNoSlip = 1,
    SolidSlip = 2,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ForceAxis {
    X,
    Y,
}

/// Runs a configured simulation: steps the lattice, injects the body force,
/// and at the write frequency derives and writes the output fields.
pub fn solve(config: Config, parameters: lattice::Parameters) -> LgResult<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.get_number_of_threads())
        .build_global()
        .ok();

    io::create_case_directories()?;

    println!(
        "Running case {} with model {:?} on a {} x {} lattice.\n",
        config.get_case_name().yellow().bold(),
        parameters.model,
        parameters.dim_x,
        parameters.dim_y
    );

    let forcing = parameters.body_force_intensity;
    let mut lattice = lattice::Lattice::new(parameters);

    let max_steps = config.get_max_steps();
    let write_frequency = config.get_write_frequency().max(1);

    for step in 0..max_steps {
        lattice.collide_and_propagate();
        if forcing > 0 {
            lattice.apply_body_force(forcing);
        }
        if (step + 1) % write_frequency == 0 || step + 1 == max_steps {
            lattice.post_process();
            io::write_time_step(&lattice, step + 1)?;
            let mean_velocity = lattice.get_mean_velocity();
            io::report_mean_velocity(step + 1, &mean_velocity);
            io::append_mean_velocity(step + 1, &mean_velocity)?;
        }
        io::print_step_progress(step, max_steps);
    }

    Ok(())
}
