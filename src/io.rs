// ------------------------------------------------------------------------------- IMPORTS

use crate::cli::LgResult;
use crate::constants::{Float, SPATIAL_DIM};
use crate::lattice::Lattice;
use colored::*;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub(crate) const DATA_PATH: &str = "./data";
pub(crate) const CELL_DENSITY_FILE: &str = "cell_density.csv";
pub(crate) const CELL_MOMENTUM_FILE: &str = "cell_momentum.csv";
pub(crate) const MEAN_DENSITY_FILE: &str = "mean_density.csv";
pub(crate) const MEAN_MOMENTUM_FILE: &str = "mean_momentum.csv";
pub(crate) const MEAN_VELOCITY_FILE: &str = "mean_velocity.csv";

pub(crate) fn create_case_directories() -> LgResult<()> {
    let path = Path::new(DATA_PATH);
    if !path.exists() {
        println!("Creating the {} path.\n", DATA_PATH.yellow().bold());
        fs::create_dir(path)?;
    }
    Ok(())
}

/// One-line step counter, redrawn in place as the simulation advances.
pub(crate) fn print_step_progress(step: usize, max_steps: usize) {
    const TICKS: usize = 40;
    let done = step + 1;
    let filled = done * TICKS / max_steps;
    let bar: String = (0..TICKS)
        .map(|tick| if tick < filled { '#' } else { '.' })
        .collect();
    print!(
        "\r{}",
        format!("[{bar}] step {done}/{max_steps}").green().bold()
    );
    let _ = std::io::stdout().flush();
    if done == max_steps {
        println!();
        println!();
    }
}

fn write_scalar_file<P: AsRef<Path>>(path: P, header: &str, values: &[Float]) -> LgResult<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{header}")?;
    for value in values {
        writeln!(file, "{value}")?;
    }
    Ok(())
}

fn write_vector_file<P: AsRef<Path>>(path: P, header: &str, values: &[Float]) -> LgResult<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{header}")?;
    for pair in values.chunks(SPATIAL_DIM) {
        writeln!(file, "{},{}", pair[0], pair[1])?;
    }
    Ok(())
}

/// Writes the derived fields of the current time step under
/// `./data/<time_step>/`.
pub(crate) fn write_time_step(lattice: &Lattice, time_step: usize) -> LgResult<()> {
    let step_path = Path::new(DATA_PATH).join(time_step.to_string());
    if !step_path.exists() {
        fs::create_dir(&step_path)?;
    }
    write_scalar_file(
        step_path.join(CELL_DENSITY_FILE),
        "density",
        lattice.get_cell_density(),
    )?;
    write_vector_file(
        step_path.join(CELL_MOMENTUM_FILE),
        "momentum_x,momentum_y",
        lattice.get_cell_momentum(),
    )?;
    write_scalar_file(
        step_path.join(MEAN_DENSITY_FILE),
        "mean_density",
        lattice.get_mean_density(),
    )?;
    write_vector_file(
        step_path.join(MEAN_MOMENTUM_FILE),
        "mean_momentum_x,mean_momentum_y",
        lattice.get_mean_momentum(),
    )?;
    Ok(())
}

pub(crate) fn append_mean_velocity(time_step: usize, mean_velocity: &[Float]) -> LgResult<()> {
    let path = Path::new(DATA_PATH).join(MEAN_VELOCITY_FILE);
    let write_header = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if write_header {
        writeln!(file, "time_step,mean_velocity_x,mean_velocity_y")?;
    }
    writeln!(file, "{},{},{}", time_step, mean_velocity[0], mean_velocity[1])?;
    Ok(())
}

pub(crate) fn report_mean_velocity(time_step: usize, mean_velocity: &[Float]) {
    println!(
        "\nStep {}: mean velocity = ({:.6}, {:.6})",
        time_step.to_string().bold(),
        mean_velocity[0],
        mean_velocity[1]
    );
}
