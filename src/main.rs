use lgflow::prelude::*;

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> LgResult<()> {
    let matches = cli::get_args()?;
    let config = cli::parse_matches(&matches)?;

    let model = Model::from_name(config.get_model_name())
        .ok_or_else(|| format!("Unknown model: {}", config.get_model_name()))?;
    let case_name = config.get_case_name();
    let cell_types = functions::case_cell_types(case_name, config.dim_x, config.dim_y)
        .ok_or_else(|| format!("Unknown case: {case_name}"))?;
    let body_force_axis = match config.force_dir.as_str() {
        "x" => ForceAxis::X,
        "y" => ForceAxis::Y,
        other => return Err(format!("Unknown body-force axis: {other}").into()),
    };
    // The diffusion box starts with all its particles in the western half.
    let seeded_region = match case_name {
        "diffusion" => Some([0, 0, config.dim_x / 2, config.dim_y]),
        _ => None,
    };

    let parameters = lattice::Parameters {
        model,
        dim_x: config.dim_x,
        dim_y: config.dim_y,
        reynolds: config.reynolds,
        mach: config.mach,
        coarse_graining_radius: config.coarse_graining_radius,
        cell_types,
        initial_occupancy: config.occupancy,
        seeded_region,
        body_force_axis,
        body_force_intensity: config.forcing,
        seed: config.seed,
        ..Default::default()
    };

    solve(config, parameters)
}
