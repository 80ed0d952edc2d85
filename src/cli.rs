use crate::constants::Float;
use clap::{Arg, Command};
use std::num::{NonZero, NonZeroUsize};

pub type LgResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug)]
pub struct Config {
    pub number_of_threads: NonZeroUsize,
    pub case_name: Option<String>,
    pub model_name: String,
    pub dim_x: usize,
    pub dim_y: usize,
    pub max_steps: usize,
    pub write_frequency: usize,
    pub reynolds: Float,
    pub mach: Float,
    pub coarse_graining_radius: usize,
    pub occupancy: Float,
    pub forcing: usize,
    pub force_dir: String,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            number_of_threads: NonZero::new(1).unwrap(),
            case_name: None,
            model_name: "fhp-i".to_string(),
            dim_x: 256,
            dim_y: 128,
            max_steps: 500,
            write_frequency: 50,
            reynolds: 80.0,
            mach: 0.2,
            coarse_graining_radius: 1,
            occupancy: 0.3,
            forcing: 50,
            force_dir: "x".to_string(),
            seed: 42,
        }
    }
}

impl Config {
    pub fn get_number_of_threads(&self) -> usize {
        usize::from(self.number_of_threads)
    }

    pub fn get_case_name(&self) -> &str {
        self.case_name.as_deref().unwrap_or("unknown")
    }

    pub fn get_model_name(&self) -> &str {
        &self.model_name
    }

    pub fn get_max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn get_write_frequency(&self) -> usize {
        self.write_frequency
    }
}

pub fn get_args() -> LgResult<clap::ArgMatches> {
    let matches = clap::command!()
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("number_of_threads")
                .short('n')
                .long("num-threads")
                .value_name("NTHREADS")
                .help("The number of threads used (min = 1)")
                .value_parser(clap::value_parser!(NonZeroUsize))
                .default_value("1")
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Run the simulation")
                .arg(
                    Arg::new("case_name")
                        .short('c')
                        .long("case-name")
                        .value_name("CASE")
                        .help("The test case to be simulated (periodic, pipe, karman, diffusion)")
                        .required(true),
                )
                .arg(
                    Arg::new("model")
                        .short('M')
                        .long("model")
                        .value_name("MODEL")
                        .help("The particle-velocity model (hpp, fhp-i, fhp-ii, fhp-iii)")
                        .default_value("fhp-i"),
                )
                .arg(
                    Arg::new("dim_x")
                        .short('x')
                        .long("dim-x")
                        .value_name("CELLS")
                        .help("Lattice width in cells")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("256"),
                )
                .arg(
                    Arg::new("dim_y")
                        .short('y')
                        .long("dim-y")
                        .value_name("CELLS")
                        .help("Lattice height in cells (even for FHP models)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("128"),
                )
                .arg(
                    Arg::new("max_steps")
                        .short('m')
                        .long("max-steps")
                        .value_name("STEPS")
                        .help("The number of simulation steps")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("500"),
                )
                .arg(
                    Arg::new("write_data")
                        .short('w')
                        .long("write-data")
                        .value_name("FREQUENCY")
                        .help("The frequency at which data is post-processed and written")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    Arg::new("reynolds")
                        .long("reynolds")
                        .value_name("RE")
                        .help("Reynolds number target")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("80.0"),
                )
                .arg(
                    Arg::new("mach")
                        .long("mach")
                        .value_name("MA")
                        .help("Mach number relative to the lattice speed of sound")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0.2"),
                )
                .arg(
                    Arg::new("coarse_radius")
                        .short('r')
                        .long("coarse-radius")
                        .value_name("RADIUS")
                        .help("Coarse-graining radius in cells")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("occupancy")
                        .long("occupancy")
                        .value_name("PROB")
                        .help("Initial node occupancy probability")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0.3"),
                )
                .arg(
                    Arg::new("forcing")
                        .short('f')
                        .long("forcing")
                        .value_name("PARTICLES")
                        .help("Particles reverted per body-force application (0 disables)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    Arg::new("force_dir")
                        .long("force-dir")
                        .value_name("AXIS")
                        .help("Body-force axis (x or y)")
                        .default_value("x"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Seed for the random pool and the body-force sampler")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("42"),
                ),
        )
        .get_matches();
    Ok(matches)
}

pub fn parse_matches(matches: &clap::ArgMatches) -> LgResult<Config> {
    let number_of_threads = *matches
        .get_one::<NonZeroUsize>("number_of_threads")
        .expect("Has 1 as default");
    match matches.subcommand() {
        Some(("run", sub_m)) => {
            let cfg = Config {
                number_of_threads,
                case_name: sub_m.get_one::<String>("case_name").cloned(),
                model_name: sub_m.get_one::<String>("model").cloned().unwrap(),
                dim_x: *sub_m.get_one::<usize>("dim_x").unwrap(),
                dim_y: *sub_m.get_one::<usize>("dim_y").unwrap(),
                max_steps: *sub_m.get_one::<usize>("max_steps").unwrap(),
                write_frequency: *sub_m.get_one::<usize>("write_data").unwrap(),
                reynolds: *sub_m.get_one::<f64>("reynolds").unwrap(),
                mach: *sub_m.get_one::<f64>("mach").unwrap(),
                coarse_graining_radius: *sub_m.get_one::<usize>("coarse_radius").unwrap(),
                occupancy: *sub_m.get_one::<f64>("occupancy").unwrap(),
                forcing: *sub_m.get_one::<usize>("forcing").unwrap(),
                force_dir: sub_m.get_one::<String>("force_dir").cloned().unwrap(),
                seed: *sub_m.get_one::<u64>("seed").unwrap(),
            };
            Ok(cfg)
        }
        _ => unreachable!("At least one subcommand is required: .subcommand_required(true)"),
    }
}
