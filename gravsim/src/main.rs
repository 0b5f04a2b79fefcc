use gravsim::{bench_gravity, bench_integrators};
use gravsim::{precalculate, read_bodies_csv, write_trajectory_csv};
use gravsim::{CollisionModel, IntegratorType, Scenario, ScenarioConfig};
use gravsim::simulation::params::G_SI;

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Direct N-body gravity simulator")]
struct Args {
    /// Scenario YAML, a path or a name under scenarios/. Defaults to the Earth-Moon preset.
    #[arg(short, long)]
    file_name: Option<String>,

    /// Override the integrator (verlet | rk4)
    #[arg(long)]
    integrator: Option<IntegratorType>,

    /// Override the collision model (ignore | elastic | merge)
    #[arg(long)]
    collision: Option<CollisionModel>,

    /// Override the time step in seconds
    #[arg(long)]
    dt: Option<f64>,

    /// Override the batch run length in seconds
    #[arg(long)]
    total_time: Option<f64>,

    /// Replace the scenario's bodies with the body blocks of an exported CSV
    #[arg(long)]
    import_csv: Option<PathBuf>,

    /// Write the pre-calculated trajectory as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Save the (overridden) scenario as YAML
    #[arg(long)]
    save: Option<PathBuf>,

    /// Run the force and integrator benchmarks instead
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario(file_name: Option<&str>) -> Result<ScenarioConfig> {
    let Some(file_name) = file_name else {
        return Ok(gravsim::earth_moon_config(G_SI));
    };

    let direct = PathBuf::from(file_name);
    let config_path = if direct.is_file() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_integrators()?;
        return Ok(());
    }

    let mut scenario_cfg = load_scenario(args.file_name.as_deref())?;
    if let Some(integrator) = args.integrator {
        scenario_cfg.engine.integrator = integrator;
    }
    if let Some(collision) = args.collision {
        scenario_cfg.engine.collision_model = collision;
    }
    if let Some(dt) = args.dt {
        scenario_cfg.parameters.dt = dt;
    }
    if let Some(total_time) = args.total_time {
        scenario_cfg.parameters.total_time = total_time;
    }

    if let Some(path) = &args.import_csv {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let bodies = read_bodies_csv(BufReader::new(file))
            .with_context(|| format!("failed to read bodies from {}", path.display()))?;
        println!("imported {} bodies from {}", bodies.len(), path.display());
        scenario_cfg.bodies = bodies;
    }

    let mut scenario = Scenario::build(scenario_cfg).context("invalid scenario")?;

    if let Some(path) = &args.save {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        scenario.to_config().to_writer(BufWriter::new(file))?;
        println!("scenario saved to {}", path.display());
    }

    let trajectory = precalculate(&mut scenario.engine, scenario.total_time)?;

    let engine = &scenario.engine;
    println!(
        "t = {:.3} s after {} steps, {} active bodies ({} integrator, {} collisions)",
        engine.time_elapsed(),
        trajectory.len(),
        engine.active_count(),
        engine.integrator_type(),
        engine.collision_model(),
    );
    for b in engine.active_bodies() {
        println!(
            "  [{}] {:<20} m = {:.4e}  x = ({:.4e}, {:.4e}, {:.4e})  |v| = {:.4e}",
            b.id, b.name, b.m, b.x.x, b.x.y, b.x.z, b.v.norm()
        );
    }
    match trajectory.energy_drift_percent() {
        Some(drift) => println!("total energy drift: {drift:.3e} %"),
        None => println!("total energy drift: n/a"),
    }

    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        write_trajectory_csv(
            BufWriter::new(file),
            engine.parameters(),
            scenario.total_time,
            &scenario.initial_bodies,
            &trajectory,
        )?;
        println!("trajectory written to {}", path.display());
    }

    Ok(())
}
