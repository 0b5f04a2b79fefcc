use gravsim::simulation::params::G_SI;
use gravsim::{earth_moon_config, precalculate, radius_from_mass, read_bodies_csv, write_trajectory_csv};
use gravsim::{CollisionModel, IntegratorType, NVec3, Scenario, ScenarioConfig, SimError};

const MERGE_YAML: &str = r#"
engine:
  integrator: verlet
  collision_model: merge

parameters:
  G: 1.0e-6
  dt: 0.01
  total_time: 0.2

bodies:
  - id: 0
    name: Left
    mass: 1.0
    position: [-1.0, 0.0, 0.0]
    velocity: [10.0, 0.0, 0.0]
    radius: 0.1
    color: orange
  - id: 1
    name: Right
    mass: 1.0
    pos: [1.0, 0.0, 0.0]
    vel: [-10.0, 0.0, 0.0]
    radius: 0.1
    color: red
  - id: 5
    name: Witness
    mass: 0.5
    position: [0.0, 50.0, 0.0]
    velocity: [0.0, 0.0, 0.0]
    radius: 0.1
"#;

fn merge_scenario() -> Scenario {
    Scenario::build(ScenarioConfig::from_yaml_str(MERGE_YAML).unwrap()).unwrap()
}

#[test]
fn yaml_scenario_builds_engine() {
    let scenario = merge_scenario();
    let engine = &scenario.engine;

    assert_eq!(engine.integrator_type(), IntegratorType::Verlet);
    assert_eq!(engine.collision_model(), CollisionModel::Merge);
    assert_eq!(engine.g(), 1.0e-6);
    assert_eq!(engine.dt(), 0.01);
    assert_eq!(scenario.total_time, 0.2);
    assert_eq!(engine.active_count(), 3);
    assert_eq!(engine.next_body_id(), 6);

    // pos/vel aliases and the default color
    let right = engine.body(1).unwrap();
    assert_eq!(right.x, NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(right.v, NVec3::new(-10.0, 0.0, 0.0));
    assert_eq!(engine.body(5).unwrap().color, "blue");

    // accelerations are ready before the first step
    assert!(engine.body(0).unwrap().a.x > 0.0);
}

#[test]
fn scenario_config_survives_yaml_round_trip() {
    let scenario = merge_scenario();
    let yaml = scenario.to_config().to_yaml_string().unwrap();

    let reloaded = Scenario::build(ScenarioConfig::from_yaml_str(&yaml).unwrap()).unwrap();

    assert_eq!(reloaded.initial_bodies, scenario.initial_bodies);
    assert_eq!(reloaded.total_time, scenario.total_time);
    assert_eq!(reloaded.engine.collision_model(), CollisionModel::Merge);
    assert_eq!(reloaded.engine.parameters().seed, 42);
}

#[test]
fn invalid_scenarios_are_rejected() {
    let bad_mass = MERGE_YAML.replacen("mass: 1.0", "mass: -1.0", 1);
    let err = Scenario::build(ScenarioConfig::from_yaml_str(&bad_mass).unwrap());
    assert!(matches!(err, Err(SimError::NonPositiveMass { .. })));

    let bad_arity = MERGE_YAML.replacen("[-1.0, 0.0, 0.0]", "[-1.0, 0.0]", 1);
    let err = Scenario::build(ScenarioConfig::from_yaml_str(&bad_arity).unwrap());
    assert!(matches!(err, Err(SimError::BadArity { .. })));

    let bad_dt = MERGE_YAML.replacen("dt: 0.01", "dt: 0.0", 1);
    let err = Scenario::build(ScenarioConfig::from_yaml_str(&bad_dt).unwrap());
    assert!(matches!(err, Err(SimError::NonPositiveTimeStep(_))));

    let bad_g = MERGE_YAML.replacen("G: 1.0e-6", "G: -1.0", 1);
    let err = Scenario::build(ScenarioConfig::from_yaml_str(&bad_g).unwrap());
    assert!(matches!(err, Err(SimError::NonPositiveG(_))));

    let bad_model = MERGE_YAML.replacen("collision_model: merge", "collision_model: explode", 1);
    assert!(matches!(ScenarioConfig::from_yaml_str(&bad_model), Err(SimError::Yaml(_))));
}

#[test]
fn scenario_reset_restores_initial_bodies() {
    let mut scenario = merge_scenario();
    for _ in 0..20 {
        scenario.engine.simulation_step();
    }
    assert_eq!(scenario.engine.active_count(), 2);

    scenario.reset().unwrap();

    assert_eq!(scenario.engine.time_elapsed(), 0.0);
    assert_eq!(scenario.engine.bodies().len(), 3);
    assert_eq!(scenario.engine.body(0).unwrap().x, NVec3::new(-1.0, 0.0, 0.0));
    assert!(scenario.engine.bodies().iter().all(|b| b.trail.is_empty() && !b.merged));
}

#[test]
fn earth_moon_preset_is_a_bound_barycentric_orbit() {
    let scenario = Scenario::earth_moon(G_SI).unwrap();
    let engine = &scenario.engine;

    assert_eq!(engine.active_count(), 2);
    assert_eq!(engine.dt(), 3600.0);
    assert_eq!(scenario.total_time, 60.0 * 24.0 * 3600.0);

    let com = engine.center_of_mass(None);
    assert!(com.x.norm() < 1e-3);
    assert!(com.v.norm() < 1e-12);
    assert!(engine.system_energy().total < 0.0);
}

#[test]
fn earth_moon_precalculation_keeps_energy() {
    let mut scenario = Scenario::earth_moon(G_SI).unwrap();
    let trajectory = precalculate(&mut scenario.engine, 5.0 * 24.0 * 3600.0).unwrap();

    assert_eq!(trajectory.len(), 120);
    assert_eq!(trajectory.energy_series().len(), 121);
    assert!((trajectory.frames[119].time - 432_000.0).abs() < 1e-6);

    let drift = trajectory.energy_drift_percent().unwrap();
    assert!(drift.abs() < 1.0, "drift {drift} %");

    // the Moon keeps roughly its orbital radius
    let moon = &trajectory.frames[119].bodies[1];
    let r = (moon.position[0].powi(2) + moon.position[1].powi(2)).sqrt();
    assert!((r / 3.797e8 - 1.0).abs() < 0.01, "moon at {r}");
}

#[test]
fn precalculation_rejects_bad_lengths() {
    let mut scenario = merge_scenario();

    assert!(matches!(
        precalculate(&mut scenario.engine, 0.0),
        Err(SimError::NonPositiveDuration(_))
    ));
    assert!(matches!(
        precalculate(&mut scenario.engine, 0.005),
        Err(SimError::DurationTooShort { .. })
    ));
    assert!(matches!(
        precalculate(&mut scenario.engine, 1e300),
        Err(SimError::TooManySteps { .. })
    ));
    assert!(matches!(
        precalculate(&mut scenario.engine, f64::INFINITY),
        Err(SimError::TooManySteps { .. })
    ));
    assert_eq!(scenario.engine.time_elapsed(), 0.0);
}

#[test]
fn precalculation_records_merges() {
    let mut scenario = merge_scenario();
    let trajectory = precalculate(&mut scenario.engine, scenario.total_time).unwrap();

    assert_eq!(trajectory.len(), 20);
    assert_eq!(trajectory.frames[0].bodies.len(), 3);

    let last = trajectory.frames.last().unwrap();
    assert_eq!(last.bodies.len(), 2);
    assert!(last.bodies.iter().any(|b| b.name == "Merged(Left+Right)" && b.mass == 2.0));
}

#[test]
fn csv_export_layout() {
    let mut scenario = merge_scenario();
    let trajectory = precalculate(&mut scenario.engine, scenario.total_time).unwrap();

    let mut out = Vec::new();
    write_trajectory_csv(
        &mut out,
        scenario.engine.parameters(),
        scenario.total_time,
        &scenario.initial_bodies,
        &trajectory,
    )
    .unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Parameter,Value");
    assert_eq!(lines[1], "G,0.000001");
    assert_eq!(lines[2], "TimeStep,0.01");
    assert_eq!(lines[3], "TotalSimTime_Predefined,0.2");
    assert_eq!(lines[4], "Integrator,verlet");
    assert_eq!(lines[5], "CollisionModel,merge");
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], "Left_ID,0");
    assert_eq!(lines[8], "Left_Mass,1");
    assert_eq!(lines[9], "Left_InitialPosX,-1");
    assert!(lines.contains(&"Left_Color,orange"));
    assert!(lines.contains(&"Witness_ID,5"));

    let header_at = lines.iter().position(|l| l.starts_with("Time,")).unwrap();
    let header: Vec<&str> = lines[header_at].split(',').collect();
    assert_eq!(header.len(), 1 + 3 * 6);
    assert_eq!(&header[1..4], &["Left_Px", "Left_Py", "Left_Pz"]);
    assert_eq!(header[18], "Witness_Vz");

    let rows = &lines[header_at + 1..];
    assert_eq!(rows.len(), trajectory.len());
    assert!(rows.iter().all(|r| r.split(',').count() == 19));
    assert!(!rows[0].contains("N/A"));
    assert!(rows.last().unwrap().contains("N/A"));
}

#[test]
fn earth_moon_config_scales_with_g() {
    let slow = earth_moon_config(G_SI);
    let fast = earth_moon_config(4.0 * G_SI);

    let ratio = fast.bodies[1].velocity[1] / slow.bodies[1].velocity[1];
    assert!((ratio - 2.0).abs() < 1e-12);
}

fn export_csv(scenario: &mut Scenario) -> String {
    let trajectory = precalculate(&mut scenario.engine, scenario.total_time).unwrap();
    let mut out = Vec::new();
    write_trajectory_csv(
        &mut out,
        scenario.engine.parameters(),
        scenario.total_time,
        &scenario.initial_bodies,
        &trajectory,
    )
    .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn csv_export_quotes_names_with_commas() {
    let yaml = MERGE_YAML.replace("name: Left", "name: \"Alpha, \\\"A\\\"\"");
    let mut scenario = Scenario::build(ScenarioConfig::from_yaml_str(&yaml).unwrap()).unwrap();
    assert_eq!(scenario.initial_bodies[0].name, "Alpha, \"A\"");

    let text = export_csv(&mut scenario);
    assert!(text.contains("\"Alpha, \"\"A\"\"_ID\",0"));

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let header = rdr
        .records()
        .map(|r| r.unwrap())
        .find(|r| r.get(0) == Some("Time"))
        .unwrap();
    assert_eq!(header.len(), 1 + 3 * 6);
    assert_eq!(&header[1], "Alpha, \"A\"_Px");

    let imported = read_bodies_csv(text.as_bytes()).unwrap();
    assert_eq!(imported[0].name, "Alpha, \"A\"");
}

#[test]
fn csv_import_restores_exported_bodies() {
    let mut scenario = merge_scenario();
    let text = export_csv(&mut scenario);

    let imported = read_bodies_csv(text.as_bytes()).unwrap();

    assert_eq!(imported, scenario.initial_bodies);

    let mut cfg = scenario.to_config();
    cfg.bodies = imported;
    let rebuilt = Scenario::build(cfg).unwrap();
    assert_eq!(rebuilt.engine.active_count(), 3);
    assert_eq!(rebuilt.engine.next_body_id(), 6);
}

const HAND_WRITTEN_CSV: &str = "\
Parameter,Value
G,1

Sun_ID,3
Sun_Mass,5.51e12
Sun_Radius,0
Sun_InitialPosX,10
Rock_ID,3
Rock_Mass,1
Rock_Radius,2
Rock_Color,grey
Ghost_ID,7
Ghost_Mass,-1
";

#[test]
fn csv_import_repairs_ids_and_radii() {
    let bodies = read_bodies_csv(HAND_WRITTEN_CSV.as_bytes()).unwrap();

    assert_eq!(bodies.len(), 2);

    let sun = &bodies[0];
    assert_eq!((sun.id, sun.name.as_str()), (3, "Sun"));
    assert_eq!(sun.radius, radius_from_mass(5.51e12, None));
    assert!(sun.radius > 600.0);
    assert_eq!(sun.position, vec![10.0, 0.0, 0.0]);
    assert_eq!(sun.velocity, vec![0.0, 0.0, 0.0]);
    assert_eq!(sun.color, "blue");

    let rock = &bodies[1];
    assert_eq!(rock.id, 4);
    assert_eq!(rock.radius, 2.0);
    assert_eq!(rock.color, "grey");
}

#[test]
fn radius_from_mass_uses_rocky_density() {
    let mass = 5510.0 * 4.0 / 3.0 * std::f64::consts::PI * 1000.0_f64.powi(3);
    assert!((radius_from_mass(mass, None) - 1000.0).abs() < 1e-6);
    assert!((radius_from_mass(mass, Some(5510.0 * 8.0)) - 500.0).abs() < 1e-6);

    assert_eq!(radius_from_mass(1.0, None), 1.0);
    assert_eq!(radius_from_mass(-5.0, None), 1.0);
}
