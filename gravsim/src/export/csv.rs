//! CSV export of a pre-calculated run, and import of its body blocks
//!
//! Layout, top to bottom:
//! 1. `Parameter,Value` block (G, step, run length, integrator, collisions)
//! 2. one block of `<name>_<field>,value` rows per initial body
//! 3. the time series: `Time` plus position/velocity columns for every body
//!    of the first frame, `N/A` once a body has merged away
//!
//! Blocks are separated by a blank line. Fields are quoted as needed, so
//! body names may contain commas or quotes.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::io::{Read, Write};

use csv::{ReaderBuilder, Trim, Writer, WriterBuilder};
use log::{debug, warn};

use crate::error::Result;
use crate::simulation::params::Parameters;
use crate::simulation::precalc::Trajectory;
use crate::simulation::states::{radius_from_mass, BodyId, BodyRecord};

const MISSING: &str = "N/A";
const TIME_HEADER: &str = "Time";

pub fn write_trajectory_csv<W: Write>(
    out: W,
    params: &Parameters,
    total_time: f64,
    initial_bodies: &[BodyRecord],
    trajectory: &Trajectory,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(out);

    wtr.write_record(["Parameter", "Value"])?;
    write_kv(&mut wtr, "G", params.g)?;
    write_kv(&mut wtr, "TimeStep", params.dt)?;
    write_kv(&mut wtr, "TotalSimTime_Predefined", total_time)?;
    write_kv(&mut wtr, "Integrator", params.integrator)?;
    write_kv(&mut wtr, "CollisionModel", params.collision)?;
    blank_line(&mut wtr)?;

    for b in initial_bodies {
        let name = csv_label(b);
        write_kv(&mut wtr, &format!("{name}_ID"), b.id)?;
        write_kv(&mut wtr, &format!("{name}_Mass"), b.mass)?;
        for (axis, value) in ["X", "Y", "Z"].iter().zip(&b.position) {
            write_kv(&mut wtr, &format!("{name}_InitialPos{axis}"), value)?;
        }
        for (axis, value) in ["X", "Y", "Z"].iter().zip(&b.velocity) {
            write_kv(&mut wtr, &format!("{name}_InitialVel{axis}"), value)?;
        }
        write_kv(&mut wtr, &format!("{name}_Radius"), b.radius)?;
        write_kv(&mut wtr, &format!("{name}_Color"), &b.color)?;
    }
    blank_line(&mut wtr)?;

    // Columns follow the bodies of the first frame, in order
    let columns: Vec<(BodyId, String)> = trajectory
        .frames
        .first()
        .map(|f| f.bodies.iter().map(|b| (b.id, csv_label(b))).collect())
        .unwrap_or_default();

    let mut header = vec![TIME_HEADER.to_string()];
    for (_, name) in &columns {
        for suffix in ["Px", "Py", "Pz", "Vx", "Vy", "Vz"] {
            header.push(format!("{name}_{suffix}"));
        }
    }
    wtr.write_record(&header)?;

    for frame in &trajectory.frames {
        let by_id: HashMap<BodyId, &BodyRecord> =
            frame.bodies.iter().map(|b| (b.id, b)).collect();

        let mut row = vec![frame.time.to_string()];
        for (id, _) in &columns {
            match by_id.get(id) {
                Some(b) => row.extend(b.position.iter().chain(&b.velocity).map(f64::to_string)),
                None => row.extend(std::iter::repeat(MISSING.to_string()).take(6)),
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read the body blocks of an exported CSV back into records.
///
/// A block starts at a `<name>_ID` row and collects the rows after it. Rows
/// before the first block (the parameter block) are skipped, and reading
/// stops at the time-series header.
///
/// - a missing or already used id is replaced by the next free one
/// - bodies without a positive, finite mass are dropped
/// - a non-positive radius is derived from the mass
/// - missing vector components default to 0, a missing color to `blue`
pub fn read_bodies_csv<R: Read>(input: R) -> Result<Vec<BodyRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut blocks: Vec<Vec<(String, String)>> = Vec::new();
    for row in rdr.records() {
        let row = row?;
        if row.len() < 2 || row[0].is_empty() {
            continue;
        }
        let (key, value) = (&row[0], &row[1]);
        if key == TIME_HEADER {
            break;
        }

        if key.to_ascii_uppercase().ends_with("_ID") {
            blocks.push(vec![(key.to_string(), value.to_string())]);
        } else if let Some(block) = blocks.last_mut() {
            block.push((key.to_string(), value.to_string()));
        } else {
            debug!("skipping '{key}' row before the first body block");
        }
    }

    let mut taken: HashSet<BodyId> = HashSet::new();
    let mut next_free: BodyId = 0;
    let mut records = Vec::with_capacity(blocks.len());

    for block in &blocks {
        let (id_key, id_value) = &block[0];
        let prefix = &id_key[..id_key.len() - "_ID".len()];
        let parsed_id = id_value.parse::<BodyId>().ok();
        let name = if prefix.is_empty() {
            format!("Body{}", parsed_id.unwrap_or(next_free))
        } else {
            prefix.to_string()
        };

        let field = |suffix: &str| {
            let key = format!("{prefix}_{suffix}");
            block.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
        };
        let number = |suffix: &str, default: f64| match field(suffix) {
            Some(raw) => raw.parse::<f64>().unwrap_or_else(|_| {
                warn!("'{name}': could not parse {suffix} = '{raw}', using {default}");
                default
            }),
            None => default,
        };

        let mass = number("Mass", -1.0);
        if !(mass > 0.0 && mass.is_finite()) {
            warn!("'{name}': invalid mass {mass}, body skipped");
            continue;
        }
        let mut radius = number("Radius", -1.0);
        if !(radius > 0.0) {
            radius = radius_from_mass(mass, None);
            debug!("'{name}': no usable radius, derived {radius:e} from mass");
        }

        let id = match parsed_id {
            Some(id) if id != BodyId::MAX && !taken.contains(&id) => id,
            _ => {
                warn!("'{name}': id '{id_value}' missing or in use, assigning {next_free}");
                next_free
            }
        };
        taken.insert(id);
        next_free = next_free.max(id.saturating_add(1));

        let position = ["InitialPosX", "InitialPosY", "InitialPosZ"]
            .iter()
            .map(|&s| number(s, 0.0))
            .collect();
        let velocity = ["InitialVelX", "InitialVelY", "InitialVelZ"]
            .iter()
            .map(|&s| number(s, 0.0))
            .collect();
        let color = field("Color").unwrap_or("blue").to_string();

        records.push(BodyRecord {
            id,
            name,
            mass,
            position,
            velocity,
            radius,
            color,
        });
    }

    Ok(records)
}

fn write_kv<W: Write>(wtr: &mut Writer<W>, key: &str, value: impl Display) -> Result<()> {
    wtr.write_record([key, value.to_string().as_str()])?;
    Ok(())
}

/// Empty separator line between blocks
fn blank_line<W: Write>(wtr: &mut Writer<W>) -> Result<()> {
    wtr.flush()?;
    wtr.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Body name, or `Body<id>` when the name is blank
fn csv_label(b: &BodyRecord) -> String {
    if b.name.trim().is_empty() {
        format!("Body{}", b.id)
    } else {
        b.name.clone()
    }
}
