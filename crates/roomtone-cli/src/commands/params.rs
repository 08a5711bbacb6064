//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use std::path::PathBuf;

use clap::Args;
use roomtone_core::{ParamFlags, ParamScale};
use roomtone_engine::{ControlId, ReverbParams};
use serde::Serialize;

#[derive(Args)]
pub struct ParamsArgs {
    /// Show values from a room parameter file (TOML) next to the defaults
    #[arg(short, long, value_name = "FILE")]
    preset: Option<PathBuf>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

/// One row of the listing.
#[derive(Debug, Serialize)]
struct ParamEntry {
    id: u32,
    key: &'static str,
    name: &'static str,
    unit: &'static str,
    min: f32,
    max: f32,
    default: f32,
    value: f32,
    logarithmic: bool,
    inert: bool,
}

fn entries(params: &ReverbParams) -> Vec<ParamEntry> {
    ControlId::ALL
        .iter()
        .map(|&control| {
            let desc = control.descriptor();
            ParamEntry {
                id: control.id(),
                key: control.key(),
                name: desc.name,
                unit: desc.unit.suffix().trim(),
                min: desc.min,
                max: desc.max,
                default: desc.default,
                value: params.get(control),
                logarithmic: desc.scale == ParamScale::Logarithmic,
                inert: desc.flags.contains(ParamFlags::INERT),
            }
        })
        .collect()
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let params = match &args.preset {
        Some(path) => ReverbParams::load(path)?,
        None => ReverbParams::default(),
    };
    let entries = entries(&params);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Room Parameters");
    println!("===============");
    println!();
    println!(
        "  {:>2}  {:20}  {:5}  {:>9}  {:>9}  {:>9}  {:>9}",
        "Id", "Key", "Unit", "Min", "Max", "Default", "Value"
    );
    println!(
        "  {:>2}  {:20}  {:5}  {:>9}  {:>9}  {:>9}  {:>9}",
        "--", "---", "----", "---", "---", "-------", "-----"
    );
    for e in &entries {
        println!(
            "  {:>2}  {:20}  {:5}  {:>9}  {:>9}  {:>9}  {:>9}{}",
            e.id,
            e.key,
            e.unit,
            e.min,
            e.max,
            e.default,
            e.value,
            if e.inert { "  (stored only)" } else { "" }
        );
    }

    println!();
    println!("Set with: roomtone process in.wav out.wav --param decay_time=2.5");

    Ok(())
}
