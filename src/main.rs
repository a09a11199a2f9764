//! Lanelet Strip Builder (CLI).
//!
//! Baut Lanelet2-OSM-Karten aus Randkurven-Samples und fragt bestehende Karten ab.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::DVec2;
use lanelet_strip_builder::{BuilderOptions, Id, MapFacade, Origin, StripOptions};

#[derive(Parser, Debug)]
#[command(name = "lanelet-strip-builder")]
#[command(about = "Baut Lanelet2-Karten aus parallelen Randkurven-Samples")]
#[command(version)]
struct Args {
    /// Optionen-Datei (Standard: lanelet_strip_builder.toml neben der Binary)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Breitengrad des Origins (überschreibt die Optionen)
    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Längengrad des Origins (überschreibt die Optionen)
    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Samples einlesen, Strip bauen und als OSM speichern
    Build {
        /// Sample-Datei (CSV, 2·N Spalten)
        samples: PathBuf,
        /// Ziel-Datei (.osm)
        #[arg(short, long, default_value = "Data_Map.osm")]
        output: PathBuf,
        /// Letzten Sample-Index mit dem ersten verbinden
        #[arg(long)]
        ring: bool,
        /// Mittellinie aus den ersten beiden Sequenzen ableiten
        #[arg(long)]
        centerline: bool,
    },
    /// Kennzahlen einer OSM-Karte ausgeben
    Info {
        map: PathBuf,
        /// Als JSON ausgeben
        #[arg(long)]
        json: bool,
    },
    /// Nachbarn, Nachfolger und Ränder eines Lanelets ausgeben
    Inspect { map: PathBuf, lanelet: Id },
    /// Lanelet an einer Position suchen (lokal x/y oder mit --geo lat/lon)
    Locate {
        map: PathBuf,
        #[arg(allow_hyphen_values = true)]
        first: f64,
        #[arg(allow_hyphen_values = true)]
        second: f64,
        /// Koordinaten als lat/lon interpretieren
        #[arg(long)]
        geo: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    log::info!(
        "Lanelet Strip Builder v{} startet...",
        env!("CARGO_PKG_VERSION")
    );

    let config_path = args.config.clone().unwrap_or_else(BuilderOptions::config_path);
    let options = BuilderOptions::load_from_file(&config_path);
    let origin = Origin::new(
        args.lat.unwrap_or(options.origin.lat),
        args.lon.unwrap_or(options.origin.lon),
    );

    match args.command {
        Command::Build {
            samples,
            output,
            ring,
            centerline,
        } => {
            let mut facade = MapFacade::new(origin).with_options(options);
            let report = facade
                .build_strip_from_file(
                    &samples,
                    StripOptions {
                        close_ring: ring,
                        with_centerline: centerline,
                    },
                )
                .with_context(|| format!("Strip aus {} nicht baubar", samples.display()))?;
            for err in facade.save(&output)? {
                eprintln!("{}", err);
            }
            println!(
                "{} Lanelets, {} Randkurven, {} Punkte → {}",
                report.lanelets.len(),
                report.line_strings,
                report.points,
                output.display()
            );
        }
        Command::Info { map, json } => {
            let facade = open(&map, origin, options)?;
            let info = facade.info();
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", info);
            }
        }
        Command::Inspect { map, lanelet } => {
            let mut facade = open(&map, origin, options)?;
            inspect(&mut facade, lanelet)?;
        }
        Command::Locate {
            map,
            first,
            second,
            geo,
        } => {
            let facade = open(&map, origin, options)?;
            let found = if geo {
                facade.lanelet_at_geo(first, second)
            } else {
                facade.lanelet_at(DVec2::new(first, second))
            };
            match found {
                Some(id) => println!("{}", id),
                None => println!("kein Lanelet an ({}, {})", first, second),
            }
        }
    }

    Ok(())
}

fn open(path: &std::path::Path, origin: Origin, options: BuilderOptions) -> Result<MapFacade> {
    let mut facade = MapFacade::new(origin).with_options(options);
    let report = facade
        .load_file(path)
        .with_context(|| format!("Karte {} nicht ladbar", path.display()))?;
    for err in &report.errors {
        eprintln!("{}", err);
    }
    println!(
        "{} errors, {} lanes detected",
        report.errors.len(),
        report.lanelets
    );
    Ok(facade)
}

fn inspect(facade: &mut MapFacade, lanelet_id: Id) -> Result<()> {
    let lanelet = facade
        .lanelet(lanelet_id)
        .cloned()
        .with_context(|| format!("Lanelet {} nicht gefunden", lanelet_id))?;

    println!("Lanelet {}", lanelet.id);
    println!("  links:  Randkurve {}", lanelet.left);
    println!("  rechts: Randkurve {}", lanelet.right);
    for (key, value) in &lanelet.attributes {
        println!("  {} = {}", key, value);
    }

    let show = |label: &str, id: Option<Id>| match id {
        Some(id) => println!("  {}: {}", label, id),
        None => println!("  {}: -", label),
    };
    show("linker Nachbar", facade.left_neighbor(lanelet_id).map(|l| l.id));
    show("rechter Nachbar", facade.right_neighbor(lanelet_id).map(|l| l.id));
    show("Nachfolger", facade.following(lanelet_id).ok().map(|l| l.id));

    let previous: Vec<String> = facade
        .previous(lanelet_id)
        .iter()
        .map(|l| l.id.to_string())
        .collect();
    println!("  Vorgaenger: [{}]", previous.join(", "));

    if let Some(center) = facade.centerline(lanelet_id) {
        let length: f64 = center.windows(2).map(|w| w[0].distance(w[1])).sum();
        println!("  Mittellinie: {} Punkte, {:.2} m", center.len(), length);
    }
    Ok(())
}
