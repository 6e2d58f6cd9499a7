use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::math::{LatLon, Vec2};
use globe::{ContainerSize, GlobeConfig, Scene};
use tools::demo::generate_scene;
use tools::sim::{HeatEvent, HeatScript, Script, SimOptions, run};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "globe-sim", about = "Headless globe simulator and demo scene generator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount a globe on recording surfaces, run frames and print a JSON summary.
    Simulate {
        /// Scene JSON (`markers`, `connections`, `heatmapPoints`).
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Config JSON; missing fields take defaults.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 120)]
        frames: usize,
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,
        #[arg(long, default_value_t = 600.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Drag start as `x,y` in display pixels.
        #[arg(long, value_parser = parse_point, requires = "drag_to")]
        drag_from: Option<Vec2>,
        #[arg(long, value_parser = parse_point, requires = "drag_from")]
        drag_to: Option<Vec2>,
        /// Rest the pointer at `x,y` after the drag.
        #[arg(long, value_parser = parse_point)]
        hover: Option<Vec2>,
        /// Release at the hover position.
        #[arg(long, requires = "hover")]
        click: bool,
        /// Drive heat from `--heat-event`s, fading by this factor each frame.
        /// Replaces the scene's heatmap points.
        #[arg(long, requires = "heat_event")]
        heat_decay: Option<f64>,
        /// Data event as `lat,lon,amount[,frame]`; frame defaults to 0.
        #[arg(long, value_parser = parse_heat_event, requires = "heat_decay")]
        heat_event: Vec<HeatEvent>,
    },
    /// Write a generated validator-map scene as JSON.
    Demo {
        #[arg(long, default_value_t = 1000)]
        count: u64,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Output path; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("y: {e}"))?;
    Ok(Vec2::new(x, y))
}

fn parse_heat_event(s: &str) -> Result<HeatEvent, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let (lat, lon, amount, frame) = match parts.as_slice() {
        [lat, lon, amount] => (*lat, *lon, *amount, "0"),
        [lat, lon, amount, frame] => (*lat, *lon, *amount, *frame),
        _ => return Err(format!("expected lat,lon,amount[,frame] but got {s:?}")),
    };
    Ok(HeatEvent {
        location: LatLon::new(
            lat.parse().map_err(|e| format!("lat: {e}"))?,
            lon.parse().map_err(|e| format!("lon: {e}"))?,
        ),
        amount: amount.parse().map_err(|e| format!("amount: {e}"))?,
        frame: frame.parse().map_err(|e| format!("frame: {e}"))?,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::Simulate {
            scene,
            config,
            frames,
            dt,
            width,
            height,
            seed,
            drag_from,
            drag_to,
            hover,
            click,
            heat_decay,
            heat_event,
        } => {
            let scene = match scene {
                Some(path) => {
                    let text = fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?;
                    Scene::from_json_str(&text).map_err(|e| format!("{path:?}: {e}"))?
                }
                None => Scene::default(),
            };
            let config = match config {
                Some(path) => {
                    let text = fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?;
                    GlobeConfig::from_json_str(&text).map_err(|e| format!("{path:?}: {e}"))?
                }
                None => GlobeConfig::default(),
            };
            let opts = SimOptions {
                frames,
                dt_s: dt,
                container: ContainerSize::new(width, height),
                seed,
                script: Script {
                    drag: drag_from.zip(drag_to),
                    hover,
                    click,
                },
                heat: heat_decay.map(|decay| HeatScript {
                    decay,
                    events: heat_event,
                }),
            };
            tracing::debug!(?opts, markers = scene.markers.len(), "simulating");
            let summary = run(scene, config, &opts);
            let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
            println!("{json}");
            Ok(())
        }
        Command::Demo { count, seed, out } => {
            let scene = generate_scene(count, seed);
            let json = scene.to_json_pretty().map_err(|e| e.to_string())?;
            match out {
                Some(path) => {
                    fs::write(&path, json).map_err(|e| format!("write {path:?}: {e}"))?;
                    tracing::info!(?path, markers = scene.markers.len(), "demo scene written");
                }
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_heat_event;
    use foundation::math::LatLon;

    #[test]
    fn heat_event_frame_is_optional() {
        let event = parse_heat_event("35.7, 139.7, 0.5").expect("parses");
        assert_eq!(event.location, LatLon::new(35.7, 139.7));
        assert_eq!(event.frame, 0);
        assert_eq!(parse_heat_event("1,2,0.5,30").expect("parses").frame, 30);
        assert!(parse_heat_event("1,2").is_err());
    }
}
