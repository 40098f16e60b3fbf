use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use async_std::task;
use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::Vec2;
use gn_conf::{default_conf_path, load_conf, Configuration};
use gn_grid::{load_scene, scan, Grid, StaticWorld};
use gn_pathing::{
    summarize, sweep, Agent, BezierModifier, ModifierChain, PathFinder, PathModifier, Sweep,
    TunnelModifier, WeightDetectionMode,
};
use tracing::{info, warn};

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_SHA: &str = env!("GIT_SHA");

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(long, global = true, help = "Path of a YAML configuration file.")]
    conf: Option<PathBuf>,
    #[clap(
        long,
        global = true,
        help = "Path of a JSON scene file. An empty world is scanned if omitted."
    )]
    scene: Option<PathBuf>,
    #[clap(long, global = true, help = "Directory to write a log file into.")]
    log_dir: Option<PathBuf>,
    #[clap(
        long,
        global = true,
        help = "Overrides weight detection mode from the configuration."
    )]
    mode: Option<WeightDetectionMode>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scans the scene and prints grid statistics.
    Scan,
    /// Searches for a single path.
    Find {
        #[clap(flatten)]
        endpoints: Endpoints,
        #[clap(long = "modifier", value_enum)]
        modifiers: Vec<ModifierKind>,
    },
    /// Searches for a path repeatedly while sweeping a search parameter.
    Analyse {
        #[clap(flatten)]
        endpoints: Endpoints,
        #[clap(long, value_enum)]
        sweep: SweepKind,
        #[clap(long)]
        step: f32,
        #[clap(long)]
        max: f32,
    },
    /// Drives an agent from a position towards a target.
    Simulate {
        #[clap(flatten)]
        endpoints: Endpoints,
        #[clap(long, default_value_t = 10.)]
        seconds: f32,
        #[clap(long, default_value_t = 0.1)]
        dt: f32,
    },
}

#[derive(Args)]
struct Endpoints {
    #[clap(long, value_parser = parse_point, help = "Start position as x,y.")]
    from: Vec2,
    #[clap(long, value_parser = parse_point, help = "Target position as x,y.")]
    to: Vec2,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModifierKind {
    Bezier,
    Tunnel,
}

#[derive(Clone, Copy, ValueEnum)]
enum SweepKind {
    Ratio,
    Heuristic,
}

fn parse_point(value: &str) -> Result<Vec2> {
    let (x, y) = value
        .split_once(',')
        .context("Point has to be given as x,y")?;
    let x: f32 = x.trim().parse().context("Invalid x coordinate")?;
    let y: f32 = y.trim().parse().context("Invalid y coordinate")?;
    let point = Vec2::new(x, y);
    ensure!(point.is_finite(), "Point coordinates have to be finite");
    Ok(point)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_handle = gn_log::init(cli.log_dir.as_deref())?;

    info!(
        "Starting GridNav {{ \"Version\": \"{}\", \"GitSha\": \"{}\" }}",
        CARGO_PKG_VERSION, GIT_SHA
    );

    let conf = task::block_on(load(&cli))?;
    let world = match cli.scene.as_ref() {
        Some(path) => task::block_on(load_scene(path))
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => StaticWorld::empty(),
    };
    let grid = scan(&conf.scan().params(), &world).context("Failed to scan the scene")?;

    let mut props = conf.search().props();
    if let Some(mode) = cli.mode {
        props = props.with_mode(mode);
    }
    let mut finder = PathFinder::new(props);

    match cli.command {
        Command::Scan => print_grid(&grid),
        Command::Find {
            endpoints,
            modifiers,
        } => find(&conf, &grid, &mut finder, &endpoints, &modifiers),
        Command::Analyse {
            endpoints,
            sweep,
            step,
            max,
        } => analyse(&conf, &grid, &mut finder, &endpoints, sweep, step, max)?,
        Command::Simulate {
            endpoints,
            seconds,
            dt,
        } => simulate(&conf, &grid, &mut finder, &endpoints, seconds, dt)?,
    }

    Ok(())
}

async fn load(cli: &Cli) -> Result<Configuration> {
    let path = match cli.conf.as_ref() {
        Some(path) => async_std::path::PathBuf::from(path.clone()),
        None => default_conf_path()?,
    };
    load_conf(path.as_path()).await
}

fn print_grid(grid: &Grid) {
    let walkable = grid.cells().filter(|cell| cell.walkable()).count();
    let weightable = grid.cells().filter(|cell| cell.weightable()).count();
    let bounds = grid.bounds();
    println!("size: {}x{}", grid.width(), grid.height());
    println!("node size: {}", grid.node_size());
    println!(
        "bounds: center ({}, {}), extents ({}, {})",
        bounds.center().x,
        bounds.center().y,
        bounds.extents().x,
        bounds.extents().y
    );
    println!("walkable cells: {walkable}");
    println!("weightable cells: {weightable}");
    println!("average weight: {}", grid.average_weight());
}

fn find(
    conf: &Configuration,
    grid: &Grid,
    finder: &mut PathFinder,
    endpoints: &Endpoints,
    modifiers: &[ModifierKind],
) {
    let chain = modifier_chain(modifiers);
    let result = finder.find_path(
        grid,
        endpoints.from,
        endpoints.to,
        &conf.agent().agent_weight(),
    );

    let diagnostics = finder.diagnostics();
    match result {
        Ok(path) => {
            let path = chain.apply(path);
            for step in path.steps() {
                let center = step.center();
                println!(
                    "({}, {}) cell ({}, {}) weight {}",
                    center.x,
                    center.y,
                    step.position().x,
                    step.position().y,
                    step.weight_from_start()
                );
            }
            println!("length: {}", path.len());
            println!("total weight: {}", path.total_weight());
        }
        Err(error) => println!("path not found: {error}"),
    }
    println!(
        "open: {}, closed: {}",
        diagnostics.open_count(),
        diagnostics.closed_count()
    );
}

fn modifier_chain(modifiers: &[ModifierKind]) -> ModifierChain {
    let mut chain = ModifierChain::new();
    for modifier in modifiers {
        match modifier {
            ModifierKind::Bezier => chain.push(BezierModifier),
            ModifierKind::Tunnel => chain.push(TunnelModifier),
        }
    }
    chain
}

fn analyse(
    conf: &Configuration,
    grid: &Grid,
    finder: &mut PathFinder,
    endpoints: &Endpoints,
    kind: SweepKind,
    step: f32,
    max: f32,
) -> Result<()> {
    let swept = match kind {
        SweepKind::Ratio => Sweep::WeightRatio { step, max },
        SweepKind::Heuristic => {
            ensure!(
                step >= 1. && step.fract() == 0. && max >= 0. && max.fract() == 0.,
                "Heuristic multiplier sweep requires whole non-negative numbers and a step of at least 1"
            );
            Sweep::HeuristicMultiplier {
                step: step as u32,
                max: max as u32,
            }
        }
    };

    let reports = sweep(
        finder,
        grid,
        endpoints.from,
        endpoints.to,
        &conf.agent().agent_weight(),
        swept,
    )?;
    for report in reports.iter() {
        println!(
            "parameter {}: length {}, weight {}, checked nodes {}{}",
            report.parameter(),
            report.length(),
            report.weight_sum(),
            report.checked_nodes(),
            if report.lethal() { ", lethal" } else { "" }
        );
    }

    match summarize(&reports) {
        Some(summary) => {
            println!(
                "weight: min {}, max {}",
                summary.min_weight(),
                summary.max_weight()
            );
            println!(
                "length: min {}, max {}",
                summary.min_length(),
                summary.max_length()
            );
        }
        None => println!("no path found"),
    }
    Ok(())
}

fn simulate(
    conf: &Configuration,
    grid: &Grid,
    finder: &mut PathFinder,
    endpoints: &Endpoints,
    seconds: f32,
    dt: f32,
) -> Result<()> {
    ensure!(
        dt.is_finite() && dt > 0.,
        "Time step has to be positive and finite"
    );
    ensure!(
        seconds.is_finite() && seconds >= 0.,
        "Simulated time has to be non-negative and finite"
    );

    let mut agent = Agent::new(
        endpoints.from,
        conf.agent().settings(),
        conf.agent().agent_weight(),
        ModifierChain::new(),
    );
    agent.set_target(Some(endpoints.to));

    let mut time = 0.;
    let mut moves = 0;
    while time < seconds {
        if let Some(order) = agent.tick(dt, finder, grid) {
            let destination = order.destination();
            // Move orders are applied instantly.
            agent.set_position(destination);
            moves += 1;
            println!("{time:.2}s: move to ({}, {})", destination.x, destination.y);
        }
        time += dt;
    }

    if agent.path().is_none() && moves == 0 {
        warn!("Agent did not move during the simulation");
    }
    println!(
        "final position: ({}, {}) after {moves} moves",
        agent.position().x,
        agent.position().y
    );
    Ok(())
}
