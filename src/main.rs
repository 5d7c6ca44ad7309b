use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use cislunar_sim::prelude::*;

#[derive(Parser, Debug)]
#[command(about = "Earth-Moon-craft n-body simulation")]
struct Args {
    /// Built-in scenario (earth-moon-craft, lunar-transfer, geo-flyby, lunar-escape)
    #[arg(long, default_value = "earth-moon-craft")]
    scenario: String,
    /// Scenario manifest (TOML); overrides --scenario
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to run
    #[arg(long, default_value_t = 1_000)]
    ticks: usize,
    /// Time factor, one of the scenario's settings
    #[arg(long)]
    time_factor: Option<f64>,
    /// Thrust mode (fixed+, fixed-, prograde, retrograde, radial-outward, radial-inward)
    #[arg(long)]
    thrust: Option<ThrustMode>,
    /// Keep thrust on for this many ticks (default: whole run)
    #[arg(long)]
    thrust_ticks: Option<usize>,
    /// Fire the first transfer burn before the first tick
    #[arg(long)]
    transfer: bool,
    /// Print the look-ahead from the final state
    #[arg(long)]
    project: bool,
    /// More log output (-v debug, -vv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &args.config {
        Some(path) => load_scenario(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => match presets::by_name(&args.scenario) {
            Some(cfg) => cfg,
            None => bail!("unknown scenario `{}`", args.scenario),
        },
    };
    let mut sim = Simulation::from_config(&config)?;

    if let Some(factor) = args.time_factor {
        let clock = &sim.scenario().clock;
        let Some(idx) = clock.time_factors.iter().position(|f| *f == factor) else {
            bail!("time factor {factor} not in {:?}", clock.time_factors);
        };
        sim.set_time_factor_index(idx);
    }

    if let Some(mode) = args.thrust {
        let directive = sim.scenario().thrust.with_mode(mode).with_enabled(true);
        sim.set_directive(directive);
    }

    let mut events = Vec::new();
    if args.transfer {
        match sim.trigger_maneuver() {
            Some(ev) => events.push(ev),
            None => bail!("scenario `{}` has no transfer", sim.scenario().name),
        }
    }

    // -----------------------------------------------------------------------
    // Driving loop
    // -----------------------------------------------------------------------
    let system = sim.system().clone();
    let (target, reference) = (system.thrust_target, system.thrust_reference);
    let mu = system.reference_mu();
    let e0 = system.total_energy(sim.state());

    let sample_interval = (args.ticks / 30).max(1);
    let mut samples = vec![sim.state().clone()];
    let mut r_min = sim.state().radius(target, reference);
    let mut r_max = r_min;

    for i in 0..args.ticks {
        if args.thrust_ticks == Some(i) {
            sim.set_thrust(false);
        }
        events.extend(sim.tick().with_context(|| format!("tick {i}"))?);

        let r = sim.state().radius(target, reference);
        r_min = r_min.min(r);
        r_max = r_max.max(r);
        if (i + 1) % sample_interval == 0 || i + 1 == args.ticks {
            samples.push(sim.state().clone());
        }
    }

    let state = sim.state();
    let elements = OrbitalElements::from_state_vector(
        &state.relative_position(target, reference),
        &state.relative_velocity(target, reference),
        mu,
    );

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    let target_name = &system.bodies[target].name;
    let reference_name = &system.bodies[reference].name;

    println!();
    println!("====================================================================");
    println!("  N-BODY SIMULATION - {}", sim.scenario().name);
    println!("====================================================================");
    println!();
    println!("  Setup");
    println!("  ──────────────────────────────────────────────────────────────────");
    for b in &system.bodies {
        println!("  {:<12} {:>12.4e} kg", b.name, b.mass);
    }
    println!("  Integrator:    {:?}", sim.step_method());
    println!(
        "  Tick:          {:>8.1} s     Time factor:  {:>6}x",
        sim.tick_dt(),
        sim.time_factor()
    );
    println!(
        "  Thrust:        {:>8} ({}, {} m/s^2)",
        if sim.directive().enabled() { "on" } else { "off" },
        sim.directive().mode(),
        sim.directive().magnitude()
    );
    if let Some(m) = sim.maneuver() {
        let t = m.transfer();
        println!(
            "  Transfer:      r1={:.0} km -> r2={:.0} km   dv1={:.1} m/s   dv2={:.1} m/s",
            t.r1 / 1000.0,
            t.r2 / 1000.0,
            t.dv1,
            t.dv2
        );
        println!(
            "                 nominal time {:.2} h   phase {:?}",
            t.transfer_time / 3600.0,
            m.phase()
        );
    }
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    if events.is_empty() {
        println!("  (none)");
    }
    for ev in &events {
        let what = match ev.kind {
            EventKind::FirstBurn { delta_v } => format!("FIRST BURN   dv={delta_v:>8.2} m/s"),
            EventKind::SecondBurn { delta_v } => format!("SECOND BURN  dv={delta_v:>8.2} m/s"),
            EventKind::Periapsis { radius } => format!("PERIAPSIS    r={:>10.0} km", radius / 1000.0),
            EventKind::Apoapsis { radius } => format!("APOAPSIS     r={:>10.0} km", radius / 1000.0),
            EventKind::RadiusReached { radius } => format!("RADIUS       r={:>10.0} km", radius / 1000.0),
        };
        println!("  t={:>10.1}s   {what}", ev.time);
    }
    println!();

    println!("  Summary ({target_name} relative to {reference_name})");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Radius range:  {:>10.0} .. {:.0} km", r_min / 1000.0, r_max / 1000.0);
    println!(
        "  Final orbit:   a={:>10.0} km   e={:.4}   peri={:.0} km",
        elements.sma / 1000.0,
        elements.ecc,
        elements.periapsis / 1000.0
    );
    match elements.period(mu) {
        Some(p) => println!("  Period:        {:>10.2} h", p / 3600.0),
        None => println!("  Period:        unbound"),
    }
    println!(
        "  Energy drift:  {:>10.3e} (relative, whole system)",
        (system.total_energy(state) - e0) / e0.abs()
    );
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>10}  {:>12}  {:>12}  {:>10}  {:>9}",
        "t (s)", "x (km)", "y (km)", "r (km)", "v (m/s)"
    );
    println!("  {}", "─".repeat(60));
    for s in &samples {
        let rel = s.relative_position(target, reference);
        println!(
            "  {:>10.0}  {:>12.1}  {:>12.1}  {:>10.1}  {:>9.1}",
            s.time,
            rel.x / 1000.0,
            rel.y / 1000.0,
            rel.norm() / 1000.0,
            s.relative_velocity(target, reference).norm()
        );
    }
    println!();

    if args.project {
        let path = sim.project();
        println!("  Look-ahead");
        println!("  ──────────────────────────────────────────────────────────────────");
        let settings = sim.projection_settings();
        println!(
            "  {} points over {:.0} s (every {} step(s))",
            path.len(),
            settings.dt * settings.steps as f64,
            settings.record_every.max(1)
        );
        if let Some(last) = path.last() {
            println!(
                "  Last point:    x={:.1} km   y={:.1} km   z={:.1} km",
                last.x / 1000.0,
                last.y / 1000.0,
                last.z / 1000.0
            );
        }
        println!();
    }

    println!("  Simulation: {} ticks, t={:.0} s", args.ticks, state.time);
    println!("====================================================================");
    println!();

    Ok(())
}
