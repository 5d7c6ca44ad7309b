use cislunar_sim::orbital::circular_velocity;
use cislunar_sim::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Hohmann Transfer: parking orbit → lunar distance ===\n");

    let mut sim = Simulation::from_config(&presets::lunar_transfer())?;
    sim.set_time_factor_index(1);
    let mu = sim.system().reference_mu();
    let transfer = *sim.maneuver().ok_or("scenario has no transfer")?.transfer();

    println!("Parking radius:             {:.0} km", transfer.r1 / 1000.0);
    println!("Target radius:              {:.0} km", transfer.r2 / 1000.0);
    println!("Delta-v 1 (raise apoapsis): {:.1} m/s", transfer.dv1);
    println!("Delta-v 2 (circularize):    {:.1} m/s", transfer.dv2);
    println!("Transfer time:              {:.2} hours", transfer.transfer_time / 3600.0);
    println!("Tick:                       {:.0} s", sim.tick_dt());
    println!();

    if let Some(ev) = sim.trigger_maneuver() {
        println!("t={:>9.0} s  first burn", ev.time);
    }

    let max_ticks = (2.0 * transfer.transfer_time / sim.tick_dt()) as usize;
    for _ in 0..max_ticks {
        for ev in sim.tick()? {
            if let EventKind::SecondBurn { delta_v } = ev.kind {
                println!("t={:>9.0} s  second burn, dv={delta_v:.1} m/s", ev.time);
            }
        }
        if sim.maneuver().map(|m| m.phase()) == Some(ManeuverPhase::TransferComplete) {
            break;
        }
    }

    let state = sim.state();
    let (target, reference) = (sim.system().thrust_target, sim.system().thrust_reference);
    let el = OrbitalElements::from_state_vector(
        &state.relative_position(target, reference),
        &state.relative_velocity(target, reference),
        mu,
    );
    let speed = state.relative_velocity(target, reference).norm();

    println!();
    println!("Final radius:   {:.0} km", state.radius(target, reference) / 1000.0);
    println!("Final speed:    {:.1} m/s (circular {:.1} m/s)", speed, circular_velocity(transfer.r2, mu));
    println!("Eccentricity:   {:.4}", el.ecc);
    Ok(())
}
