use track_core::sweep::{SweepReport, SweepResult};
use track_core::{ForceLaw, SegmentKind, SimulationConstants, Trajectory};

pub fn print_trajectory(trajectory: &Trajectory, constants: &SimulationConstants) {
    println!(
        "{:>3}  {:<8} {:>8} {:>8} {:>7} {:>9} {:>9}",
        "#", "kind", "start", "time", "steps", "v_in", "v_out"
    );
    for seg in &trajectory.segments {
        let kind = match seg.kind {
            SegmentKind::Straight => "straight",
            SegmentKind::Curve => "curve",
        };
        println!(
            "{:>3}  {:<8} {:>8.2} {:>8.3} {:>7} {:>9.2} {:>9.2}",
            seg.index,
            kind,
            seg.start_time,
            seg.duration,
            seg.steps,
            seg.entry_speed,
            seg.exit_speed
        );
    }

    let samples = &trajectory.samples;
    let end = trajectory.final_state;
    println!();
    println!("Total time: {:.2} s", trajectory.total_time);
    println!(
        "Final point: ({:.2}, {:.2}) heading {:.3} rad",
        end.x, end.y, end.theta
    );
    println!("Peak speed: {:.2} m/s", samples.peak_speed());
    println!(
        "Peak acceleration: tangential {:.2}, lateral {:.2}, combined {:.2} m/s² (limit {:.2})",
        samples.peak_tangential_accel(),
        samples.peak_lateral_accel(),
        samples.peak_total_accel(),
        constants.a_max()
    );
    let violations = samples.violations().count();
    if violations > 0 {
        println!("Limit exceeded in {violations} of {} samples", samples.len());
    }
}

fn describe_law(law: &ForceLaw) -> String {
    match law {
        ForceLaw::Constant { force } => format!("{force:.0} N"),
        ForceLaw::Decaying { force, .. } => format!("{force:.0} N~"),
        ForceLaw::SpeedTarget { v_target, .. } => format!("->{v_target:.1} m/s"),
    }
}

fn describe(result: &SweepResult) -> String {
    let laws: Vec<String> = result.candidate.laws.iter().map(describe_law).collect();
    let radii: Vec<String> = result
        .candidate
        .radii
        .iter()
        .map(|r| format!("{r:.1} m"))
        .collect();
    format!("forces [{}] radii [{}]", laws.join(", "), radii.join(", "))
}

pub fn print_sweep(report: &SweepReport, top: usize) {
    println!(
        "Evaluated {} candidates, {} excluded",
        report.evaluated, report.excluded
    );
    if report.ranked.is_empty() {
        println!("No candidate completed the circuit.");
        return;
    }
    println!("Top {} fastest:", top.min(report.ranked.len()));
    for (i, result) in report.top(top).iter().enumerate() {
        println!(
            "{}) {:.3} s - {} (peak {:.2} m/s²)",
            i + 1,
            result.total_time,
            describe(result),
            result.peak_accel
        );
    }
}
