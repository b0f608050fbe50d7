//! Loopback teleoperation demo.
//!
//! Runs two 7-DOF masters cross-connected on localhost: side A follows a
//! sine trajectory, side B holds still and mirrors A. Each side runs its
//! own fixed-rate tick loop, the minimal form of the scheduler that owns a
//! link in a real deployment.
//!
//! # Usage
//!
//! ```sh
//! tether-loopback [--ticks 2000] [--hz 500]
//! ```

use std::f64::consts::TAU;
use std::thread;
use std::time::Duration;

use minstant::Instant;

use tether::joint::{JointState, JointVector};
use tether::link::{LinkConfig, MasterLink};

const DOF: usize = 7;

const PORT_A: u16 = 5553;
const PORT_B: u16 = 5554;

const DEFAULT_TICKS: u64 = 2_000;
const DEFAULT_RATE_HZ: u64 = 500;

fn main() {
    if let Err(e) = run() {
        eprintln!("tether-loopback: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tether::init_tracing();

    let (ticks, hz) = parse_args(&std::env::args().collect::<Vec<_>>())?;
    let period = Duration::from_nanos(1_000_000_000 / hz);

    let side_a = MasterLink::<DOF>::open(
        LinkConfig::new("127.0.0.1")
            .with_port(PORT_B)
            .with_local_port(PORT_A)
            .with_name("master-a"),
    )?;
    let side_b = MasterLink::<DOF>::open(
        LinkConfig::new("127.0.0.1")
            .with_port(PORT_A)
            .with_local_port(PORT_B)
            .with_name("master-b"),
    )?;

    eprintln!("tether-loopback: {ticks} ticks at {hz} Hz");

    let follower = thread::spawn(move || {
        pin_core(1);
        drive(side_b, ticks, period, |_| JointState::zeros())
    });

    pin_core(0);
    let a = drive(side_a, ticks, period, move |tick| wave(tick, hz));
    let b = follower.join().map_err(|_| "follower thread panicked")?;

    let sent = wave(ticks - 1, hz).position;
    report("master-a", &a);
    report("master-b", &b);
    eprintln!(
        "tracking error (B remote vs A final): {:.6} rad",
        max_abs_error(&b.1, &sent)
    );

    Ok(())
}

/// Sine sweep across all joints, phase-shifted per joint.
fn wave(tick: u64, hz: u64) -> JointState<DOF> {
    let t = tick as f64 / hz as f64;
    JointState {
        position: JointVector::from_fn(|j| 0.3 * (TAU * 0.5 * t + j as f64 * 0.2).sin()),
        velocity: JointVector::from_fn(|j| {
            0.3 * TAU * 0.5 * (TAU * 0.5 * t + j as f64 * 0.2).cos()
        }),
        torque: JointVector::zeros(),
    }
}

/// Drives one link at a fixed rate, requesting link-up every tick.
fn drive(
    mut link: MasterLink<DOF>,
    ticks: u64,
    period: Duration,
    trajectory: impl Fn(u64) -> JointState<DOF>,
) -> (bool, JointVector<DOF>) {
    let handle = link.handle();
    let mut remote = JointVector::zeros();
    let mut deadline = Instant::now();

    for tick in 0..ticks {
        let local = trajectory(tick);
        remote = *link.operate(&local);
        // Supervisory request folded into the loop: a no-op until the
        // peer is heard, then links once and stays.
        handle.try_link();

        deadline = deadline + period;
        let now = Instant::now();
        if now < deadline {
            thread::sleep(deadline.duration_since(now));
        }
    }

    (link.is_linked(), remote)
}

fn pin_core(index: usize) {
    if let Some(core) =
        core_affinity::get_core_ids().and_then(|ids| ids.get(index).copied())
    {
        core_affinity::set_for_current(core);
    }
}

fn report(name: &str, (linked, remote): &(bool, JointVector<DOF>)) {
    eprintln!(
        "{name}: linked={linked} remote={:?}",
        remote
            .as_slice()
            .iter()
            .map(|v| (v * 1e4).round() / 1e4)
            .collect::<Vec<_>>()
    );
}

fn max_abs_error(a: &JointVector<DOF>, b: &JointVector<DOF>) -> f64 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn parse_args(args: &[String]) -> Result<(u64, u64), String> {
    let mut ticks = DEFAULT_TICKS;
    let mut hz = DEFAULT_RATE_HZ;

    let mut iter = args.iter().skip(1);
    while let Some(flag) = iter.next() {
        let value = |v: Option<&String>| {
            v.ok_or_else(|| format!("{flag} needs a value"))
                .and_then(|s| s.parse::<u64>().map_err(|e| format!("{flag}: {e}")))
        };
        match flag.as_str() {
            "--ticks" => {
                ticks = value(iter.next())?;
                if ticks == 0 {
                    return Err("--ticks must be > 0".to_owned());
                }
            }
            "--hz" => {
                hz = value(iter.next())?;
                if hz == 0 {
                    return Err("--hz must be > 0".to_owned());
                }
            }
            other => {
                return Err(format!(
                    "unknown argument '{other}' (usage: tether-loopback [--ticks N] [--hz N])"
                ))
            }
        }
    }

    Ok((ticks, hz))
}
