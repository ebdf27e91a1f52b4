use anyhow::{anyhow, Context, Result};
use log::info;
use twsi_fft::protocol::COEFFICIENTS;
use twsi_fft::{run_sequence, waveform, Config, TwsiDevice};

const USAGE: &str = "usage: twsi-fft [sine <frequency> <amplitude> | twiddle <n>]";

fn main() {
    // Initialize logging
    init_logger();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match args.first().map(String::as_str) {
        None => run_fft(),
        Some(_) => match run_tool(&args) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{:#}", e);
                eprintln!("{}", USAGE);
                1
            }
        },
    };
    std::process::exit(code);
}

fn run_fft() -> i32 {
    let config = Config::default();
    info!("Using TWSI bus {}", config.bus.device);

    let mut stdout = std::io::stdout();
    let report = run_sequence(
        &config,
        &COEFFICIENTS,
        |bus| TwsiDevice::open(&bus.device),
        &mut stdout,
    );
    report.exit_code()
}

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = args
        .get(idx)
        .ok_or_else(|| anyhow!("Missing argument: {}", name))?;
    raw.parse::<T>()
        .context(format!("Invalid {}: {}", name, raw))
}

fn run_tool(args: &[String]) -> Result<()> {
    let pairs = match args[0].as_str() {
        "sine" => {
            let frequency: i32 = parse_arg(args, 1, "frequency")?;
            let amplitude: i32 = parse_arg(args, 2, "amplitude")?;
            waveform::sine_table(amplitude, frequency)
        }
        "twiddle" => {
            let n: usize = parse_arg(args, 1, "n")?;
            if n < 2 {
                return Err(anyhow!("FFT size must be at least 2"));
            }
            waveform::twiddle_factors(n)
        }
        other => return Err(anyhow!("Unknown command: {}", other)),
    };
    println!("{}", waveform::format_pairs(&pairs));
    Ok(())
}

fn init_logger() {
    // Use `env_logger` for logging; it writes to stderr, stdout carries the values.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
