use crate::bus::TwsiBus;
use crate::config::{BusConfig, Config};
use crate::error::{Result, TwsiError};
use crate::protocol::{self, RESULT_FRAME_LEN, SAMPLE_COUNT};
use log::{error, info, warn};
use std::io;
use std::thread;

/// Steps of the FFT sequence, in the only order they can happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    SetSent,
    RunSent,
    Delay,
    GetSent,
    ResultsRead,
    Reported,
    Closed,
}

/// What a failed step does to the rest of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Abort the sequence
    Required,
    /// Log and record the failure, then carry on
    BestEffort,
}

#[derive(Debug)]
pub struct IgnoredFailure {
    pub stage: Stage,
    pub error: TwsiError,
}

#[derive(Debug)]
pub struct RunReport {
    /// Last stage entered
    pub stage: Stage,
    pub sent: Option<[i32; SAMPLE_COUNT]>,
    pub received: Option<[i32; SAMPLE_COUNT]>,
    pub ignored: Vec<IgnoredFailure>,
    /// Fatal error, or the status of the final read
    pub error: Option<TwsiError>,
}

impl RunReport {
    fn new() -> Self {
        RunReport {
            stage: Stage::Init,
            sent: None,
            received: None,
            ignored: Vec::new(),
            error: None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.error.as_ref().map_or(0, TwsiError::exit_code)
    }
}

/// An open bus bound to the FFT core's address.
pub struct Session<'a, B: TwsiBus> {
    bus: B,
    config: &'a Config,
    report: RunReport,
}

impl<'a, B: TwsiBus> Session<'a, B> {
    /// Configure the bus speed; the bus must be freshly opened.
    pub fn init(mut bus: B, config: &'a Config) -> std::result::Result<Self, (B, TwsiError)> {
        info!(
            "Configuring TWSI speed {} for slave 0x{:02x}",
            config.bus.speed, config.bus.slave_address
        );
        if let Err(e) = bus.set_speed(config.bus.speed) {
            return Err((bus, e));
        }

        Ok(Session {
            bus,
            config,
            report: RunReport::new(),
        })
    }

    fn step(&mut self, stage: Stage, policy: Policy, result: Result<()>) -> Result<()> {
        self.report.stage = stage;
        match (result, policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), Policy::Required) => {
                error!("{:?} failed: {}", stage, e);
                Err(e)
            }
            (Err(e), Policy::BestEffort) => {
                warn!("{:?} failed, continuing: {}", stage, e);
                self.report.ignored.push(IgnoredFailure { stage, error: e });
                Ok(())
            }
        }
    }

    pub fn send_coefficients(&mut self, samples: &[i32; SAMPLE_COUNT]) -> Result<()> {
        let frame = protocol::encode_set(samples);
        let result = self.bus.write(self.config.bus.slave_address, &frame);
        self.report.sent = Some(*samples);
        self.step(Stage::SetSent, Policy::Required, result)
    }

    pub fn start_transform(&mut self, policy: Policy) -> Result<()> {
        let result = self.bus.write(self.config.bus.slave_address, &protocol::encode_run());
        self.step(Stage::RunSent, policy, result)
    }

    /// Give the core time to compute. Not interruptible.
    pub fn settle(&mut self) {
        self.report.stage = Stage::Delay;
        thread::sleep(self.config.sequence.settle);
    }

    pub fn request_results(&mut self, policy: Policy) -> Result<()> {
        let result = self.bus.write(self.config.bus.slave_address, &protocol::encode_get());
        self.step(Stage::GetSent, policy, result)
    }

    /// Clock out the result frame and decode it. The frame is decoded even
    /// when the read fails; the failure is kept as the run's final status.
    pub fn read_results(&mut self) -> [i32; SAMPLE_COUNT] {
        let mut frame = [0u8; RESULT_FRAME_LEN];
        let result = self.bus.read(self.config.bus.slave_address, &mut frame);
        self.report.stage = Stage::ResultsRead;
        if let Err(e) = result {
            error!("Failed to read results: {}", e);
            self.report.error = Some(e);
        }

        let values = protocol::decode_results(&frame, self.config.sequence.decode);
        self.report.received = Some(values);
        values
    }

    /// Close the bus and hand back what happened. A failing close is logged
    /// and does not change the run's status.
    pub fn close(mut self, error: Option<TwsiError>) -> RunReport {
        if let Err(e) = self.bus.close() {
            warn!("Failed to close TWSI bus: {}", e);
        }
        self.report.stage = Stage::Closed;
        if error.is_some() {
            self.report.error = error;
        }
        self.report
    }
}

fn print_banner<W: io::Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "TWSI fft application")?;
    writeln!(out, "=======================")?;
    writeln!(out)
}

fn print_values<W: io::Write>(out: &mut W, title: &str, values: &[i32]) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    for value in values {
        writeln!(out, "  {}", value)?;
    }
    Ok(())
}

fn console(result: io::Result<()>) {
    if let Err(e) = result {
        warn!("Console write failed: {}", e);
    }
}

/// Run the whole sequence: open, set speed, SET, RUN, settle, GET, read,
/// report, close.
///
/// RUN and GET are sent best effort. The bus is closed on every path that
/// opened it.
pub fn run_sequence<B, F, W>(
    config: &Config,
    samples: &[i32; SAMPLE_COUNT],
    open: F,
    out: &mut W,
) -> RunReport
where
    B: TwsiBus,
    F: FnOnce(&BusConfig) -> Result<B>,
    W: io::Write,
{
    console(print_banner(out));

    let bus = match open(&config.bus) {
        Ok(bus) => bus,
        Err(e) => {
            error!("Failed to init TWSI: {}", e);
            let mut report = RunReport::new();
            report.error = Some(e);
            return report;
        }
    };

    let mut session = match Session::init(bus, config) {
        Ok(session) => session,
        Err((mut bus, e)) => {
            error!("Failed to init TWSI: {}", e);
            if let Err(close_err) = bus.close() {
                warn!("Failed to close TWSI bus: {}", close_err);
            }
            let mut report = RunReport::new();
            report.error = Some(e);
            return report;
        }
    };

    console(print_values(out, "Sending out data:", samples));

    if let Err(e) = session.send_coefficients(samples) {
        return session.close(Some(e));
    }

    // Both are fire-and-forget; failures end up in RunReport::ignored.
    let _ = session.start_transform(Policy::BestEffort);
    session.settle();
    let _ = session.request_results(Policy::BestEffort);

    let received = session.read_results();
    console(print_values(out, "Received data:", &received));
    session.report.stage = Stage::Reported;

    let report = session.close(None);
    info!("FFT sequence finished with status {}", report.exit_code());
    report
}
