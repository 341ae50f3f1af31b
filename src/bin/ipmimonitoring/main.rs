mod args;
mod output;

use std::io::Write;
use std::thread;

use anyhow::Context as _;
use clap::Parser;
use ipmimonitoring::{Context, SensorReadingFlags, SensorRecord};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, FilterArgs};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = cli.output_format();
    let follow = cli.follow_interval()?;
    let flags = cli.reading.flags();
    let mut context = cli
        .context_builder()?
        .build()
        .context("failed to open ipmi monitoring context")?;

    let mut stdout = std::io::stdout().lock();
    loop {
        let records = read_records(&mut context, &cli.filters, flags)?;
        writeln!(stdout, "{}", format.render(&records)?)?;
        stdout.flush()?;

        match follow {
            Some(interval) => thread::sleep(interval),
            None => break,
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read once, by sensor type, by record ID or everything. Records that fail
/// to decode are logged and skipped.
fn read_records(
    context: &mut Context,
    filters: &FilterArgs,
    flags: SensorReadingFlags,
) -> anyhow::Result<Vec<SensorRecord>> {
    let readings = if !filters.sensor_types.is_empty() {
        context.read_sensors_by_sensor_type(&filters.sensor_types, flags)
    } else if !filters.record_ids.is_empty() {
        context.read_sensors_by_record_id(&filters.record_ids, flags)
    } else {
        context.read_sensors(flags)
    }
    .context("failed to read sensors")?;

    let mut records = Vec::with_capacity(readings.len());
    for record in readings {
        match record {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(error = %err, "skipping sensor record"),
        }
    }
    Ok(records)
}
