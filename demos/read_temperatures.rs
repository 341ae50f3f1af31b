use ipmimonitoring::{Context, SensorReading, SensorReadingFlags};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example:
    //   cargo run --example read_temperatures                       (local BMC)
    //   cargo run --example read_temperatures -- bmc.example admin password
    let mut args = std::env::args().skip(1);
    let mut builder = Context::builder();
    if let Some(hostname) = args.next() {
        let username = args.next().ok_or("missing <username>")?;
        let password = args.next().ok_or("missing <password>")?;
        builder = builder
            .hostname(hostname)
            .username(username)
            .password(password);
    }
    // SAFETY: geteuid has no preconditions and cannot fail.
    let root = unsafe { libc::geteuid() } == 0;
    if let Some(dir) = sdr_cache_directory(root, std::env::var("HOME").ok()) {
        builder = builder.sdr_cache_directory(dir);
    }

    let mut ctx = builder.build()?;
    for record in ctx.read_sensors(SensorReadingFlags::DEFAULT)? {
        let record = record?;
        if let Some(SensorReading::Double(value)) = record.reading {
            println!("{:<20}  {value:>8.2}  {}", record.name, record.units);
        }
    }

    Ok(())
}

// The system SDR cache directory is only writable by root.
fn sdr_cache_directory(root: bool, home: Option<String>) -> Option<String> {
    if root {
        return None;
    }
    home.map(|home| format!("{home}/.cache"))
}
