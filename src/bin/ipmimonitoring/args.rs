use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser};
use ipmimonitoring::{
    AuthenticationType, Config, ContextBuilder, DriverType, InitFlags, PrivilegeLevel,
    ProtocolVersion, SensorReadingFlags,
};

use crate::output::{OutputFormat, TableFormat};

/// Read IPMI sensors through FreeIPMI's libipmimonitoring
#[derive(Parser, Debug)]
#[command(name = "ipmimonitoring", version, about, long_about = None)]
pub struct Cli {
    /// Keep reading, sleeping SECONDS between reads (default: 1)
    #[arg(long, value_name = "SECONDS", num_args = 0..=1, default_missing_value = "1")]
    pub follow: Option<f64>,

    /// Output a table (text, html, json, csv, latex, mediawiki; default: text)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "text")]
    pub table: Option<TableFormat>,

    /// Output JSON, pretty printed when INDENT is given
    #[arg(long, value_name = "INDENT", num_args = 0..=1, conflicts_with = "table")]
    pub json: Option<Option<usize>>,

    /// Log library activity at debug level
    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub in_band: InBandArgs,

    #[command(flatten)]
    pub out_of_band: OutOfBandArgs,

    #[command(flatten)]
    pub reading: ReadingFlagArgs,

    #[command(flatten)]
    pub files: FileArgs,

    #[command(flatten)]
    pub misc: MiscArgs,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Sensor filters")]
pub struct FilterArgs {
    /// Sensor types to read (repeatable, takes precedence over --record-id)
    #[arg(long = "sensor-type", value_name = "TYPE")]
    pub sensor_types: Vec<u32>,

    /// Record IDs to read (repeatable)
    #[arg(long = "record-id", value_name = "ID")]
    pub record_ids: Vec<u32>,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "In-band communication")]
pub struct InBandArgs {
    /// Driver type, by name or number
    #[arg(long, value_name = "NAME|INT", default_value = "AUTO")]
    pub driver_type: DriverType,

    /// Disable driver auto probing
    #[arg(long, overrides_with = "no_disable_auto_probe")]
    pub disable_auto_probe: bool,

    #[arg(long, overrides_with = "disable_auto_probe", hide = true)]
    pub no_disable_auto_probe: bool,

    /// Driver address (not used when probing)
    #[arg(long, value_name = "ADDRESS", default_value_t = 0)]
    pub driver_address: u32,

    /// Register spacing (not used when probing)
    #[arg(long, value_name = "SPACING", default_value_t = 0)]
    pub register_spacing: u32,

    /// Driver device (not used when probing)
    #[arg(long, value_name = "PATH")]
    pub driver_device: Option<String>,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Out-of-band communication")]
pub struct OutOfBandArgs {
    /// Remote BMC; reads the local BMC when omitted
    #[arg(long, env = "IPMI_HOSTNAME")]
    pub hostname: Option<String>,

    /// Username
    #[arg(long, env = "IPMI_USERNAME")]
    pub username: Option<String>,

    /// Password
    #[arg(long, env = "IPMI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Privilege level, by name or number
    #[arg(long, value_name = "NAME|INT", default_value = "USER")]
    pub privilege_level: PrivilegeLevel,

    /// Protocol version, by name or number
    #[arg(long, value_name = "NAME|INT", default_value = "VERSION_1_5")]
    pub protocol_version: ProtocolVersion,

    /// IPMI 1.5 authentication type, by name or number
    #[arg(long, value_name = "NAME|INT", default_value = "MD5")]
    pub authentication_type: AuthenticationType,

    /// IPMI 2.0 cipher suite ID
    #[arg(long, value_name = "ID", default_value_t = 0)]
    pub cipher_suite_id: i32,

    /// Read the K_g key from FILE
    #[arg(long = "k-g", value_name = "FILE")]
    pub k_g: Option<PathBuf>,

    /// Session timeout in milliseconds (0: library default)
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub session_timeout: i32,

    /// Retransmission timeout in milliseconds (0: library default)
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub retransmission_timeout: i32,
}

macro_rules! toggles {
    ($( $(#[$doc:meta])* $on:ident / $off:ident = $default:literal => $flag:ident; )+) => {
        #[derive(Args, Debug)]
        #[command(next_help_heading = "Sensor reading flags")]
        pub struct ReadingFlagArgs {
            $(
                $(#[$doc])*
                #[arg(long, overrides_with = stringify!($off))]
                pub $on: bool,

                #[arg(long, overrides_with = stringify!($on), hide = true)]
                pub $off: bool,
            )+
        }

        impl ReadingFlagArgs {
            /// Combine the toggles into the flags passed to every read.
            pub fn flags(&self) -> SensorReadingFlags {
                let mut flags = SensorReadingFlags::empty();
                $(
                    flags.set(SensorReadingFlags::$flag, toggle(self.$on, self.$off, $default));
                )+
                flags
            }
        }
    };
}

toggles! {
    /// Reread the SDR cache
    reread_sdr_cache / no_reread_sdr_cache = false => REREAD_SDR_CACHE;
    /// Ignore non-interpretable sensors (default: on)
    ignore_non_interpretable_sensors / no_ignore_non_interpretable_sensors = true
        => IGNORE_NON_INTERPRETABLE_SENSORS;
    /// Read bridged sensors
    bridge_sensors / no_bridge_sensors = false => BRIDGE_SENSORS;
    /// Interpret OEM data
    interpret_oem_data / no_interpret_oem_data = false => INTERPRET_OEM_DATA;
    /// Iterate shared sensors
    shared_sensors / no_shared_sensors = false => SHARED_SENSORS;
    /// Allow discrete readings from threshold sensors
    discrete_reading / no_discrete_reading = false => DISCRETE_READING;
    /// Report sensors with scanning disabled
    ignore_scanning_disabled / no_ignore_scanning_disabled = false => IGNORE_SCANNING_DISABLED;
    /// Assume the BMC owns every sensor
    assume_bmc_owner / no_assume_bmc_owner = false => ASSUME_BMC_OWNER;
    /// Prefix sensor names with their entity
    entity_sensor_names / no_entity_sensor_names = false => ENTITY_SENSOR_NAMES;
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Directories and files")]
pub struct FileArgs {
    /// SDR cache directory (default: $HOME/.cache unless running as root)
    #[arg(long, value_name = "DIR")]
    pub sdr_cache_directory: Option<String>,

    /// SDR cache file name format
    #[arg(long, value_name = "FORMAT")]
    pub sdr_cache_filenames: Option<String>,

    /// Sensor configuration file
    #[arg(long, value_name = "FILE")]
    pub sensor_config_file: Option<String>,

    /// Path of libipmimonitoring
    #[arg(long, value_name = "PATH")]
    pub library: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Miscellaneous")]
pub struct MiscArgs {
    /// Library initialization flags
    #[arg(long, value_name = "BITS", default_value_t = 0)]
    pub init_flags: u32,

    /// BMC workaround flags
    #[arg(long, value_name = "BITS", default_value_t = 0)]
    pub workaround_flags: u32,
}

fn toggle(on: bool, off: bool, default: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        default
    }
}

impl Cli {
    /// The requested output; a text table when neither --json nor --table is given.
    pub fn output_format(&self) -> OutputFormat {
        match (self.json, self.table) {
            (Some(indent), _) => OutputFormat::Json { indent },
            (None, Some(format)) => OutputFormat::Table(format),
            (None, None) => OutputFormat::Table(TableFormat::Text),
        }
    }

    /// Delay between reads, `None` to read once.
    pub fn follow_interval(&self) -> anyhow::Result<Option<Duration>> {
        self.follow
            .map(|secs| Duration::try_from_secs_f64(secs).context("invalid --follow interval"))
            .transpose()
    }

    /// Build the connection settings from the in-band and out-of-band groups.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::new();
        config.set_driver_type(self.in_band.driver_type);
        config.set_disable_auto_probe(toggle(
            self.in_band.disable_auto_probe,
            self.in_band.no_disable_auto_probe,
            false,
        ));
        config.set_driver_address(self.in_band.driver_address);
        config.set_register_spacing(self.in_band.register_spacing);
        config.set_driver_device(self.in_band.driver_device.as_deref())?;

        let oob = &self.out_of_band;
        config.set_protocol_version(oob.protocol_version);
        config.set_username(oob.username.as_deref())?;
        config.set_password(oob.password.as_deref())?;
        if let Some(path) = &oob.k_g {
            let key = zeroize::Zeroizing::new(
                std::fs::read(path)
                    .with_context(|| format!("failed to read K_g from {}", path.display()))?,
            );
            config.set_k_g(Some(key.as_slice()));
        }
        config.set_privilege_level(oob.privilege_level);
        config.set_authentication_type(oob.authentication_type);
        config.set_cipher_suite_id(oob.cipher_suite_id);
        config.set_session_timeout_len(oob.session_timeout);
        config.set_retransmission_timeout_len(oob.retransmission_timeout);
        config.set_workaround_flags(self.misc.workaround_flags);
        Ok(config)
    }

    /// SDR cache directory, defaulted for unprivileged users.
    pub fn sdr_cache_directory(&self) -> Option<String> {
        self.files
            .sdr_cache_directory
            .clone()
            .or_else(|| default_sdr_cache_directory(is_root(), std::env::var("HOME").ok()))
    }

    /// A builder carrying every setting of the command line.
    pub fn context_builder(&self) -> anyhow::Result<ContextBuilder> {
        let init_flags =
            InitFlags::from_bits(self.misc.init_flags).context("invalid --init-flags")?;
        let mut builder = ContextBuilder::new()
            .config(self.config()?)
            .init_flags(init_flags);
        if let Some(hostname) = &self.out_of_band.hostname {
            builder = builder.hostname(hostname.as_str());
        }
        if let Some(dir) = self.sdr_cache_directory() {
            builder = builder.sdr_cache_directory(dir);
        }
        if let Some(format) = &self.files.sdr_cache_filenames {
            builder = builder.sdr_cache_filenames(format.as_str());
        }
        if let Some(path) = &self.files.sensor_config_file {
            builder = builder.sensor_config_file(path.as_str());
        }
        if let Some(path) = &self.files.library {
            builder = builder.library(path.clone());
        }
        Ok(builder)
    }
}

fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

// The system SDR cache directory is only writable by root.
fn default_sdr_cache_directory(root: bool, home: Option<String>) -> Option<String> {
    if root {
        return None;
    }
    home.map(|home| {
        PathBuf::from(home)
            .join(".cache")
            .to_string_lossy()
            .into_owned()
    })
}
