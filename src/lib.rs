#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Safe bindings to FreeIPMI's `libipmimonitoring` sensor API.
//!
//! The crate loads the C library at runtime and exposes:
//! - [`Context`], an owned native context (built with [`ContextBuilder`])
//! - [`Config`], the `struct ipmi_monitoring_ipmi_config` passed to every read
//! - [`SensorReadings`], a borrowing iterator of decoded [`SensorRecord`]s
//!
//! ```no_run
//! use ipmimonitoring::{Context, SensorReadingFlags};
//!
//! # fn main() -> ipmimonitoring::Result<()> {
//! let mut ctx = Context::builder()
//!     .hostname("bmc.example.net")
//!     .username("admin")
//!     .password("secret")
//!     .build()?;
//! for record in ctx.read_sensors(SensorReadingFlags::DEFAULT)? {
//!     let record = record?;
//!     println!("{} {:?}", record.name, record.reading);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! All native calls go through the [`backend::Backend`] trait, so a context
//! can also run against an in-process implementation of the ABI. The trait
//! is `unsafe` to implement because the decoders trust the pointers it returns.

pub mod backend;
mod config;
mod context;
mod decode;
mod error;
mod flags;
mod observe;
mod sensor;
mod types;

pub use crate::config::{Config, ConfigField, ConfigValue, FieldKind};
pub use crate::context::{Context, ContextBuilder};
pub use crate::error::{Error, Result};
pub use crate::flags::{InitFlags, SensorReadingFlags};
pub use crate::sensor::SensorReadings;
pub use crate::types::{
    AuthenticationType, DriverType, PrivilegeLevel, ProtocolVersion, SensorBitmaskType,
    SensorReading, SensorReadingType, SensorRecord, SensorState, SensorType, SensorUnits,
};
