use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use libc::c_uint;

use crate::error::{Error, Result};

macro_rules! native_flags {
    (
        $(#[$meta:meta])*
        pub struct $name:ident ($kind:literal) {
            $(
                $(#[$fmeta:meta])*
                const $flag:ident = $value:literal;
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(c_uint);

        impl $name {
            $(
                $(#[$fmeta])*
                pub const $flag: Self = Self($value);
            )+

            const NAMED: &'static [(&'static str, Self)] = &[$((stringify!($flag), Self::$flag)),+];

            /// No flags set.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Every known flag.
            pub const fn all() -> Self {
                Self(0 $(| $value)+)
            }

            /// Build from raw bits, rejecting bits the library does not define.
            pub fn from_bits(bits: c_uint) -> Result<Self> {
                if bits & !Self::all().0 != 0 {
                    return Err(Error::UnknownEnumValue {
                        kind: $kind,
                        raw: bits.into(),
                    });
                }
                Ok(Self(bits))
            }

            /// Raw bits passed to the library.
            pub const fn bits(self) -> c_uint {
                self.0
            }

            /// True when every bit of `other` is set.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// True when no flag is set.
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Set or clear `other`.
            pub fn set(&mut self, other: Self, enabled: bool) {
                if enabled {
                    self.0 |= other.0;
                } else {
                    self.0 &= !other.0;
                }
            }

            /// Names of the set flags, in bit order.
            pub fn names(self) -> impl Iterator<Item = &'static str> {
                Self::NAMED
                    .iter()
                    .filter(move |(_, flag)| self.contains(*flag) && !flag.is_empty())
                    .map(|(name, _)| *name)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_empty() {
                    return f.write_str("NONE");
                }
                let names: Vec<&str> = self.names().collect();
                f.write_str(&names.join(" | "))
            }
        }
    };
}

native_flags! {
    /// Flags for `ipmi_monitoring_init`.
    pub struct InitFlags ("init flags") {
        /// Print library debug output.
        const DEBUG = 0x01;
        /// Dump IPMI packets.
        const DEBUG_IPMI_PACKETS = 0x02;
        /// Lock library memory (keeps credentials out of swap).
        const LOCK_MEMORY = 0x04;
    }
}

native_flags! {
    /// Flags passed to every sensor enumeration call.
    pub struct SensorReadingFlags ("sensor reading flags") {
        /// Re-read the SDR cache before reading sensors.
        const REREAD_SDR_CACHE = 0x0001;
        /// Skip sensors the library cannot interpret.
        const IGNORE_NON_INTERPRETABLE_SENSORS = 0x0002;
        /// Read sensors behind a bridge (satellite controllers).
        const BRIDGE_SENSORS = 0x0004;
        /// Interpret OEM data for known vendors.
        const INTERPRET_OEM_DATA = 0x0008;
        /// Iterate shared sensors individually.
        const SHARED_SENSORS = 0x0010;
        /// Allow discrete readings from threshold sensors.
        const DISCRETE_READING = 0x0020;
        /// Report sensors with scanning disabled.
        const IGNORE_SCANNING_DISABLED = 0x0040;
        /// Assume the BMC owns every sensor.
        const ASSUME_BMC_OWNER = 0x0080;
        /// Prefix sensor names with their entity.
        const ENTITY_SENSOR_NAMES = 0x0100;
    }
}

impl SensorReadingFlags {
    /// The flags used when the caller does not choose any.
    pub const DEFAULT: Self = Self::IGNORE_NON_INTERPRETABLE_SENSORS;
}
