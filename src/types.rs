use core::fmt;
use core::str::FromStr;

use libc::c_int;

use crate::error::{Error, Result};

/// Declares a closed enumeration mirroring one of the `IPMI_MONITORING_*`
/// C enums. Conversion from an integer outside the listed values fails with
/// [`Error::UnknownEnumValue`].
macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every member, in native order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The integer the library uses for this value.
            pub fn as_raw(self) -> c_int {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            /// Symbolic name (the FreeIPMI constant without its prefix).
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Decode a raw library value.
            pub fn from_raw(raw: c_int) -> Result<Self> {
                match raw {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(Error::UnknownEnumValue {
                        kind: $kind,
                        raw: raw.into(),
                    }),
                }
            }
        }

        impl TryFrom<c_int> for $name {
            type Error = Error;

            fn try_from(raw: c_int) -> Result<Self> {
                Self::from_raw(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            /// Accepts an integer (decimal or `0x` hex) or a case-insensitive name.
            fn from_str(s: &str) -> Result<Self> {
                parse_enum(s, $kind, Self::ALL, Self::name, Self::from_raw)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }
    };
}

// Integer first, then name. `-` is accepted in place of `_`.
fn parse_enum<T: Copy>(
    input: &str,
    kind: &'static str,
    all: &[T],
    name: fn(T) -> &'static str,
    from_raw: fn(c_int) -> Result<T>,
) -> Result<T> {
    let trimmed = input.trim();
    let parse_error = || Error::ParseEnum {
        kind,
        input: input.to_string(),
        expected: all.iter().map(|v| name(*v)).collect::<Vec<_>>().join(", "),
    };

    if let Some(raw) = parse_int(trimmed) {
        return from_raw(raw).map_err(|_| parse_error());
    }

    let wanted = trimmed.replace('-', "_");
    all.iter()
        .copied()
        .find(|v| name(*v).eq_ignore_ascii_case(&wanted))
        .ok_or_else(parse_error)
}

pub(crate) fn parse_int(s: &str) -> Option<c_int> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    // from_str_radix accepts its own sign.
    if !digits.starts_with(|c: char| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = i64::from_str_radix(digits, radix).ok()?;
    c_int::try_from(if negative { -value } else { value }).ok()
}

native_enum! {
    /// In-band driver used to reach the local BMC.
    pub enum DriverType ("driver type") {
        /// Probe for a working driver.
        Auto = -1 => "AUTO",
        /// Keyboard Controller Style interface.
        Kcs = 0x00 => "KCS",
        /// SMBus System Interface.
        Ssif = 0x01 => "SSIF",
        /// Linux OpenIPMI kernel driver.
        OpenIpmi = 0x02 => "OPENIPMI",
        /// Solaris BMC driver.
        SunBmc = 0x03 => "SUNBMC",
    }
}

native_enum! {
    /// The privilege level requested for an out-of-band session.
    pub enum PrivilegeLevel ("privilege level") {
        /// User privilege.
        User = 0x00 => "USER",
        /// Operator privilege.
        Operator = 0x01 => "OPERATOR",
        /// Administrator privilege.
        Admin = 0x02 => "ADMIN",
    }
}

native_enum! {
    /// IPMI LAN protocol version.
    pub enum ProtocolVersion ("protocol version") {
        /// IPMI 1.5 LAN.
        Version1_5 = 0x00 => "VERSION_1_5",
        /// IPMI 2.0 RMCP+.
        Version2_0 = 0x01 => "VERSION_2_0",
    }
}

native_enum! {
    /// Authentication type for IPMI 1.5 sessions.
    pub enum AuthenticationType ("authentication type") {
        /// No authentication.
        None = 0x00 => "NONE",
        /// Plain password.
        StraightPasswordKey = 0x01 => "STRAIGHT_PASSWORD_KEY",
        /// MD2 digest.
        Md2 = 0x02 => "MD2",
        /// MD5 digest.
        Md5 = 0x03 => "MD5",
    }
}

native_enum! {
    /// Overall state the library assigns to a sensor.
    pub enum SensorState ("sensor state") {
        /// Reading is within normal limits.
        Nominal = 0x00 => "NOMINAL",
        /// Reading crossed a non-critical limit.
        Warning = 0x01 => "WARNING",
        /// Reading crossed a critical limit.
        Critical = 0x02 => "CRITICAL",
        /// State could not be interpreted.
        Unknown = 0x03 => "UNKNOWN",
    }
}

native_enum! {
    /// How the reading pointer of a record must be interpreted.
    pub enum SensorReadingType ("sensor reading type") {
        /// One byte, non-zero is true.
        UnsignedInteger8Bool = 0x00 => "UNSIGNED_INTEGER8_BOOL",
        /// Native-endian `u32`.
        UnsignedInteger32 = 0x01 => "UNSIGNED_INTEGER32",
        /// IEEE-754 double.
        Double = 0x02 => "DOUBLE",
        /// Reading could not be interpreted.
        Unknown = 0x03 => "UNKNOWN",
    }
}

native_enum! {
    /// IPMI sensor type codes (IPMI 2.0 table 42-3).
    pub enum SensorType ("sensor type") {
        /// Reserved.
        Reserved = 0x00 => "RESERVED",
        /// Temperature.
        Temperature = 0x01 => "TEMPERATURE",
        /// Voltage.
        Voltage = 0x02 => "VOLTAGE",
        /// Current.
        Current = 0x03 => "CURRENT",
        /// Fan.
        Fan = 0x04 => "FAN",
        /// Physical security (chassis intrusion).
        PhysicalSecurity = 0x05 => "PHYSICAL_SECURITY",
        /// Platform security violation attempt.
        PlatformSecurityViolationAttempt = 0x06 => "PLATFORM_SECURITY_VIOLATION_ATTEMPT",
        /// Processor.
        Processor = 0x07 => "PROCESSOR",
        /// Power supply.
        PowerSupply = 0x08 => "POWER_SUPPLY",
        /// Power unit.
        PowerUnit = 0x09 => "POWER_UNIT",
        /// Cooling device.
        CoolingDevice = 0x0A => "COOLING_DEVICE",
        /// Other units-based sensor.
        OtherUnitsBasedSensor = 0x0B => "OTHER_UNITS_BASED_SENSOR",
        /// Memory.
        Memory = 0x0C => "MEMORY",
        /// Drive slot (bay).
        DriveSlot = 0x0D => "DRIVE_SLOT",
        /// POST memory resize.
        PostMemoryResize = 0x0E => "POST_MEMORY_RESIZE",
        /// System firmware progress.
        SystemFirmwareProgress = 0x0F => "SYSTEM_FIRMWARE_PROGRESS",
        /// Event logging disabled.
        EventLoggingDisabled = 0x10 => "EVENT_LOGGING_DISABLED",
        /// Watchdog 1.
        Watchdog1 = 0x11 => "WATCHDOG1",
        /// System event.
        SystemEvent = 0x12 => "SYSTEM_EVENT",
        /// Critical interrupt.
        CriticalInterrupt = 0x13 => "CRITICAL_INTERRUPT",
        /// Button or switch.
        ButtonSwitch = 0x14 => "BUTTON_SWITCH",
        /// Module or board.
        ModuleBoard = 0x15 => "MODULE_BOARD",
        /// Microcontroller or coprocessor.
        MicrocontrollerCoprocessor = 0x16 => "MICROCONTROLLER_COPROCESSOR",
        /// Add-in card.
        AddInCard = 0x17 => "ADD_IN_CARD",
        /// Chassis.
        Chassis = 0x18 => "CHASSIS",
        /// Chip set.
        ChipSet = 0x19 => "CHIP_SET",
        /// Other FRU.
        OtherFru = 0x1A => "OTHER_FRU",
        /// Cable or interconnect.
        CableInterconnect = 0x1B => "CABLE_INTERCONNECT",
        /// Terminator.
        Terminator = 0x1C => "TERMINATOR",
        /// System boot or restart initiated.
        SystemBootInitiated = 0x1D => "SYSTEM_BOOT_INITIATED",
        /// Boot error.
        BootError = 0x1E => "BOOT_ERROR",
        /// OS boot.
        OsBoot = 0x1F => "OS_BOOT",
        /// OS critical stop.
        OsCriticalStop = 0x20 => "OS_CRITICAL_STOP",
        /// Slot or connector.
        SlotConnector = 0x21 => "SLOT_CONNECTOR",
        /// System ACPI power state.
        SystemAcpiPowerState = 0x22 => "SYSTEM_ACPI_POWER_STATE",
        /// Watchdog 2.
        Watchdog2 = 0x23 => "WATCHDOG2",
        /// Platform alert.
        PlatformAlert = 0x24 => "PLATFORM_ALERT",
        /// Entity presence.
        EntityPresence = 0x25 => "ENTITY_PRESENCE",
        /// Monitor ASIC or IC.
        MonitorAsicIc = 0x26 => "MONITOR_ASIC_IC",
        /// LAN.
        Lan = 0x27 => "LAN",
        /// Management subsystem health.
        ManagementSubsystemHealth = 0x28 => "MANAGEMENT_SUBSYSTEM_HEALTH",
        /// Battery.
        Battery = 0x29 => "BATTERY",
        /// Session audit.
        SessionAudit = 0x2A => "SESSION_AUDIT",
        /// Version change.
        VersionChange = 0x2B => "VERSION_CHANGE",
        /// FRU state.
        FruState = 0x2C => "FRU_STATE",
        /// Type could not be determined.
        Unknown = 0xFFFF => "UNKNOWN",
    }
}

native_enum! {
    /// Units of a sensor reading (IPMI 2.0 table 43-15).
    pub enum SensorUnits ("sensor units") {
        /// Unspecified.
        None = 0x00 => "NONE",
        /// Degrees Celsius.
        Celsius = 0x01 => "CELSIUS",
        /// Degrees Fahrenheit.
        Fahrenheit = 0x02 => "FAHRENHEIT",
        /// Kelvin.
        Kelvin = 0x03 => "KELVIN",
        /// Volts.
        Volts = 0x04 => "VOLTS",
        /// Amperes.
        Amps = 0x05 => "AMPS",
        /// Watts.
        Watts = 0x06 => "WATTS",
        /// Joules.
        Joules = 0x07 => "JOULES",
        /// Coulombs.
        Coulombs = 0x08 => "COULOMBS",
        /// Volt-amperes.
        Va = 0x09 => "VA",
        /// Nits.
        Nits = 0x0A => "NITS",
        /// Lumen.
        Lumen = 0x0B => "LUMEN",
        /// Lux.
        Lux = 0x0C => "LUX",
        /// Candela.
        Candela = 0x0D => "CANDELA",
        /// Kilopascal.
        Kpa = 0x0E => "KPA",
        /// Pounds per square inch.
        Psi = 0x0F => "PSI",
        /// Newton.
        Newton = 0x10 => "NEWTON",
        /// Cubic feet per minute.
        Cfm = 0x11 => "CFM",
        /// Revolutions per minute.
        Rpm = 0x12 => "RPM",
        /// Hertz.
        Hz = 0x13 => "HZ",
        /// Microseconds.
        MicroSecond = 0x14 => "MICROSECOND",
        /// Milliseconds.
        MilliSecond = 0x15 => "MILLISECOND",
        /// Seconds.
        Second = 0x16 => "SECOND",
        /// Minutes.
        Minute = 0x17 => "MINUTE",
        /// Hours.
        Hour = 0x18 => "HOUR",
        /// Days.
        Day = 0x19 => "DAY",
        /// Weeks.
        Week = 0x1A => "WEEK",
        /// Mils.
        Mil = 0x1B => "MIL",
        /// Inches.
        Inches = 0x1C => "INCHES",
        /// Feet.
        Feet = 0x1D => "FEET",
        /// Cubic inches.
        CuIn = 0x1E => "CU_IN",
        /// Cubic feet.
        CuFeet = 0x1F => "CU_FEET",
        /// Millimeters.
        Mm = 0x20 => "MM",
        /// Centimeters.
        Cm = 0x21 => "CM",
        /// Meters.
        M = 0x22 => "M",
        /// Cubic centimeters.
        CuCm = 0x23 => "CU_CM",
        /// Cubic meters.
        CuM = 0x24 => "CU_M",
        /// Liters.
        Liters = 0x25 => "LITERS",
        /// Fluid ounces.
        FluidOunce = 0x26 => "FLUID_OUNCE",
        /// Radians.
        Radians = 0x27 => "RADIANS",
        /// Steradians.
        Steradians = 0x28 => "STERADIANS",
        /// Revolutions.
        Revolutions = 0x29 => "REVOLUTIONS",
        /// Cycles.
        Cycles = 0x2A => "CYCLES",
        /// Gravities.
        Gravities = 0x2B => "GRAVITIES",
        /// Ounces.
        Ounce = 0x2C => "OUNCE",
        /// Pounds.
        Pound = 0x2D => "POUND",
        /// Foot-pounds.
        FtLb = 0x2E => "FT_LB",
        /// Ounce-inches.
        OzIn = 0x2F => "OZ_IN",
        /// Gauss.
        Gauss = 0x30 => "GAUSS",
        /// Gilberts.
        Gilberts = 0x31 => "GILBERTS",
        /// Henry.
        Henry = 0x32 => "HENRY",
        /// Millihenry.
        MilliHenry = 0x33 => "MILLIHENRY",
        /// Farad.
        Farad = 0x34 => "FARAD",
        /// Microfarad.
        MicroFarad = 0x35 => "MICROFARAD",
        /// Ohms.
        Ohms = 0x36 => "OHMS",
        /// Siemens.
        Siemens = 0x37 => "SIEMENS",
        /// Mole.
        Mole = 0x38 => "MOLE",
        /// Becquerel.
        Becquerel = 0x39 => "BECQUEREL",
        /// Parts per million.
        Ppm = 0x3A => "PPM",
        /// Reserved.
        Reserved = 0x3B => "RESERVED",
        /// Decibels.
        Decibels = 0x3C => "DECIBELS",
        /// A-weighted decibels.
        Dba = 0x3D => "DBA",
        /// C-weighted decibels.
        Dbc = 0x3E => "DBC",
        /// Gray.
        Gray = 0x3F => "GRAY",
        /// Sievert.
        Sievert = 0x40 => "SIEVERT",
        /// Color temperature in kelvin.
        ColorTempDegK = 0x41 => "COLOR_TEMP_DEG_K",
        /// Bits.
        Bit = 0x42 => "BIT",
        /// Kilobits.
        Kilobit = 0x43 => "KILOBIT",
        /// Megabits.
        Megabit = 0x44 => "MEGABIT",
        /// Gigabits.
        Gigabit = 0x45 => "GIGABIT",
        /// Bytes.
        Byte = 0x46 => "BYTE",
        /// Kilobytes.
        Kilobyte = 0x47 => "KILOBYTE",
        /// Megabytes.
        Megabyte = 0x48 => "MEGABYTE",
        /// Gigabytes.
        Gigabyte = 0x49 => "GIGABYTE",
        /// Words.
        Word = 0x4A => "WORD",
        /// Double words.
        Dword = 0x4B => "DWORD",
        /// Quad words.
        Qword = 0x4C => "QWORD",
        /// Memory lines.
        Line = 0x4D => "LINE",
        /// Hits.
        Hit = 0x4E => "HIT",
        /// Misses.
        Miss = 0x4F => "MISS",
        /// Retries.
        Retry = 0x50 => "RETRY",
        /// Resets.
        Reset = 0x51 => "RESET",
        /// Overruns or overflows.
        Overrun = 0x52 => "OVERRUN",
        /// Underruns.
        Underrun = 0x53 => "UNDERRUN",
        /// Collisions.
        Collision = 0x54 => "COLLISION",
        /// Packets.
        Packets = 0x55 => "PACKETS",
        /// Messages.
        Messages = 0x56 => "MESSAGES",
        /// Characters.
        Characters = 0x57 => "CHARACTERS",
        /// Errors.
        Error = 0x58 => "ERROR",
        /// Correctable errors.
        CorrectableError = 0x59 => "CORRECTABLE_ERROR",
        /// Uncorrectable errors.
        UncorrectableError = 0x5A => "UNCORRECTABLE_ERROR",
        /// Fatal errors.
        FatalError = 0x5B => "FATAL_ERROR",
        /// Grams.
        Grams = 0x5C => "GRAMS",
        /// Units could not be determined.
        Unknown = 0xFFFF => "UNKNOWN",
    }
}

native_enum! {
    /// How the bitmask of a discrete sensor must be interpreted.
    pub enum SensorBitmaskType ("sensor bitmask type") {
        /// Threshold sensor.
        Threshold = 0x00 => "THRESHOLD",
        /// Generic discrete: transition state.
        DiscreteTransitionState = 0x01 => "DISCRETE_TRANSITION_STATE",
        /// Generic discrete: state.
        DiscreteState = 0x02 => "DISCRETE_STATE",
        /// Generic discrete: predictive failure.
        DiscretePredictiveFailure = 0x03 => "DISCRETE_PREDICTIVE_FAILURE",
        /// Generic discrete: limit.
        DiscreteLimit = 0x04 => "DISCRETE_LIMIT",
        /// Generic discrete: performance.
        DiscretePerformance = 0x05 => "DISCRETE_PERFORMANCE",
        /// Generic discrete: transition severity.
        DiscreteTransitionSeverity = 0x06 => "DISCRETE_TRANSITION_SEVERITY",
        /// Generic discrete: device present.
        DiscreteDevicePresent = 0x07 => "DISCRETE_DEVICE_PRESENT",
        /// Generic discrete: device enabled.
        DiscreteDeviceEnabled = 0x08 => "DISCRETE_DEVICE_ENABLED",
        /// Generic discrete: transition availability.
        DiscreteTransitionAvailability = 0x09 => "DISCRETE_TRANSITION_AVAILABILITY",
        /// Generic discrete: redundancy.
        DiscreteRedundancy = 0x0A => "DISCRETE_REDUNDANCY",
        /// Generic discrete: ACPI power state.
        DiscreteAcpiPowerState = 0x0B => "DISCRETE_ACPI_POWER_STATE",
        /// Sensor specific: physical security.
        PhysicalSecurity = 0x0C => "PHYSICAL_SECURITY",
        /// Sensor specific: platform security violation attempt.
        PlatformSecurityViolationAttempt = 0x0D => "PLATFORM_SECURITY_VIOLATION_ATTEMPT",
        /// Sensor specific: processor.
        Processor = 0x0E => "PROCESSOR",
        /// Sensor specific: power supply.
        PowerSupply = 0x0F => "POWER_SUPPLY",
        /// Sensor specific: power unit.
        PowerUnit = 0x10 => "POWER_UNIT",
        /// Sensor specific: memory.
        Memory = 0x11 => "MEMORY",
        /// Sensor specific: drive slot.
        DriveSlot = 0x12 => "DRIVE_SLOT",
        /// Sensor specific: system firmware progress.
        SystemFirmwareProgress = 0x13 => "SYSTEM_FIRMWARE_PROGRESS",
        /// Sensor specific: event logging disabled.
        EventLoggingDisabled = 0x14 => "EVENT_LOGGING_DISABLED",
        /// Sensor specific: system event.
        SystemEvent = 0x15 => "SYSTEM_EVENT",
        /// Sensor specific: critical interrupt.
        CriticalInterrupt = 0x16 => "CRITICAL_INTERRUPT",
        /// Sensor specific: module or board.
        ModuleBoard = 0x17 => "MODULE_BOARD",
        /// Sensor specific: slot or connector.
        SlotConnector = 0x18 => "SLOT_CONNECTOR",
        /// Sensor specific: watchdog 2.
        Watchdog2 = 0x19 => "WATCHDOG2",
        /// Sensor specific: entity presence.
        EntityPresence = 0x1A => "ENTITY_PRESENCE",
        /// Sensor specific: management subsystem health.
        ManagementSubsystemHealth = 0x1B => "MANAGEMENT_SUBSYSTEM_HEALTH",
        /// Sensor specific: battery.
        Battery = 0x1C => "BATTERY",
        /// Sensor specific: FRU state.
        FruState = 0x1D => "FRU_STATE",
        /// Sensor specific: cable or interconnect.
        CableInterconnect = 0x1E => "CABLE_INTERCONNECT",
        /// Sensor specific: boot error.
        BootError = 0x1F => "BOOT_ERROR",
        /// Sensor specific: button or switch.
        ButtonSwitch = 0x20 => "BUTTON_SWITCH",
        /// Sensor specific: system ACPI power state.
        SystemAcpiPowerState = 0x21 => "SYSTEM_ACPI_POWER_STATE",
        /// Bitmask could not be interpreted.
        Unknown = 0xFFFF => "UNKNOWN",
    }
}

/// The value of a sensor reading, tagged by [`SensorReadingType`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    /// `UNSIGNED_INTEGER8_BOOL`.
    Bool(bool),
    /// `UNSIGNED_INTEGER32`.
    Unsigned32(u32),
    /// `DOUBLE`.
    Double(f64),
    /// The reading type has no decoder; carries the raw type code.
    Unrecognized(c_int),
}

impl SensorReading {
    /// The numeric value as `f64`, if this reading has one.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Bool(v) => Some(if v { 1.0 } else { 0.0 }),
            Self::Unsigned32(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            Self::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Unsigned32(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Unrecognized(code) => write!(f, "unknown_type({code})"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SensorReading {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match *self {
            Self::Bool(v) => serializer.serialize_bool(v),
            Self::Unsigned32(v) => serializer.serialize_u32(v),
            Self::Double(v) => serializer.serialize_f64(v),
            Self::Unrecognized(_) => serializer.collect_str(self),
        }
    }
}

/// One decoded sensor reading.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SensorRecord {
    /// SDR record ID.
    pub record_id: i32,
    /// Event/reading type code from the SDR.
    pub event_reading_type_code: i32,
    /// Sensor number.
    pub sensor_number: i32,
    /// Sensor name (ID string).
    #[cfg_attr(feature = "serde", serde(rename = "sensor_name"))]
    pub name: String,
    /// Sensor type.
    pub sensor_type: SensorType,
    /// Interpreted state.
    #[cfg_attr(feature = "serde", serde(rename = "sensor_state"))]
    pub state: SensorState,
    /// Type tag of `reading`.
    #[cfg_attr(feature = "serde", serde(rename = "sensor_reading_type"))]
    pub reading_type: SensorReadingType,
    /// Reading value; `None` when the library supplied no reading.
    #[cfg_attr(feature = "serde", serde(rename = "sensor_reading"))]
    pub reading: Option<SensorReading>,
    /// Units of `reading`.
    #[cfg_attr(feature = "serde", serde(rename = "sensor_units"))]
    pub units: SensorUnits,
    /// Interpretation of `bitmask`.
    #[cfg_attr(feature = "serde", serde(rename = "sensor_bitmask_type"))]
    pub bitmask_type: SensorBitmaskType,
    /// Raw state bitmask.
    #[cfg_attr(feature = "serde", serde(rename = "sensor_bitmask"))]
    pub bitmask: i32,
    /// Human readable names of the asserted bitmask bits, in library order.
    #[cfg_attr(feature = "serde", serde(rename = "sensor_bitmask_strings"))]
    pub bitmask_strings: Vec<String>,
}
