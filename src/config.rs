#![allow(unsafe_code)]

use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;
use std::ptr;

use libc::{c_char, c_int, c_uint};
use zeroize::Zeroizing;

use crate::backend::IpmiMonitoringIpmiConfig;
use crate::decode::decode_c_string;
use crate::error::{Error, Result};
use crate::types::{AuthenticationType, DriverType, PrivilegeLevel, ProtocolVersion};

/// A field of `struct ipmi_monitoring_ipmi_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    /// `driver_type`
    DriverType,
    /// `disable_auto_probe`
    DisableAutoProbe,
    /// `driver_address`
    DriverAddress,
    /// `register_spacing`
    RegisterSpacing,
    /// `driver_device`
    DriverDevice,
    /// `protocol_version`
    ProtocolVersion,
    /// `username`
    Username,
    /// `password`
    Password,
    /// `k_g`
    KG,
    /// `k_g_len` (read only, follows `k_g`)
    KGLen,
    /// `privilege_level`
    PrivilegeLevel,
    /// `authentication_type`
    AuthenticationType,
    /// `cipher_suite_id`
    CipherSuiteId,
    /// `session_timeout_len`
    SessionTimeoutLen,
    /// `retransmission_timeout_len`
    RetransmissionTimeoutLen,
    /// `workaround_flags`
    WorkaroundFlags,
}

/// The value type a [`ConfigField`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Optional UTF-8 string.
    Text,
    /// Optional byte string.
    Bytes,
    /// [`DriverType`].
    DriverType,
    /// [`PrivilegeLevel`].
    PrivilegeLevel,
    /// [`ProtocolVersion`].
    ProtocolVersion,
    /// [`AuthenticationType`].
    AuthenticationType,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Boolean.
    Bool,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::DriverType => "driver type",
            Self::PrivilegeLevel => "privilege level",
            Self::ProtocolVersion => "protocol version",
            Self::AuthenticationType => "authentication type",
            Self::Int => "integer",
            Self::UInt => "unsigned integer",
            Self::Bool => "boolean",
        })
    }
}

impl ConfigField {
    /// Every field, in struct order.
    pub const ALL: &'static [Self] = &[
        Self::DriverType,
        Self::DisableAutoProbe,
        Self::DriverAddress,
        Self::RegisterSpacing,
        Self::DriverDevice,
        Self::ProtocolVersion,
        Self::Username,
        Self::Password,
        Self::KG,
        Self::KGLen,
        Self::PrivilegeLevel,
        Self::AuthenticationType,
        Self::CipherSuiteId,
        Self::SessionTimeoutLen,
        Self::RetransmissionTimeoutLen,
        Self::WorkaroundFlags,
    ];

    /// The C field name.
    pub fn name(self) -> &'static str {
        match self {
            Self::DriverType => "driver_type",
            Self::DisableAutoProbe => "disable_auto_probe",
            Self::DriverAddress => "driver_address",
            Self::RegisterSpacing => "register_spacing",
            Self::DriverDevice => "driver_device",
            Self::ProtocolVersion => "protocol_version",
            Self::Username => "username",
            Self::Password => "password",
            Self::KG => "k_g",
            Self::KGLen => "k_g_len",
            Self::PrivilegeLevel => "privilege_level",
            Self::AuthenticationType => "authentication_type",
            Self::CipherSuiteId => "cipher_suite_id",
            Self::SessionTimeoutLen => "session_timeout_len",
            Self::RetransmissionTimeoutLen => "retransmission_timeout_len",
            Self::WorkaroundFlags => "workaround_flags",
        }
    }

    /// The value type of the field.
    pub fn kind(self) -> FieldKind {
        match self {
            Self::DriverType => FieldKind::DriverType,
            Self::DisableAutoProbe => FieldKind::Bool,
            Self::DriverAddress | Self::RegisterSpacing | Self::KGLen | Self::WorkaroundFlags => {
                FieldKind::UInt
            }
            Self::DriverDevice | Self::Username | Self::Password => FieldKind::Text,
            Self::ProtocolVersion => FieldKind::ProtocolVersion,
            Self::KG => FieldKind::Bytes,
            Self::PrivilegeLevel => FieldKind::PrivilegeLevel,
            Self::AuthenticationType => FieldKind::AuthenticationType,
            Self::CipherSuiteId | Self::SessionTimeoutLen | Self::RetransmissionTimeoutLen => {
                FieldKind::Int
            }
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown config field '{s}'")))
    }
}

/// A value read from or written to a [`ConfigField`].
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// Optional UTF-8 string.
    Text(Option<String>),
    /// Optional byte string.
    Bytes(Option<Vec<u8>>),
    /// Driver type.
    DriverType(DriverType),
    /// Privilege level.
    PrivilegeLevel(PrivilegeLevel),
    /// Protocol version.
    ProtocolVersion(ProtocolVersion),
    /// Authentication type.
    AuthenticationType(AuthenticationType),
    /// Signed integer.
    Int(i32),
    /// Unsigned integer.
    UInt(u32),
    /// Boolean.
    Bool(bool),
}

impl ConfigValue {
    /// The kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Bytes(_) => FieldKind::Bytes,
            Self::DriverType(_) => FieldKind::DriverType,
            Self::PrivilegeLevel(_) => FieldKind::PrivilegeLevel,
            Self::ProtocolVersion(_) => FieldKind::ProtocolVersion,
            Self::AuthenticationType(_) => FieldKind::AuthenticationType,
            Self::Int(_) => FieldKind::Int,
            Self::UInt(_) => FieldKind::UInt,
            Self::Bool(_) => FieldKind::Bool,
        }
    }
}

// Byte strings may hold credentials.
impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Bytes(v) => f
                .debug_tuple("Bytes")
                .field(&v.as_ref().map(|b| format!("<{} bytes>", b.len())))
                .finish(),
            Self::DriverType(v) => f.debug_tuple("DriverType").field(v).finish(),
            Self::PrivilegeLevel(v) => f.debug_tuple("PrivilegeLevel").field(v).finish(),
            Self::ProtocolVersion(v) => f.debug_tuple("ProtocolVersion").field(v).finish(),
            Self::AuthenticationType(v) => f.debug_tuple("AuthenticationType").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
        }
    }
}

/// IPMI connection settings passed to every sensor read.
///
/// Wraps the native `struct ipmi_monitoring_ipmi_config`. Pointer fields
/// refer to buffers owned by this value; replacing a field frees (and
/// zeroizes) its previous buffer at once, and dropping the config frees them
/// all. Not `Send`: mutate it from the thread that owns the context.
pub struct Config {
    raw: IpmiMonitoringIpmiConfig,
    buffers: HashMap<ConfigField, Zeroizing<Vec<u8>>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw: IpmiMonitoringIpmiConfig {
                driver_type: DriverType::Auto.as_raw(),
                disable_auto_probe: 0,
                driver_address: 0,
                register_spacing: 0,
                driver_device: ptr::null_mut(),
                protocol_version: ProtocolVersion::Version1_5.as_raw(),
                username: ptr::null_mut(),
                password: ptr::null_mut(),
                k_g: ptr::null_mut(),
                k_g_len: 0,
                privilege_level: PrivilegeLevel::User.as_raw(),
                authentication_type: AuthenticationType::Md5.as_raw(),
                cipher_suite_id: 0,
                session_timeout_len: 0,
                retransmission_timeout_len: 0,
                workaround_flags: 0,
            },
            buffers: HashMap::new(),
        }
    }
}

impl Config {
    /// Create a config with library defaults (`AUTO`, `USER`, `VERSION_1_5`, `MD5`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into `field`.
    ///
    /// Fails when the value kind does not match the field, and for
    /// `k_g_len`, which only changes through `k_g`.
    pub fn set(&mut self, field: ConfigField, value: ConfigValue) -> Result<()> {
        match (field, value) {
            (ConfigField::DriverType, ConfigValue::DriverType(v)) => self.set_driver_type(v),
            (ConfigField::DisableAutoProbe, ConfigValue::Bool(v)) => {
                self.set_disable_auto_probe(v)
            }
            (ConfigField::DriverAddress, ConfigValue::UInt(v)) => self.set_driver_address(v),
            (ConfigField::RegisterSpacing, ConfigValue::UInt(v)) => self.set_register_spacing(v),
            (ConfigField::DriverDevice, ConfigValue::Text(v)) => {
                self.set_driver_device(v.as_deref())?
            }
            (ConfigField::ProtocolVersion, ConfigValue::ProtocolVersion(v)) => {
                self.set_protocol_version(v)
            }
            (ConfigField::Username, ConfigValue::Text(v)) => self.set_username(v.as_deref())?,
            (ConfigField::Password, ConfigValue::Text(v)) => self.set_password(v.as_deref())?,
            (ConfigField::KG, ConfigValue::Bytes(v)) => self.set_k_g(v.as_deref()),
            (ConfigField::KGLen, _) => {
                return Err(Error::invalid_argument(
                    "k_g_len follows k_g and cannot be set on its own",
                ));
            }
            (ConfigField::PrivilegeLevel, ConfigValue::PrivilegeLevel(v)) => {
                self.set_privilege_level(v)
            }
            (ConfigField::AuthenticationType, ConfigValue::AuthenticationType(v)) => {
                self.set_authentication_type(v)
            }
            (ConfigField::CipherSuiteId, ConfigValue::Int(v)) => self.set_cipher_suite_id(v),
            (ConfigField::SessionTimeoutLen, ConfigValue::Int(v)) => {
                self.set_session_timeout_len(v)
            }
            (ConfigField::RetransmissionTimeoutLen, ConfigValue::Int(v)) => {
                self.set_retransmission_timeout_len(v)
            }
            (ConfigField::WorkaroundFlags, ConfigValue::UInt(v)) => self.set_workaround_flags(v),
            (field, value) => {
                return Err(Error::invalid_argument(format!(
                    "{field} expects {}, got {}",
                    field.kind(),
                    value.kind()
                )));
            }
        }
        Ok(())
    }

    /// Read `field` back from the native record.
    pub fn get(&self, field: ConfigField) -> Result<ConfigValue> {
        Ok(match field {
            ConfigField::DriverType => ConfigValue::DriverType(self.driver_type()?),
            ConfigField::DisableAutoProbe => ConfigValue::Bool(self.disable_auto_probe()),
            ConfigField::DriverAddress => ConfigValue::UInt(self.driver_address()),
            ConfigField::RegisterSpacing => ConfigValue::UInt(self.register_spacing()),
            ConfigField::DriverDevice => ConfigValue::Text(self.driver_device()?),
            ConfigField::ProtocolVersion => ConfigValue::ProtocolVersion(self.protocol_version()?),
            ConfigField::Username => ConfigValue::Text(self.username()?),
            ConfigField::Password => ConfigValue::Text(self.password()?),
            ConfigField::KG => ConfigValue::Bytes(self.k_g().map(<[u8]>::to_vec)),
            ConfigField::KGLen => ConfigValue::UInt(self.k_g_len()),
            ConfigField::PrivilegeLevel => ConfigValue::PrivilegeLevel(self.privilege_level()?),
            ConfigField::AuthenticationType => {
                ConfigValue::AuthenticationType(self.authentication_type()?)
            }
            ConfigField::CipherSuiteId => ConfigValue::Int(self.cipher_suite_id()),
            ConfigField::SessionTimeoutLen => ConfigValue::Int(self.session_timeout_len()),
            ConfigField::RetransmissionTimeoutLen => {
                ConfigValue::Int(self.retransmission_timeout_len())
            }
            ConfigField::WorkaroundFlags => ConfigValue::UInt(self.workaround_flags()),
        })
    }

    /// In-band driver.
    pub fn driver_type(&self) -> Result<DriverType> {
        DriverType::from_raw(self.raw.driver_type)
    }

    /// Set the in-band driver.
    pub fn set_driver_type(&mut self, value: DriverType) {
        self.raw.driver_type = value.as_raw();
    }

    /// Whether driver probing is disabled.
    pub fn disable_auto_probe(&self) -> bool {
        self.raw.disable_auto_probe != 0
    }

    /// Disable or enable driver probing.
    pub fn set_disable_auto_probe(&mut self, value: bool) {
        self.raw.disable_auto_probe = c_int::from(value);
    }

    /// Driver address.
    pub fn driver_address(&self) -> u32 {
        self.raw.driver_address
    }

    /// Set the driver address.
    pub fn set_driver_address(&mut self, value: u32) {
        self.raw.driver_address = value;
    }

    /// Register spacing.
    pub fn register_spacing(&self) -> u32 {
        self.raw.register_spacing
    }

    /// Set the register spacing.
    pub fn set_register_spacing(&mut self, value: u32) {
        self.raw.register_spacing = value;
    }

    /// Driver device path.
    pub fn driver_device(&self) -> Result<Option<String>> {
        self.read_text(self.raw.driver_device)
    }

    /// Set or clear the driver device path.
    pub fn set_driver_device(&mut self, value: Option<&str>) -> Result<()> {
        self.raw.driver_device = self.store_text(ConfigField::DriverDevice, value)?;
        Ok(())
    }

    /// LAN protocol version.
    pub fn protocol_version(&self) -> Result<ProtocolVersion> {
        ProtocolVersion::from_raw(self.raw.protocol_version)
    }

    /// Set the LAN protocol version.
    pub fn set_protocol_version(&mut self, value: ProtocolVersion) {
        self.raw.protocol_version = value.as_raw();
    }

    /// Out-of-band username.
    pub fn username(&self) -> Result<Option<String>> {
        self.read_text(self.raw.username)
    }

    /// Set or clear the username.
    pub fn set_username(&mut self, value: Option<&str>) -> Result<()> {
        self.raw.username = self.store_text(ConfigField::Username, value)?;
        Ok(())
    }

    /// Out-of-band password.
    pub fn password(&self) -> Result<Option<String>> {
        self.read_text(self.raw.password)
    }

    /// Set or clear the password.
    pub fn set_password(&mut self, value: Option<&str>) -> Result<()> {
        self.raw.password = self.store_text(ConfigField::Password, value)?;
        Ok(())
    }

    /// The BMC key (`K_g`), if set.
    pub fn k_g(&self) -> Option<&[u8]> {
        if self.raw.k_g.is_null() {
            return None;
        }
        // SAFETY: `k_g` points into `self.buffers[KG]`, which holds at least
        // `k_g_len` bytes and lives as long as `self`.
        Some(unsafe { std::slice::from_raw_parts(self.raw.k_g, self.raw.k_g_len as usize) })
    }

    /// Length of the BMC key; always the length of [`Config::k_g`].
    pub fn k_g_len(&self) -> u32 {
        self.raw.k_g_len
    }

    /// Set or clear the BMC key. Updates `k_g_len` in the same step.
    pub fn set_k_g(&mut self, value: Option<&[u8]>) {
        let len = value.map_or(0, <[u8]>::len);
        let ptr = self.store_bytes(ConfigField::KG, value.map(<[u8]>::to_vec));
        self.raw.k_g = ptr;
        self.raw.k_g_len = len as c_uint;
    }

    /// Requested privilege level.
    pub fn privilege_level(&self) -> Result<PrivilegeLevel> {
        PrivilegeLevel::from_raw(self.raw.privilege_level)
    }

    /// Set the requested privilege level.
    pub fn set_privilege_level(&mut self, value: PrivilegeLevel) {
        self.raw.privilege_level = value.as_raw();
    }

    /// IPMI 1.5 authentication type.
    pub fn authentication_type(&self) -> Result<AuthenticationType> {
        AuthenticationType::from_raw(self.raw.authentication_type)
    }

    /// Set the IPMI 1.5 authentication type.
    pub fn set_authentication_type(&mut self, value: AuthenticationType) {
        self.raw.authentication_type = value.as_raw();
    }

    /// IPMI 2.0 cipher suite ID.
    pub fn cipher_suite_id(&self) -> i32 {
        self.raw.cipher_suite_id
    }

    /// Set the IPMI 2.0 cipher suite ID.
    pub fn set_cipher_suite_id(&mut self, value: i32) {
        self.raw.cipher_suite_id = value;
    }

    /// Session timeout in milliseconds (`0` = library default).
    pub fn session_timeout_len(&self) -> i32 {
        self.raw.session_timeout_len
    }

    /// Set the session timeout in milliseconds.
    pub fn set_session_timeout_len(&mut self, value: i32) {
        self.raw.session_timeout_len = value;
    }

    /// Retransmission timeout in milliseconds (`0` = library default).
    pub fn retransmission_timeout_len(&self) -> i32 {
        self.raw.retransmission_timeout_len
    }

    /// Set the retransmission timeout in milliseconds.
    pub fn set_retransmission_timeout_len(&mut self, value: i32) {
        self.raw.retransmission_timeout_len = value;
    }

    /// BMC workaround flags.
    pub fn workaround_flags(&self) -> u32 {
        self.raw.workaround_flags
    }

    /// Set the BMC workaround flags.
    pub fn set_workaround_flags(&mut self, value: u32) {
        self.raw.workaround_flags = value;
    }

    /// Pointer handed to the enumeration calls. Valid while `self` is
    /// borrowed.
    pub(crate) fn as_raw_mut(&mut self) -> *mut IpmiMonitoringIpmiConfig {
        &mut self.raw
    }

    fn read_text(&self, ptr: *const c_char) -> Result<Option<String>> {
        // SAFETY: text fields are null or point at a NUL-terminated buffer
        // in `self.buffers`.
        unsafe { decode_c_string(ptr) }
    }

    fn store_text(&mut self, field: ConfigField, value: Option<&str>) -> Result<*mut c_char> {
        let bytes = match value {
            Some(text) => {
                if text.as_bytes().contains(&0) {
                    return Err(Error::invalid_argument(format!(
                        "{field} must not contain NUL bytes"
                    )));
                }
                Some(text.as_bytes().to_vec())
            }
            None => None,
        };
        Ok(self.store_bytes(field, bytes).cast())
    }

    // Every buffer gets a trailing NUL, so even an empty value has a real
    // allocation behind its pointer.
    fn store_bytes(&mut self, field: ConfigField, bytes: Option<Vec<u8>>) -> *mut u8 {
        let Some(mut bytes) = bytes else {
            self.buffers.remove(&field);
            return ptr::null_mut();
        };
        bytes.push(0);
        let mut buffer = Zeroizing::new(bytes);
        let ptr = buffer.as_mut_ptr();
        // The previous buffer, if any, is zeroized and freed here.
        self.buffers.insert(field, buffer);
        ptr
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = |set: bool| if set { "<secret>" } else { "<unset>" };
        f.debug_struct("Config")
            .field("driver_type", &self.raw.driver_type)
            .field("disable_auto_probe", &self.disable_auto_probe())
            .field("driver_address", &self.raw.driver_address)
            .field("register_spacing", &self.raw.register_spacing)
            .field("driver_device", &self.driver_device().ok().flatten())
            .field("protocol_version", &self.raw.protocol_version)
            .field("username", &self.username().ok().flatten())
            .field("password", &secret(!self.raw.password.is_null()))
            .field("k_g", &secret(!self.raw.k_g.is_null()))
            .field("k_g_len", &self.raw.k_g_len)
            .field("privilege_level", &self.raw.privilege_level)
            .field("authentication_type", &self.raw.authentication_type)
            .field("cipher_suite_id", &self.raw.cipher_suite_id)
            .field("session_timeout_len", &self.raw.session_timeout_len)
            .field("retransmission_timeout_len", &self.raw.retransmission_timeout_len)
            .field("workaround_flags", &self.raw.workaround_flags)
            .finish()
    }
}
