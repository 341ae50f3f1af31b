//! The native `libipmimonitoring` ABI.
//!
//! [`Backend`] is the seam between the safe API and the C library. The
//! production implementation ([`DynamicLibrary`]) resolves the symbols with
//! `libloading`; tests substitute an in-process fixture.

#![allow(unsafe_code)]

use libc::{c_char, c_int, c_uchar, c_uint, c_void};

pub(crate) mod dynamic;

pub use dynamic::DynamicLibrary;

/// Opaque `struct ipmi_monitoring_ctx`.
#[repr(C)]
pub struct IpmiMonitoringCtx {
    _private: [u8; 0],
}

/// `ipmi_monitoring_ctx_t`.
pub type RawContext = *mut IpmiMonitoringCtx;

/// `struct ipmi_monitoring_ipmi_config`, field for field.
///
/// Pointer fields never own memory: [`crate::Config`] keeps the buffers alive.
#[repr(C)]
#[derive(Debug)]
pub struct IpmiMonitoringIpmiConfig {
    /// Driver type, `< 0` probes.
    pub driver_type: c_int,
    /// Non-zero disables probing.
    pub disable_auto_probe: c_int,
    /// Driver address (used when not probing).
    pub driver_address: c_uint,
    /// Register spacing (used when not probing).
    pub register_spacing: c_uint,
    /// Driver device path (used when not probing).
    pub driver_device: *mut c_char,
    /// LAN protocol version.
    pub protocol_version: c_int,
    /// Out-of-band username.
    pub username: *mut c_char,
    /// Out-of-band password.
    pub password: *mut c_char,
    /// BMC key, `k_g_len` bytes, not NUL-terminated.
    pub k_g: *mut c_uchar,
    /// Length of `k_g`.
    pub k_g_len: c_uint,
    /// Requested privilege level.
    pub privilege_level: c_int,
    /// IPMI 1.5 authentication type.
    pub authentication_type: c_int,
    /// IPMI 2.0 cipher suite.
    pub cipher_suite_id: c_int,
    /// Session timeout in milliseconds, `0` for the library default.
    pub session_timeout_len: c_int,
    /// Retransmission timeout in milliseconds, `0` for the library default.
    pub retransmission_timeout_len: c_int,
    /// Bitmask of BMC workarounds.
    pub workaround_flags: c_uint,
}

/// The functions of `ipmi_monitoring.h` this crate calls.
///
/// Methods mirror the C signatures one to one, except that the callback and
/// callback-data arguments of the enumeration calls are always null and are
/// therefore omitted.
///
/// # Safety
///
/// Callers must pass every method taking a [`RawContext`] a handle returned
/// by [`Backend::ctx_create`] that has not been passed to
/// [`Backend::ctx_destroy`].
///
/// Implementors promise that the pointers they return can be dereferenced:
///
/// * strings from `ctx_strerror` are null or NUL-terminated and static;
/// * strings from `ctx_errormsg` and the cursor accessors are null or
///   NUL-terminated, and stay valid until the next call to
///   [`Backend::sensor_iterator_next`], the next enumeration call or the
///   destruction of the context;
/// * the reading pointer is null or points to a value of the type named by
///   the reading type code (one byte, a `u32` or an `f64`);
/// * the bitmask string array is null or terminated by a null entry.
///
/// Implementations must therefore be declared `unsafe impl`:
///
/// ```compile_fail,E0200
/// use ipmimonitoring::backend::Backend;
///
/// struct Unchecked;
///
/// impl Backend for Unchecked {}
/// ```
pub unsafe trait Backend {
    /// `ipmi_monitoring_init`.
    fn init(&self, flags: c_uint, errnum: &mut c_int) -> c_int;

    /// `ipmi_monitoring_ctx_create`. May return null.
    fn ctx_create(&self) -> RawContext;

    /// `ipmi_monitoring_ctx_destroy`.
    ///
    /// # Safety
    /// `ctx` must be live and is dangling afterwards.
    unsafe fn ctx_destroy(&self, ctx: RawContext);

    /// `ipmi_monitoring_ctx_errnum`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn ctx_errnum(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_ctx_strerror`. Returns a static string.
    fn ctx_strerror(&self, errnum: c_int) -> *const c_char;

    /// `ipmi_monitoring_ctx_errormsg`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn ctx_errormsg(&self, ctx: RawContext) -> *const c_char;

    /// `ipmi_monitoring_ctx_sel_config_file`.
    ///
    /// # Safety
    /// `ctx` must be live, `path` NUL-terminated or null.
    unsafe fn ctx_sel_config_file(&self, ctx: RawContext, path: *const c_char) -> c_int;

    /// `ipmi_monitoring_ctx_sensor_config_file`.
    ///
    /// # Safety
    /// `ctx` must be live, `path` NUL-terminated or null.
    unsafe fn ctx_sensor_config_file(&self, ctx: RawContext, path: *const c_char) -> c_int;

    /// `ipmi_monitoring_ctx_sdr_cache_directory`.
    ///
    /// # Safety
    /// `ctx` must be live, `dir` NUL-terminated or null.
    unsafe fn ctx_sdr_cache_directory(&self, ctx: RawContext, dir: *const c_char) -> c_int;

    /// `ipmi_monitoring_ctx_sdr_cache_filenames`.
    ///
    /// # Safety
    /// `ctx` must be live, `format` NUL-terminated or null.
    unsafe fn ctx_sdr_cache_filenames(&self, ctx: RawContext, format: *const c_char) -> c_int;

    /// `ipmi_monitoring_sensor_readings_by_record_id`. Returns the number of
    /// records and positions the cursor on the first, or a negative value.
    ///
    /// # Safety
    /// `ctx` must be live; `hostname` NUL-terminated or null; `config` valid
    /// for the duration of the call; `ids` valid for `ids_len` elements.
    unsafe fn sensor_readings_by_record_id(
        &self,
        ctx: RawContext,
        hostname: *const c_char,
        config: *mut IpmiMonitoringIpmiConfig,
        flags: c_uint,
        ids: *mut c_uint,
        ids_len: c_uint,
    ) -> c_int;

    /// `ipmi_monitoring_sensor_readings_by_sensor_type`. Same contract as
    /// [`Backend::sensor_readings_by_record_id`].
    ///
    /// # Safety
    /// As for [`Backend::sensor_readings_by_record_id`].
    unsafe fn sensor_readings_by_sensor_type(
        &self,
        ctx: RawContext,
        hostname: *const c_char,
        config: *mut IpmiMonitoringIpmiConfig,
        flags: c_uint,
        types: *mut c_uint,
        types_len: c_uint,
    ) -> c_int;

    /// `ipmi_monitoring_sensor_iterator_next`. `1` more records, `0` end,
    /// negative on error.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_iterator_next(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_record_id`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_record_id(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_number`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_number(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_type`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_type(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_name`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_name(&self, ctx: RawContext) -> *const c_char;

    /// `ipmi_monitoring_sensor_read_sensor_state`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_state(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_units`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_units(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_reading_type`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_reading_type(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_reading`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_reading(&self, ctx: RawContext) -> *const c_void;

    /// `ipmi_monitoring_sensor_read_sensor_bitmask_type`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_bitmask_type(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_bitmask`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_bitmask(&self, ctx: RawContext) -> c_int;

    /// `ipmi_monitoring_sensor_read_sensor_bitmask_strings`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_sensor_bitmask_strings(&self, ctx: RawContext)
    -> *const *const c_char;

    /// `ipmi_monitoring_sensor_read_event_reading_type_code`.
    ///
    /// # Safety
    /// `ctx` must be live.
    unsafe fn sensor_read_event_reading_type_code(&self, ctx: RawContext) -> c_int;
}
