#![allow(unsafe_code)]

use std::ffi::OsStr;

use libc::{c_char, c_int, c_uint, c_void};
use libloading::Library;

use crate::backend::{Backend, IpmiMonitoringIpmiConfig, RawContext};
use crate::error::{Error, Result};

type InitFn = unsafe extern "C" fn(c_uint, *mut c_int) -> c_int;
type CtxCreateFn = unsafe extern "C" fn() -> RawContext;
type CtxDestroyFn = unsafe extern "C" fn(RawContext);
type CtxIntFn = unsafe extern "C" fn(RawContext) -> c_int;
type StrErrorFn = unsafe extern "C" fn(c_int) -> *const c_char;
type CtxStrFn = unsafe extern "C" fn(RawContext) -> *const c_char;
type CtxSetStrFn = unsafe extern "C" fn(RawContext, *const c_char) -> c_int;
type ReadingsFn = unsafe extern "C" fn(
    RawContext,
    *const c_char,
    *mut IpmiMonitoringIpmiConfig,
    c_uint,
    *mut c_uint,
    c_uint,
    *const c_void,
    *mut c_void,
) -> c_int;
type CtxPtrFn = unsafe extern "C" fn(RawContext) -> *const c_void;
type CtxStrArrayFn = unsafe extern "C" fn(RawContext) -> *const *const c_char;

/// Resolved entry points. Copied out of the `Symbol`s, so they are only valid
/// while the owning [`Library`] stays loaded.
struct Functions {
    init: InitFn,
    ctx_create: CtxCreateFn,
    ctx_destroy: CtxDestroyFn,
    ctx_errnum: CtxIntFn,
    ctx_strerror: StrErrorFn,
    ctx_errormsg: CtxStrFn,
    ctx_sel_config_file: CtxSetStrFn,
    ctx_sensor_config_file: CtxSetStrFn,
    ctx_sdr_cache_directory: CtxSetStrFn,
    ctx_sdr_cache_filenames: CtxSetStrFn,
    readings_by_record_id: ReadingsFn,
    readings_by_sensor_type: ReadingsFn,
    iterator_next: CtxIntFn,
    read_record_id: CtxIntFn,
    read_sensor_number: CtxIntFn,
    read_sensor_type: CtxIntFn,
    read_sensor_name: CtxStrFn,
    read_sensor_state: CtxIntFn,
    read_sensor_units: CtxIntFn,
    read_sensor_reading_type: CtxIntFn,
    read_sensor_reading: CtxPtrFn,
    read_sensor_bitmask_type: CtxIntFn,
    read_sensor_bitmask: CtxIntFn,
    read_sensor_bitmask_strings: CtxStrArrayFn,
    read_event_reading_type_code: CtxIntFn,
}

/// # Safety
/// `T` must be the exact function pointer type of the symbol.
unsafe fn symbol<T: Copy>(library: &Library, name: &str) -> Result<T> {
    // SAFETY: caller guarantees the signature; the value is a plain fn pointer.
    let sym = unsafe { library.get::<T>(name.as_bytes())? };
    Ok(*sym)
}

impl Functions {
    /// # Safety
    /// `library` must be a build of libipmimonitoring matching `ipmi_monitoring.h`.
    unsafe fn load(library: &Library) -> Result<Self> {
        // SAFETY: the type aliases above follow ipmi_monitoring.h.
        unsafe {
            Ok(Self {
                init: symbol(library, "ipmi_monitoring_init")?,
                ctx_create: symbol(library, "ipmi_monitoring_ctx_create")?,
                ctx_destroy: symbol(library, "ipmi_monitoring_ctx_destroy")?,
                ctx_errnum: symbol(library, "ipmi_monitoring_ctx_errnum")?,
                ctx_strerror: symbol(library, "ipmi_monitoring_ctx_strerror")?,
                ctx_errormsg: symbol(library, "ipmi_monitoring_ctx_errormsg")?,
                ctx_sel_config_file: symbol(library, "ipmi_monitoring_ctx_sel_config_file")?,
                ctx_sensor_config_file: symbol(library, "ipmi_monitoring_ctx_sensor_config_file")?,
                ctx_sdr_cache_directory: symbol(
                    library,
                    "ipmi_monitoring_ctx_sdr_cache_directory",
                )?,
                ctx_sdr_cache_filenames: symbol(
                    library,
                    "ipmi_monitoring_ctx_sdr_cache_filenames",
                )?,
                readings_by_record_id: symbol(
                    library,
                    "ipmi_monitoring_sensor_readings_by_record_id",
                )?,
                readings_by_sensor_type: symbol(
                    library,
                    "ipmi_monitoring_sensor_readings_by_sensor_type",
                )?,
                iterator_next: symbol(library, "ipmi_monitoring_sensor_iterator_next")?,
                read_record_id: symbol(library, "ipmi_monitoring_sensor_read_record_id")?,
                read_sensor_number: symbol(library, "ipmi_monitoring_sensor_read_sensor_number")?,
                read_sensor_type: symbol(library, "ipmi_monitoring_sensor_read_sensor_type")?,
                read_sensor_name: symbol(library, "ipmi_monitoring_sensor_read_sensor_name")?,
                read_sensor_state: symbol(library, "ipmi_monitoring_sensor_read_sensor_state")?,
                read_sensor_units: symbol(library, "ipmi_monitoring_sensor_read_sensor_units")?,
                read_sensor_reading_type: symbol(
                    library,
                    "ipmi_monitoring_sensor_read_sensor_reading_type",
                )?,
                read_sensor_reading: symbol(library, "ipmi_monitoring_sensor_read_sensor_reading")?,
                read_sensor_bitmask_type: symbol(
                    library,
                    "ipmi_monitoring_sensor_read_sensor_bitmask_type",
                )?,
                read_sensor_bitmask: symbol(library, "ipmi_monitoring_sensor_read_sensor_bitmask")?,
                read_sensor_bitmask_strings: symbol(
                    library,
                    "ipmi_monitoring_sensor_read_sensor_bitmask_strings",
                )?,
                read_event_reading_type_code: symbol(
                    library,
                    "ipmi_monitoring_sensor_read_event_reading_type_code",
                )?,
            })
        }
    }
}

/// `libipmimonitoring` loaded at runtime.
pub struct DynamicLibrary {
    fns: Functions,
    // Must outlive `fns`.
    _library: Library,
}

impl DynamicLibrary {
    /// Names tried by [`DynamicLibrary::open_default`], in order.
    pub const DEFAULT_NAMES: &'static [&'static str] =
        &["libipmimonitoring.so", "libipmimonitoring.so.6"];

    /// Load the library from the default search path.
    pub fn open_default() -> Result<Self> {
        let mut last_error = None;
        for name in Self::DEFAULT_NAMES {
            match Self::open(name) {
                Ok(library) => return Ok(library),
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.unwrap_or_else(|| Error::invalid_argument("no library names to try")))
    }

    /// Load the library from `path` (a file name or a full path).
    pub fn open(path: impl AsRef<OsStr>) -> Result<Self> {
        let path = path.as_ref();
        // SAFETY: libipmimonitoring has no load-time constructors with
        // preconditions; the symbol types come from its public header.
        let library = unsafe { Library::new(path)? };
        let fns = unsafe { Functions::load(&library)? };

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.to_string_lossy(), "loaded libipmimonitoring");

        Ok(Self {
            fns,
            _library: library,
        })
    }
}

impl std::fmt::Debug for DynamicLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicLibrary").finish_non_exhaustive()
    }
}

// SAFETY: every method forwards to the symbol of the same name, which upholds
// the pointer contract documented in `ipmi_monitoring.h`.
unsafe impl Backend for DynamicLibrary {
    fn init(&self, flags: c_uint, errnum: &mut c_int) -> c_int {
        // SAFETY: `errnum` is a valid out pointer.
        unsafe { (self.fns.init)(flags, errnum) }
    }

    fn ctx_create(&self) -> RawContext {
        // SAFETY: no preconditions.
        unsafe { (self.fns.ctx_create)() }
    }

    unsafe fn ctx_destroy(&self, ctx: RawContext) {
        unsafe { (self.fns.ctx_destroy)(ctx) }
    }

    unsafe fn ctx_errnum(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.ctx_errnum)(ctx) }
    }

    fn ctx_strerror(&self, errnum: c_int) -> *const c_char {
        // SAFETY: returns a pointer into a static table for any errnum.
        unsafe { (self.fns.ctx_strerror)(errnum) }
    }

    unsafe fn ctx_errormsg(&self, ctx: RawContext) -> *const c_char {
        unsafe { (self.fns.ctx_errormsg)(ctx) }
    }

    unsafe fn ctx_sel_config_file(&self, ctx: RawContext, path: *const c_char) -> c_int {
        unsafe { (self.fns.ctx_sel_config_file)(ctx, path) }
    }

    unsafe fn ctx_sensor_config_file(&self, ctx: RawContext, path: *const c_char) -> c_int {
        unsafe { (self.fns.ctx_sensor_config_file)(ctx, path) }
    }

    unsafe fn ctx_sdr_cache_directory(&self, ctx: RawContext, dir: *const c_char) -> c_int {
        unsafe { (self.fns.ctx_sdr_cache_directory)(ctx, dir) }
    }

    unsafe fn ctx_sdr_cache_filenames(&self, ctx: RawContext, format: *const c_char) -> c_int {
        unsafe { (self.fns.ctx_sdr_cache_filenames)(ctx, format) }
    }

    unsafe fn sensor_readings_by_record_id(
        &self,
        ctx: RawContext,
        hostname: *const c_char,
        config: *mut IpmiMonitoringIpmiConfig,
        flags: c_uint,
        ids: *mut c_uint,
        ids_len: c_uint,
    ) -> c_int {
        unsafe {
            (self.fns.readings_by_record_id)(
                ctx,
                hostname,
                config,
                flags,
                ids,
                ids_len,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        }
    }

    unsafe fn sensor_readings_by_sensor_type(
        &self,
        ctx: RawContext,
        hostname: *const c_char,
        config: *mut IpmiMonitoringIpmiConfig,
        flags: c_uint,
        types: *mut c_uint,
        types_len: c_uint,
    ) -> c_int {
        unsafe {
            (self.fns.readings_by_sensor_type)(
                ctx,
                hostname,
                config,
                flags,
                types,
                types_len,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        }
    }

    unsafe fn sensor_iterator_next(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.iterator_next)(ctx) }
    }

    unsafe fn sensor_read_record_id(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_record_id)(ctx) }
    }

    unsafe fn sensor_read_sensor_number(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_sensor_number)(ctx) }
    }

    unsafe fn sensor_read_sensor_type(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_sensor_type)(ctx) }
    }

    unsafe fn sensor_read_sensor_name(&self, ctx: RawContext) -> *const c_char {
        unsafe { (self.fns.read_sensor_name)(ctx) }
    }

    unsafe fn sensor_read_sensor_state(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_sensor_state)(ctx) }
    }

    unsafe fn sensor_read_sensor_units(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_sensor_units)(ctx) }
    }

    unsafe fn sensor_read_sensor_reading_type(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_sensor_reading_type)(ctx) }
    }

    unsafe fn sensor_read_sensor_reading(&self, ctx: RawContext) -> *const c_void {
        unsafe { (self.fns.read_sensor_reading)(ctx) }
    }

    unsafe fn sensor_read_sensor_bitmask_type(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_sensor_bitmask_type)(ctx) }
    }

    unsafe fn sensor_read_sensor_bitmask(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_sensor_bitmask)(ctx) }
    }

    unsafe fn sensor_read_sensor_bitmask_strings(
        &self,
        ctx: RawContext,
    ) -> *const *const c_char {
        unsafe { (self.fns.read_sensor_bitmask_strings)(ctx) }
    }

    unsafe fn sensor_read_event_reading_type_code(&self, ctx: RawContext) -> c_int {
        unsafe { (self.fns.read_event_reading_type_code)(ctx) }
    }
}
