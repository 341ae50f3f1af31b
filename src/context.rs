#![allow(unsafe_code)]

use core::fmt;
use std::ffi::{CStr, CString};
use std::path::PathBuf;
use std::ptr;
use std::rc::Rc;
use std::time::Instant;

use libc::{c_char, c_int, c_uint};
use zeroize::Zeroizing;

use crate::backend::{Backend, DynamicLibrary, RawContext};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::flags::{InitFlags, SensorReadingFlags};
use crate::sensor::SensorReadings;

/// An open `libipmimonitoring` context.
///
/// Owns one native `ipmi_monitoring_ctx_t`, the [`Config`] passed to every
/// read and the target hostname. The native context is destroyed exactly
/// once, by [`Context::close`] or on drop.
///
/// Not `Send`: the library keeps per-context state that must stay on one
/// thread. Open one context per thread instead.
pub struct Context {
    backend: Rc<dyn Backend>,
    ctx: RawContext,
    config: Config,
    hostname: Option<CString>,
}

#[derive(Clone, Copy)]
enum Filter {
    RecordId,
    SensorType,
}

impl Context {
    /// Create a [`ContextBuilder`].
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Initialize the library and create a native context on `backend`.
    ///
    /// `ipmi_monitoring_init` runs on every call; the library ignores repeated
    /// initialization.
    pub fn open(backend: Rc<dyn Backend>, config: Config, init_flags: InitFlags) -> Result<Self> {
        let mut errnum: c_int = 0;
        if backend.init(init_flags.bits(), &mut errnum) != 0 {
            // SAFETY: `ctx_strerror` returns null or a static string.
            let message = unsafe { static_message(backend.ctx_strerror(errnum)) };
            return Err(Error::Init { message });
        }

        let ctx = backend.ctx_create();
        if ctx.is_null() {
            return Err(Error::ContextCreation);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(init_flags = %init_flags, "opened ipmi monitoring context");

        Ok(Self {
            backend,
            ctx,
            config,
            hostname: None,
        })
    }

    /// Target BMC, `None` for in-band access.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref().and_then(|h| h.to_str().ok())
    }

    /// Set or clear the target BMC.
    pub fn set_hostname(&mut self, hostname: Option<&str>) -> Result<()> {
        self.hostname = hostname.map(|h| to_cstring("hostname", h)).transpose()?;
        Ok(())
    }

    /// Connection settings used by the next read.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the connection settings.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// True once [`Context::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.ctx.is_null()
    }

    /// Set the SEL configuration file. `None` restores the library default.
    pub fn set_sel_config_file(&mut self, path: Option<&str>) -> Result<()> {
        self.apply_setting("sel config file", path, |backend, ctx, value| unsafe {
            backend.ctx_sel_config_file(ctx, value)
        })
    }

    /// Set the sensor configuration file. `None` restores the library default.
    pub fn set_sensor_config_file(&mut self, path: Option<&str>) -> Result<()> {
        self.apply_setting("sensor config file", path, |backend, ctx, value| unsafe {
            backend.ctx_sensor_config_file(ctx, value)
        })
    }

    /// Set the SDR cache directory. `None` restores the library default.
    pub fn set_sdr_cache_directory(&mut self, dir: Option<&str>) -> Result<()> {
        self.apply_setting("sdr cache directory", dir, |backend, ctx, value| unsafe {
            backend.ctx_sdr_cache_directory(ctx, value)
        })
    }

    /// Set the SDR cache file name format (`%L` local host, `%H` remote host).
    pub fn set_sdr_cache_filenames(&mut self, format: Option<&str>) -> Result<()> {
        self.apply_setting("sdr cache filenames", format, |backend, ctx, value| unsafe {
            backend.ctx_sdr_cache_filenames(ctx, value)
        })
    }

    /// Read every sensor.
    pub fn read_sensors(&mut self, flags: SensorReadingFlags) -> Result<SensorReadings<'_>> {
        self.enumerate("read_sensors", Filter::RecordId, &[], flags)
    }

    /// Read the sensors with the given SDR record IDs.
    pub fn read_sensors_by_record_id(
        &mut self,
        record_ids: &[u32],
        flags: SensorReadingFlags,
    ) -> Result<SensorReadings<'_>> {
        self.enumerate("read_sensors_by_record_id", Filter::RecordId, record_ids, flags)
    }

    /// Read the sensors of the given sensor types (raw `SensorType` codes).
    pub fn read_sensors_by_sensor_type(
        &mut self,
        sensor_types: &[u32],
        flags: SensorReadingFlags,
    ) -> Result<SensorReadings<'_>> {
        self.enumerate(
            "read_sensors_by_sensor_type",
            Filter::SensorType,
            sensor_types,
            flags,
        )
    }

    /// Destroy the native context. Later calls do nothing.
    pub fn close(&mut self) {
        let ctx = std::mem::replace(&mut self.ctx, ptr::null_mut());
        if ctx.is_null() {
            return;
        }
        // SAFETY: `ctx` came from `ctx_create` and was live until the swap.
        unsafe { self.backend.ctx_destroy(ctx) };

        #[cfg(feature = "tracing")]
        tracing::debug!("closed ipmi monitoring context");
    }

    /// `ipmi_monitoring_ctx_errnum` of the last failed call.
    pub fn errnum(&self) -> Result<i32> {
        let ctx = self.live()?;
        // SAFETY: `ctx` is live.
        Ok(unsafe { self.backend.ctx_errnum(ctx) })
    }

    pub(crate) fn backend(&self) -> &dyn Backend {
        &*self.backend
    }

    pub(crate) fn live(&self) -> Result<RawContext> {
        if self.ctx.is_null() {
            return Err(Error::Closed);
        }
        Ok(self.ctx)
    }

    /// `ipmi_monitoring_ctx_errormsg`, lossily decoded.
    pub(crate) fn error_message(&self) -> String {
        if self.ctx.is_null() {
            return Error::Closed.to_string();
        }
        // SAFETY: `ctx` is live; the message lives as long as the context.
        unsafe { static_message(self.backend.ctx_errormsg(self.ctx)) }
    }

    fn apply_setting<F>(&mut self, operation: &'static str, value: Option<&str>, call: F) -> Result<()>
    where
        F: FnOnce(&dyn Backend, RawContext, *const c_char) -> c_int,
    {
        let ctx = self.live()?;
        let value = value.map(|v| to_cstring(operation, v)).transpose()?;
        let value_ptr = value.as_ref().map_or(ptr::null(), |v| v.as_ptr());

        if call(&*self.backend, ctx, value_ptr) != 0 {
            return Err(Error::Configuration {
                operation,
                message: self.error_message(),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(operation, value = ?value, "configured ipmi monitoring context");

        Ok(())
    }

    fn enumerate(
        &mut self,
        operation: &'static str,
        filter: Filter,
        ids: &[u32],
        flags: SensorReadingFlags,
    ) -> Result<SensorReadings<'_>> {
        let start = Instant::now();
        let result = self.start_enumeration(filter, ids, flags);
        let elapsed = start.elapsed();
        match &result {
            Ok(count) => crate::observe::record_ok(operation, elapsed, *count),
            Err(err) => crate::observe::record_err(operation, elapsed, err),
        }
        Ok(SensorReadings::new(self, result?))
    }

    fn start_enumeration(
        &mut self,
        filter: Filter,
        ids: &[u32],
        flags: SensorReadingFlags,
    ) -> Result<usize> {
        let ctx = self.live()?;
        let ids_len = c_uint::try_from(ids.len())
            .map_err(|_| Error::invalid_argument("too many sensor filter ids"))?;
        let mut ids: Vec<c_uint> = ids.to_vec();
        let ids_ptr = if ids.is_empty() {
            ptr::null_mut()
        } else {
            ids.as_mut_ptr()
        };
        let hostname = self.hostname.as_ref().map_or(ptr::null(), |h| h.as_ptr());
        let config = self.config.as_raw_mut();

        // SAFETY: `ctx` is live; `hostname`, `config` and `ids` outlive the
        // call and the config buffers are owned by `self.config`.
        let count = unsafe {
            match filter {
                Filter::RecordId => self.backend.sensor_readings_by_record_id(
                    ctx,
                    hostname,
                    config,
                    flags.bits(),
                    ids_ptr,
                    ids_len,
                ),
                Filter::SensorType => self.backend.sensor_readings_by_sensor_type(
                    ctx,
                    hostname,
                    config,
                    flags.bits(),
                    ids_ptr,
                    ids_len,
                ),
            }
        };

        // Only a negative count is an error; the cast cannot lose data.
        if count < 0 {
            return Err(Error::Read {
                message: self.error_message(),
            });
        }
        Ok(count as usize)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("hostname", &self.hostname())
            .field("closed", &self.is_closed())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Context`].
pub struct ContextBuilder {
    hostname: Option<String>,
    username: Option<String>,
    password: Option<Zeroizing<String>>,
    config: Option<Config>,
    init_flags: InitFlags,
    sdr_cache_directory: Option<String>,
    sdr_cache_filenames: Option<String>,
    sensor_config_file: Option<String>,
    sel_config_file: Option<String>,
    library: Option<PathBuf>,
    backend: Option<Rc<dyn Backend>>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// Create a new builder for in-band access with default settings.
    pub fn new() -> Self {
        Self {
            hostname: None,
            username: None,
            password: None,
            config: None,
            init_flags: InitFlags::empty(),
            sdr_cache_directory: None,
            sdr_cache_filenames: None,
            sensor_config_file: None,
            sel_config_file: None,
            library: None,
            backend: None,
        }
    }

    /// Read from a remote BMC instead of the local one.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the username. Overrides the username of [`Self::config`].
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password. Overrides the password of [`Self::config`].
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Use `config` instead of [`Config::default`].
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Flags for `ipmi_monitoring_init`.
    pub fn init_flags(mut self, flags: InitFlags) -> Self {
        self.init_flags = flags;
        self
    }

    /// SDR cache directory.
    pub fn sdr_cache_directory(mut self, dir: impl Into<String>) -> Self {
        self.sdr_cache_directory = Some(dir.into());
        self
    }

    /// SDR cache file name format.
    pub fn sdr_cache_filenames(mut self, format: impl Into<String>) -> Self {
        self.sdr_cache_filenames = Some(format.into());
        self
    }

    /// Sensor configuration file.
    pub fn sensor_config_file(mut self, path: impl Into<String>) -> Self {
        self.sensor_config_file = Some(path.into());
        self
    }

    /// SEL configuration file.
    pub fn sel_config_file(mut self, path: impl Into<String>) -> Self {
        self.sel_config_file = Some(path.into());
        self
    }

    /// Load `libipmimonitoring` from `path` instead of the default names.
    pub fn library(mut self, path: impl Into<PathBuf>) -> Self {
        self.library = Some(path.into());
        self
    }

    /// Use `backend` instead of loading the shared library.
    pub fn backend(mut self, backend: Rc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Load the library, initialize it and open the [`Context`].
    pub fn build(self) -> Result<Context> {
        let backend: Rc<dyn Backend> = match (self.backend, self.library) {
            (Some(backend), _) => backend,
            (None, Some(path)) => Rc::new(DynamicLibrary::open(path)?),
            (None, None) => Rc::new(DynamicLibrary::open_default()?),
        };

        let mut config = self.config.unwrap_or_default();
        if let Some(username) = self.username.as_deref() {
            config.set_username(Some(username))?;
        }
        if let Some(password) = self.password.as_deref() {
            config.set_password(Some(password.as_str()))?;
        }

        // Dropping `context` on any error below destroys the native context.
        let mut context = Context::open(backend, config, self.init_flags)?;
        context.set_hostname(self.hostname.as_deref())?;
        if let Some(dir) = self.sdr_cache_directory.as_deref() {
            context.set_sdr_cache_directory(Some(dir))?;
        }
        if let Some(format) = self.sdr_cache_filenames.as_deref() {
            context.set_sdr_cache_filenames(Some(format))?;
        }
        if let Some(path) = self.sensor_config_file.as_deref() {
            context.set_sensor_config_file(Some(path))?;
        }
        if let Some(path) = self.sel_config_file.as_deref() {
            context.set_sel_config_file(Some(path))?;
        }
        Ok(context)
    }
}

impl fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<secret>"))
            .field("config", &self.config)
            .field("init_flags", &self.init_flags)
            .field("sdr_cache_directory", &self.sdr_cache_directory)
            .field("sdr_cache_filenames", &self.sdr_cache_filenames)
            .field("sensor_config_file", &self.sensor_config_file)
            .field("sel_config_file", &self.sel_config_file)
            .field("library", &self.library)
            .field("backend", &self.backend.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

fn to_cstring(operation: &'static str, value: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| Error::invalid_argument(format!("{operation} must not contain NUL bytes")))
}

/// Lossily decode a message returned by the library.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn static_message(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return "unknown error".to_owned();
    }
    // SAFETY: guaranteed by the caller.
    unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}
