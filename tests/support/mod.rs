#![allow(dead_code)]
#![allow(unsafe_code)]

//! In-process stand-in for libipmimonitoring.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::ptr;
use std::rc::Rc;

use ipmimonitoring::backend::{Backend, IpmiMonitoringCtx, IpmiMonitoringIpmiConfig, RawContext};
use ipmimonitoring::{Context, ContextBuilder};
use libc::{c_char, c_int, c_uint, c_void};

/// Value behind the reading pointer.
#[derive(Debug, Clone, Copy)]
pub enum FakeReading {
    Absent,
    Bool(bool),
    Unsigned32(u32),
    Double(f64),
}

/// One record under the fake cursor.
pub struct FakeRecord {
    pub record_id: c_int,
    pub sensor_number: c_int,
    pub sensor_type: c_int,
    pub name: Option<CString>,
    pub state: c_int,
    pub units: c_int,
    pub reading_type: c_int,
    reading: Option<Box<[u8; 8]>>,
    pub bitmask_type: c_int,
    pub bitmask: c_int,
    bitmask_strings: Vec<CString>,
    bitmask_ptrs: Vec<*const c_char>,
    pub event_reading_type_code: c_int,
}

impl FakeRecord {
    /// A nominal temperature sensor reading `value` degrees.
    pub fn temperature(record_id: c_int, name: &str, value: f64) -> Self {
        Self::new(record_id, name)
            .sensor_type(0x01)
            .units(0x01)
            .reading(2, FakeReading::Double(value))
            .bitmask_strings(&["OK"])
    }

    pub fn new(record_id: c_int, name: &str) -> Self {
        Self {
            record_id,
            sensor_number: record_id + 100,
            sensor_type: 0x01,
            name: Some(CString::new(name).expect("name")),
            state: 0,
            units: 0,
            reading_type: 3,
            reading: None,
            bitmask_type: 0,
            bitmask: 0,
            bitmask_strings: Vec::new(),
            bitmask_ptrs: vec![ptr::null()],
            event_reading_type_code: 0x01,
        }
    }

    pub fn sensor_type(mut self, sensor_type: c_int) -> Self {
        self.sensor_type = sensor_type;
        self
    }

    pub fn units(mut self, units: c_int) -> Self {
        self.units = units;
        self
    }

    pub fn state(mut self, state: c_int) -> Self {
        self.state = state;
        self
    }

    pub fn reading(mut self, reading_type: c_int, value: FakeReading) -> Self {
        self.reading_type = reading_type;
        let mut bytes = [0u8; 8];
        self.reading = match value {
            FakeReading::Absent => None,
            FakeReading::Bool(v) => {
                bytes[0] = u8::from(v);
                Some(Box::new(bytes))
            }
            FakeReading::Unsigned32(v) => {
                bytes[..4].copy_from_slice(&v.to_ne_bytes());
                Some(Box::new(bytes))
            }
            FakeReading::Double(v) => Some(Box::new(v.to_ne_bytes())),
        };
        self
    }

    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn bitmask_strings(mut self, strings: &[&str]) -> Self {
        self.bitmask_strings = strings
            .iter()
            .map(|s| CString::new(*s).expect("bitmask string"))
            .collect();
        self.bitmask_ptrs = self.bitmask_strings.iter().map(|s| s.as_ptr()).collect();
        self.bitmask_ptrs.push(ptr::null());
        self
    }
}

/// Arguments of the last enumeration call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumerationCall {
    pub by_sensor_type: bool,
    pub hostname: Option<String>,
    pub flags: c_uint,
    pub ids: Option<Vec<u32>>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub k_g: Option<Vec<u8>>,
    pub privilege_level: c_int,
    pub authentication_type: c_int,
    pub workaround_flags: c_uint,
}

#[derive(Default)]
pub struct State {
    pub calls: Vec<&'static str>,
    pub init_flags: Option<c_uint>,
    pub init_errnum: c_int,
    pub fail_create: bool,
    pub count_override: Option<c_int>,
    pub fail_settings: bool,
    pub fail_advance_at: Option<usize>,
    pub settings: Vec<(&'static str, Option<String>)>,
    pub records: Vec<FakeRecord>,
    pub selection: Vec<usize>,
    pub cursor: usize,
    pub last_call: Option<EnumerationCall>,
    pub live_contexts: usize,
}

/// Records every call and serves `records` through the cursor API.
pub struct FakeLibrary {
    pub state: RefCell<State>,
    handle: Box<u64>,
}

impl FakeLibrary {
    pub fn new(records: Vec<FakeRecord>) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(State {
                records,
                ..State::default()
            }),
            handle: Box::new(0),
        })
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.state.borrow().calls.iter().filter(|c| **c == name).count()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn last_call(&self) -> EnumerationCall {
        self.state.borrow().last_call.clone().expect("no enumeration call")
    }

    fn log(&self, call: &'static str) {
        self.state.borrow_mut().calls.push(call);
    }

    fn current<T>(&self, call: &'static str, read: impl FnOnce(&FakeRecord) -> T) -> T {
        self.log(call);
        let state = self.state.borrow();
        let index = state.selection[state.cursor];
        read(&state.records[index])
    }

    unsafe fn enumerate(
        &self,
        by_sensor_type: bool,
        hostname: *const c_char,
        config: *mut IpmiMonitoringIpmiConfig,
        flags: c_uint,
        ids: *mut c_uint,
        ids_len: c_uint,
    ) -> c_int {
        let ids = (!ids.is_null())
            .then(|| unsafe { std::slice::from_raw_parts(ids, ids_len as usize) }.to_vec());
        let config = unsafe { &*config };
        let call = EnumerationCall {
            by_sensor_type,
            hostname: unsafe { string(hostname) },
            flags,
            ids: ids.clone(),
            username: unsafe { string(config.username) },
            password: unsafe { string(config.password) },
            k_g: (!config.k_g.is_null()).then(|| {
                unsafe { std::slice::from_raw_parts(config.k_g, config.k_g_len as usize) }.to_vec()
            }),
            privilege_level: config.privilege_level,
            authentication_type: config.authentication_type,
            workaround_flags: config.workaround_flags,
        };

        let mut state = self.state.borrow_mut();
        state.last_call = Some(call);
        let selection: Vec<usize> = state
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| match &ids {
                None => true,
                Some(ids) if by_sensor_type => ids.contains(&(record.sensor_type as u32)),
                Some(ids) => ids.contains(&(record.record_id as u32)),
            })
            .map(|(index, _)| index)
            .collect();
        state.selection = selection;
        state.cursor = 0;
        state
            .count_override
            .unwrap_or(state.selection.len() as c_int)
    }

    fn setting(&self, call: &'static str, value: *const c_char) -> c_int {
        self.log(call);
        let mut state = self.state.borrow_mut();
        state.settings.push((call, unsafe { string(value) }));
        if state.fail_settings { -1 } else { 0 }
    }
}

unsafe fn string(ptr: *const c_char) -> Option<String> {
    (!ptr.is_null()).then(|| {
        unsafe { CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned()
    })
}

// SAFETY: strings are served from `CString`s owned by the fixture state and
// replaced only when the cursor moves or a new enumeration starts.
unsafe impl Backend for FakeLibrary {
    fn init(&self, flags: c_uint, errnum: &mut c_int) -> c_int {
        self.log("init");
        let mut state = self.state.borrow_mut();
        state.init_flags = Some(flags);
        if state.init_errnum != 0 {
            *errnum = state.init_errnum;
            return -1;
        }
        0
    }

    fn ctx_create(&self) -> RawContext {
        self.log("ctx_create");
        let mut state = self.state.borrow_mut();
        if state.fail_create {
            return ptr::null_mut();
        }
        state.live_contexts += 1;
        (&*self.handle as *const u64).cast_mut().cast::<IpmiMonitoringCtx>()
    }

    unsafe fn ctx_destroy(&self, ctx: RawContext) {
        assert!(!ctx.is_null(), "destroy of a null context");
        self.log("ctx_destroy");
        self.state.borrow_mut().live_contexts -= 1;
    }

    unsafe fn ctx_errnum(&self, _ctx: RawContext) -> c_int {
        self.log("ctx_errnum");
        7
    }

    fn ctx_strerror(&self, errnum: c_int) -> *const c_char {
        self.log("ctx_strerror");
        match errnum {
            3 => c"permission denied".as_ptr(),
            9 => std::ptr::null(),
            _ => c"internal error".as_ptr(),
        }
    }

    unsafe fn ctx_errormsg(&self, _ctx: RawContext) -> *const c_char {
        self.log("ctx_errormsg");
        c"connection timeout".as_ptr()
    }

    unsafe fn ctx_sel_config_file(&self, _ctx: RawContext, path: *const c_char) -> c_int {
        self.setting("sel_config_file", path)
    }

    unsafe fn ctx_sensor_config_file(&self, _ctx: RawContext, path: *const c_char) -> c_int {
        self.setting("sensor_config_file", path)
    }

    unsafe fn ctx_sdr_cache_directory(&self, _ctx: RawContext, dir: *const c_char) -> c_int {
        self.setting("sdr_cache_directory", dir)
    }

    unsafe fn ctx_sdr_cache_filenames(&self, _ctx: RawContext, format: *const c_char) -> c_int {
        self.setting("sdr_cache_filenames", format)
    }

    unsafe fn sensor_readings_by_record_id(
        &self,
        _ctx: RawContext,
        hostname: *const c_char,
        config: *mut IpmiMonitoringIpmiConfig,
        flags: c_uint,
        ids: *mut c_uint,
        ids_len: c_uint,
    ) -> c_int {
        self.log("readings_by_record_id");
        unsafe { self.enumerate(false, hostname, config, flags, ids, ids_len) }
    }

    unsafe fn sensor_readings_by_sensor_type(
        &self,
        _ctx: RawContext,
        hostname: *const c_char,
        config: *mut IpmiMonitoringIpmiConfig,
        flags: c_uint,
        types: *mut c_uint,
        types_len: c_uint,
    ) -> c_int {
        self.log("readings_by_sensor_type");
        unsafe { self.enumerate(true, hostname, config, flags, types, types_len) }
    }

    unsafe fn sensor_iterator_next(&self, _ctx: RawContext) -> c_int {
        self.log("iterator_next");
        let mut state = self.state.borrow_mut();
        let advance = state.calls.iter().filter(|c| **c == "iterator_next").count() - 1;
        if state.fail_advance_at == Some(advance) {
            return -1;
        }
        state.cursor += 1;
        if state.cursor < state.selection.len() { 1 } else { 0 }
    }

    unsafe fn sensor_read_record_id(&self, _ctx: RawContext) -> c_int {
        self.current("record_id", |r| r.record_id)
    }

    unsafe fn sensor_read_sensor_number(&self, _ctx: RawContext) -> c_int {
        self.current("sensor_number", |r| r.sensor_number)
    }

    unsafe fn sensor_read_sensor_type(&self, _ctx: RawContext) -> c_int {
        self.current("sensor_type", |r| r.sensor_type)
    }

    unsafe fn sensor_read_sensor_name(&self, _ctx: RawContext) -> *const c_char {
        self.current("sensor_name", |r| {
            r.name.as_ref().map_or(ptr::null(), |name| name.as_ptr())
        })
    }

    unsafe fn sensor_read_sensor_state(&self, _ctx: RawContext) -> c_int {
        self.current("sensor_state", |r| r.state)
    }

    unsafe fn sensor_read_sensor_units(&self, _ctx: RawContext) -> c_int {
        self.current("sensor_units", |r| r.units)
    }

    unsafe fn sensor_read_sensor_reading_type(&self, _ctx: RawContext) -> c_int {
        self.current("sensor_reading_type", |r| r.reading_type)
    }

    unsafe fn sensor_read_sensor_reading(&self, _ctx: RawContext) -> *const c_void {
        self.current("sensor_reading", |r| {
            r.reading
                .as_ref()
                .map_or(ptr::null(), |bytes| bytes.as_ptr().cast())
        })
    }

    unsafe fn sensor_read_sensor_bitmask_type(&self, _ctx: RawContext) -> c_int {
        self.current("sensor_bitmask_type", |r| r.bitmask_type)
    }

    unsafe fn sensor_read_sensor_bitmask(&self, _ctx: RawContext) -> c_int {
        self.current("sensor_bitmask", |r| r.bitmask)
    }

    unsafe fn sensor_read_sensor_bitmask_strings(
        &self,
        _ctx: RawContext,
    ) -> *const *const c_char {
        self.current("sensor_bitmask_strings", |r| r.bitmask_ptrs.as_ptr())
    }

    unsafe fn sensor_read_event_reading_type_code(&self, _ctx: RawContext) -> c_int {
        self.current("event_reading_type_code", |r| r.event_reading_type_code)
    }
}

/// A builder wired to `library`.
pub fn builder(library: &Rc<FakeLibrary>) -> ContextBuilder {
    let backend: Rc<dyn Backend> = library.clone();
    Context::builder().backend(backend)
}

/// Open a default context on `library`.
pub fn open(library: &Rc<FakeLibrary>) -> Context {
    builder(library).build().expect("open context")
}

/// The accessor calls made for one record, in order.
pub const RECORD_ACCESSORS: [&str; 12] = [
    "record_id",
    "sensor_number",
    "sensor_type",
    "sensor_name",
    "sensor_state",
    "sensor_units",
    "sensor_reading_type",
    "sensor_reading",
    "sensor_bitmask_type",
    "sensor_bitmask",
    "sensor_bitmask_strings",
    "event_reading_type_code",
];
