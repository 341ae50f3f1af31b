#![allow(unsafe_code)]

use core::iter::FusedIterator;

use crate::backend::{Backend, RawContext};
use crate::context::Context;
use crate::decode::{decode_bitmask_strings, decode_c_string, decode_reading};
use crate::error::{Error, Result};
use crate::types::{
    SensorBitmaskType, SensorReadingType, SensorRecord, SensorState, SensorType, SensorUnits,
};

/// Records produced by one sensor enumeration.
///
/// Each call to [`Iterator::next`] decodes the record under the native cursor
/// and then moves the cursor forward, unless it was the last record. The
/// iterator holds the [`Context`] mutably, so the context cannot be closed,
/// reconfigured or asked for another enumeration while records remain.
///
/// A record that fails to decode is returned as `Err` and iteration can
/// continue with the next one. A failed cursor advance is returned as a
/// single [`Error::Read`] after which the iterator is exhausted.
#[derive(Debug)]
pub struct SensorReadings<'a> {
    context: &'a mut Context,
    remaining: usize,
    pending: Option<Error>,
}

impl<'a> SensorReadings<'a> {
    pub(crate) fn new(context: &'a mut Context, count: usize) -> Self {
        Self {
            context,
            remaining: count,
            pending: None,
        }
    }

    /// Decode every remaining record, stopping at the first error.
    pub fn collect_records(self) -> Result<Vec<SensorRecord>> {
        self.collect()
    }

    fn advance(&mut self, ctx: RawContext) {
        // SAFETY: `ctx` is live for as long as `self.context` is borrowed.
        let rc = unsafe { self.context.backend().sensor_iterator_next(ctx) };
        if rc < 0 {
            self.remaining = 0;
            self.pending = Some(Error::Read {
                message: self.context.error_message(),
            });
        } else if rc == 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                remaining = self.remaining,
                "sensor cursor ended before the reported count"
            );
            self.remaining = 0;
        }
    }
}

impl Iterator for SensorReadings<'_> {
    type Item = Result<SensorRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return self.pending.take().map(Err);
        }
        let ctx = match self.context.live() {
            Ok(ctx) => ctx,
            Err(err) => {
                self.remaining = 0;
                return Some(Err(err));
            }
        };

        // SAFETY: the cursor is positioned on a record: `remaining > 0` and
        // every previous advance succeeded.
        let record = unsafe { read_record(self.context, ctx) };
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance(ctx);
        }
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining + usize::from(self.pending.is_some());
        (len, Some(len))
    }
}

impl ExactSizeIterator for SensorReadings<'_> {}

impl FusedIterator for SensorReadings<'_> {}

/// Decode the record under the cursor.
///
/// Every accessor runs, in a fixed order, before any value is converted, so
/// the library sees the same call sequence whether or not decoding succeeds.
///
/// # Safety
/// `ctx` must be the live handle of `context` with the cursor on a record.
unsafe fn read_record(context: &Context, ctx: RawContext) -> Result<SensorRecord> {
    let backend: &dyn Backend = context.backend();
    // SAFETY: `ctx` is live and positioned; returned pointers stay valid
    // until the next advance, which happens after decoding.
    let (
        record_id,
        sensor_number,
        sensor_type,
        name,
        state,
        units,
        reading_type,
        reading,
        bitmask_type,
        bitmask,
        bitmask_strings,
        event_reading_type_code,
    ) = unsafe {
        (
            backend.sensor_read_record_id(ctx),
            backend.sensor_read_sensor_number(ctx),
            backend.sensor_read_sensor_type(ctx),
            backend.sensor_read_sensor_name(ctx),
            backend.sensor_read_sensor_state(ctx),
            backend.sensor_read_sensor_units(ctx),
            backend.sensor_read_sensor_reading_type(ctx),
            backend.sensor_read_sensor_reading(ctx),
            backend.sensor_read_sensor_bitmask_type(ctx),
            backend.sensor_read_sensor_bitmask(ctx),
            backend.sensor_read_sensor_bitmask_strings(ctx),
            backend.sensor_read_event_reading_type_code(ctx),
        )
    };

    // SAFETY: the `Backend` contract makes every returned pointer null or
    // valid for its type until the next advance.
    let name = unsafe { decode_c_string(name) }?.ok_or_else(|| Error::Read {
        message: context.error_message(),
    })?;

    Ok(SensorRecord {
        record_id,
        event_reading_type_code,
        sensor_number,
        name,
        sensor_type: SensorType::from_raw(sensor_type)?,
        state: SensorState::from_raw(state)?,
        reading_type: SensorReadingType::from_raw(reading_type)?,
        reading: unsafe { decode_reading(reading_type, reading) },
        units: SensorUnits::from_raw(units)?,
        bitmask_type: SensorBitmaskType::from_raw(bitmask_type)?,
        bitmask,
        bitmask_strings: unsafe { decode_bitmask_strings(bitmask_strings) }?,
    })
}
