mod support;

use ipmimonitoring::{
    Error, SensorBitmaskType, SensorReading, SensorReadingFlags, SensorReadingType, SensorState,
    SensorType, SensorUnits,
};

use support::{FakeLibrary, FakeReading, FakeRecord, RECORD_ACCESSORS};

fn rack() -> Vec<FakeRecord> {
    vec![
        FakeRecord::temperature(1, "Inlet Temp", 21.0),
        FakeRecord::temperature(5, "CPU Temp", 42.5),
        FakeRecord::new(7, "Fan 1")
            .sensor_type(0x04)
            .units(0x12)
            .reading(1, FakeReading::Unsigned32(3000)),
        FakeRecord::new(9, "PS1 Status")
            .sensor_type(0x08)
            .state(1)
            .reading(0, FakeReading::Bool(true))
            .bitmask_strings(&["Presence detected", "Power Supply Failure detected"]),
    ]
}

#[test]
fn record_ids_yield_exactly_the_requested_records() {
    let library = FakeLibrary::new(rack());
    let mut context = support::open(&library);
    library.clear_calls();

    let records = context
        .read_sensors_by_record_id(&[5, 9], SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect_records()
        .expect("records");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record_id, 5);
    assert_eq!(records[0].name, "CPU Temp");
    assert_eq!(records[0].reading, Some(SensorReading::Double(42.5)));
    assert_eq!(records[1].record_id, 9);
    assert_eq!(records[1].state, SensorState::Warning);
    assert_eq!(records[1].reading, Some(SensorReading::Bool(true)));
    assert_eq!(
        records[1].bitmask_strings,
        vec!["Presence detected", "Power Supply Failure detected"]
    );

    assert_eq!(library.count("readings_by_record_id"), 1);
    assert_eq!(library.count("iterator_next"), 1);
    let call = library.last_call();
    assert_eq!(call.ids, Some(vec![5, 9]));
    assert_eq!(call.flags, SensorReadingFlags::DEFAULT.bits());
    assert!(!call.by_sensor_type);
}

#[test]
fn each_record_is_decoded_before_the_cursor_moves() {
    let library = FakeLibrary::new(rack());
    let mut context = support::open(&library);
    library.clear_calls();

    let records = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect_records()
        .expect("records");
    assert_eq!(records.len(), 4);

    let mut expected = vec!["readings_by_record_id"];
    for index in 0..4 {
        expected.extend(RECORD_ACCESSORS);
        if index < 3 {
            expected.push("iterator_next");
        }
    }
    assert_eq!(library.calls(), expected);
}

#[test]
fn read_all_passes_a_null_id_list() {
    let library = FakeLibrary::new(rack());
    let mut context = support::open(&library);

    let flags = SensorReadingFlags::DEFAULT | SensorReadingFlags::ENTITY_SENSOR_NAMES;
    let readings = context.read_sensors(flags).expect("read");
    assert_eq!(readings.len(), 4);
    drop(readings);

    let call = library.last_call();
    assert_eq!(call.ids, None);
    assert_eq!(call.hostname, None);
    assert_eq!(call.flags, 0x0102);
}

#[test]
fn sensor_type_filter_uses_its_own_call() {
    let library = FakeLibrary::new(rack());
    let mut context = support::open(&library);

    let records = context
        .read_sensors_by_sensor_type(&[SensorType::Temperature.as_raw() as u32], SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect_records()
        .expect("records");

    assert_eq!(library.count("readings_by_sensor_type"), 1);
    assert!(library.last_call().by_sensor_type);
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Inlet Temp", "CPU Temp"]);
    assert!(records.iter().all(|r| r.units == SensorUnits::Celsius));
}

#[test]
fn zero_records_makes_no_cursor_calls() {
    let library = FakeLibrary::new(Vec::new());
    let mut context = support::open(&library);
    library.clear_calls();

    let mut readings = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect("read");
    assert_eq!(readings.len(), 0);
    assert!(readings.next().is_none());
    assert!(readings.next().is_none());
    drop(readings);

    assert_eq!(library.calls(), vec!["readings_by_record_id"]);
}

#[test]
fn negative_count_is_a_read_error() {
    let library = FakeLibrary::new(rack());
    library.state.borrow_mut().count_override = Some(-1);
    let mut context = support::open(&library);

    let err = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect_err("expected read failure");
    match err {
        Error::Read { message } => assert_eq!(message, "connection timeout"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(library.count("record_id"), 0);

    // The context stays usable after a failed read.
    library.state.borrow_mut().count_override = None;
    assert_eq!(
        context
            .read_sensors(SensorReadingFlags::DEFAULT)
            .expect("read")
            .count(),
        4
    );
}

#[test]
fn unhandled_reading_type_yields_placeholder() {
    let library = FakeLibrary::new(vec![
        FakeRecord::new(3, "Chassis Intrusion")
            .sensor_type(0x05)
            .reading(3, FakeReading::Unsigned32(0)),
    ]);
    let mut context = support::open(&library);

    let records = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect_records()
        .expect("records");
    assert_eq!(records[0].reading_type, SensorReadingType::Unknown);
    assert_eq!(records[0].reading, Some(SensorReading::Unrecognized(3)));
}

#[test]
fn null_reading_is_absent() {
    let library = FakeLibrary::new(vec![
        FakeRecord::new(4, "Drive 0").reading(2, FakeReading::Absent),
    ]);
    let mut context = support::open(&library);

    let records = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect_records()
        .expect("records");
    assert_eq!(records[0].reading_type, SensorReadingType::Double);
    assert_eq!(records[0].reading, None);
    assert_eq!(records[0].bitmask_type, SensorBitmaskType::Threshold);
    assert!(records[0].bitmask_strings.is_empty());
}

#[test]
fn failed_record_still_advances_the_cursor() {
    let library = FakeLibrary::new(vec![
        FakeRecord::temperature(1, "Inlet Temp", 21.0),
        FakeRecord::new(2, "Bogus").state(42),
        FakeRecord::new(3, "Nameless").without_name(),
        FakeRecord::temperature(4, "Exhaust Temp", 35.0),
    ]);
    let mut context = support::open(&library);

    let results: Vec<_> = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect();
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(Error::UnknownEnumValue {
            kind: "sensor state",
            raw: 42
        })
    ));
    assert!(matches!(results[2], Err(Error::Read { .. })));
    assert_eq!(
        results[3].as_ref().expect("last record").name,
        "Exhaust Temp"
    );
    assert_eq!(library.count("iterator_next"), 3);
}

#[test]
fn collect_records_stops_at_the_first_error() {
    let library = FakeLibrary::new(vec![
        FakeRecord::temperature(1, "Inlet Temp", 21.0),
        FakeRecord::new(2, "Bogus").sensor_type(0x7F),
    ]);
    let mut context = support::open(&library);

    let err = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect_records()
        .expect_err("expected decode failure");
    assert!(matches!(
        err,
        Error::UnknownEnumValue {
            kind: "sensor type",
            raw: 0x7F
        }
    ));
}

#[test]
fn failed_advance_ends_iteration_with_one_error() {
    let library = FakeLibrary::new(rack());
    library.state.borrow_mut().fail_advance_at = Some(1);
    let mut context = support::open(&library);

    let mut readings = context
        .read_sensors(SensorReadingFlags::DEFAULT)
        .expect("read");
    assert_eq!(readings.next().expect("first").expect("record").record_id, 1);
    assert_eq!(readings.next().expect("second").expect("record").record_id, 5);
    assert_eq!(readings.len(), 1);
    assert!(matches!(readings.next(), Some(Err(Error::Read { .. }))));
    assert!(readings.next().is_none());
    assert!(readings.next().is_none());
    drop(readings);

    assert_eq!(library.count("iterator_next"), 2);
}

#[test]
fn partially_consumed_iterator_can_be_dropped() {
    let library = FakeLibrary::new(rack());
    let mut context = support::open(&library);

    {
        let mut readings = context
            .read_sensors(SensorReadingFlags::DEFAULT)
            .expect("read");
        assert_eq!(readings.len(), 4);
        readings.next().expect("first").expect("record");
        assert_eq!(readings.len(), 3);
    }
    assert_eq!(library.count("iterator_next"), 1);

    let records = context
        .read_sensors_by_record_id(&[7], SensorReadingFlags::DEFAULT)
        .expect("read")
        .collect_records()
        .expect("records");
    assert_eq!(records[0].reading, Some(SensorReading::Unsigned32(3000)));
    assert_eq!(records[0].units, SensorUnits::Rpm);
    assert_eq!(records[0].sensor_type, SensorType::Fan);
}
