use super::*;

/// Split a generated statement into its insert column list and select expressions.
fn parts(sql: &str) -> (Vec<String>, String) {
    let open = sql.find(" (").unwrap();
    let close = sql.find(") SELECT ").unwrap();
    let cols = sql[open + 2..close]
        .split(',')
        .map(str::to_string)
        .collect();
    let from = sql.rfind(" FROM ").unwrap();
    let selects = sql[close + ") SELECT ".len()..from].to_string();
    (cols, selects)
}

#[test]
fn test_trip_v0_2_exact() {
    let sql = StatementBuilder::new(EntityKind::Trip, "stage_trips")
        .version("0.2.1")
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"trips\" (provider_id,provider_name,device_id,vehicle_id,vehicle_type,\
         propulsion_type,trip_id,trip_duration,trip_distance,route,accuracy,\
         parking_verification_url,standard_cost,actual_cost,start_time,end_time) \
         SELECT cast(provider_id as uuid),provider_name,cast(device_id as uuid),vehicle_id,\
         cast(vehicle_type as vehicle_types),cast(propulsion_type as propulsion_types[]),\
         cast(trip_id as uuid),trip_duration,trip_distance,cast(route as jsonb),accuracy,\
         parking_verification_url,standard_cost,actual_cost,\
         to_timestamp(start_time) at time zone 'UTC',to_timestamp(end_time) at time zone 'UTC' \
         FROM \"stage_trips\" ON CONFLICT DO NOTHING ;"
    );
}

#[test]
fn test_trip_v0_4_timestamps_in_millis() {
    let sql = StatementBuilder::new(EntityKind::Trip, "stage_trips")
        .version("0.4.0")
        .build()
        .unwrap();
    let (cols, selects) = parts(&sql);
    assert_eq!(
        cols[cols.len() - 3..],
        ["start_time", "end_time", "publication_time"]
    );
    assert!(selects.contains(
        "to_timestamp(cast(start_time as double precision) / 1000.0) at time zone 'UTC'"
    ));
    assert!(selects.ends_with(
        "to_timestamp(cast(publication_time as double precision) / 1000.0) at time zone 'UTC'"
    ));
}

#[test]
fn test_status_change_v0_2() {
    let sql = StatementBuilder::new(EntityKind::StatusChange, "stage_sc")
        .version("0.2.0")
        .build()
        .unwrap();
    assert!(sql.starts_with("INSERT INTO \"status_changes\" ("));
    assert!(sql.contains(",event_time,associated_trips)"));
    assert!(sql.contains("cast(associated_trips as uuid[])"));
    assert!(sql.contains("to_timestamp(event_time) at time zone 'UTC'"));
    assert!(!sql.contains("publication_time"));
}

#[test]
fn test_status_change_v0_3() {
    let sql = StatementBuilder::new(EntityKind::StatusChange, "stage_sc")
        .version("0.3.0")
        .build()
        .unwrap();
    assert!(sql.contains(",event_time,publication_time,associated_trip)"));
    assert!(sql.contains("cast(associated_trip as uuid)"));
    assert!(!sql.contains("associated_trips"));
}

#[test]
fn test_default_version_is_lowest_release() {
    let implicit = StatementBuilder::new(EntityKind::StatusChange, "stage").build().unwrap();
    let explicit = StatementBuilder::new(EntityKind::StatusChange, "stage")
        .version(Version::mds_lower())
        .build()
        .unwrap();
    assert_eq!(implicit, explicit);
}

#[test]
fn test_column_counts_match_for_every_release() {
    for &version in Version::mds() {
        for entity in [EntityKind::StatusChange, EntityKind::Trip] {
            let builder = StatementBuilder::new(entity, "stage").version(version);
            let columns = builder.columns().unwrap();
            let sql = builder.build().unwrap();
            let (cols, selects) = parts(&sql);
            let selects: Vec<&str> = selects.split(',').collect();

            assert_eq!(cols.len(), selects.len(), "{entity} {version}");
            assert_eq!(cols.len(), columns.len(), "{entity} {version}");
            for ((name, select), col) in cols.iter().zip(&selects).zip(&columns) {
                assert_eq!(name, col.name);
                assert_eq!(*select, col.select);
            }
        }
    }
}

#[test]
fn test_unsupported_version_fails() {
    for raw in ["0.1.0", "0.4.2", "1.0.0"] {
        let err = StatementBuilder::new(EntityKind::Trip, "stage")
            .version(raw)
            .build()
            .unwrap_err();
        assert!(err.is_unsupported_version());
        assert_eq!(err.version(), Some(Version::parse(raw).unwrap()));
    }
}

#[test]
fn test_unparseable_version_fails() {
    let err = StatementBuilder::new(EntityKind::Trip, "stage")
        .version("latest")
        .build()
        .unwrap_err();
    assert_eq!(err, SqlGenError::InvalidVersion("latest".to_string()));
}

#[test]
fn test_later_valid_version_clears_parse_error() {
    let sql = StatementBuilder::new(EntityKind::Trip, "stage")
        .version("latest")
        .version("0.3.1")
        .build();
    assert!(sql.is_ok());
}

#[test]
fn test_dest_override_and_quoting() {
    let sql = StatementBuilder::new(EntityKind::Trip, "stage_trips")
        .dest("trips_archive")
        .build()
        .unwrap();
    assert!(sql.starts_with("INSERT INTO \"trips_archive\" ("));
    assert!(sql.contains(" FROM \"stage_trips\" ON CONFLICT"));
}

#[test]
fn test_table_names_are_not_escaped() {
    let sql = StatementBuilder::new(EntityKind::Trip, "stage\".\"trips")
        .dest("public\".\"trips")
        .version("0.2.1")
        .build()
        .unwrap();
    assert!(sql.starts_with("INSERT INTO \"public\".\"trips\" (provider_id,"));
    assert!(sql.contains(" FROM \"stage\".\"trips\" ON CONFLICT DO NOTHING ;"));
}

#[test]
fn test_upsert_map_clause() {
    let options = InsertSelectOptions::new()
        .version(Version::new(0, 3, 0))
        .on_conflict(ConflictDirective::map(
            "(provider_id, device_id, event_time)",
            [("battery_pct", "EXCLUDED.battery_pct")],
        ));
    let sql = insert_status_changes_from("stage_sc", &options).unwrap();
    assert!(sql.ends_with(
        "FROM \"stage_sc\" ON CONFLICT (provider_id, device_id, event_time) \
         DO UPDATE SET battery_pct = EXCLUDED.battery_pct ;"
    ));
}

#[test]
fn test_free_functions_match_builder() {
    let options = InsertSelectOptions::new().dest_table("t");
    assert_eq!(
        insert_trips_from("s", &options).unwrap(),
        StatementBuilder::new(EntityKind::Trip, "s").dest("t").build().unwrap()
    );
    assert_eq!(
        insert_status_changes_from("s", &options).unwrap(),
        insert_select(EntityKind::StatusChange, "s", &options).unwrap()
    );
}

#[test]
fn test_output_is_deterministic() {
    let directive = ConflictDirective::update("(trip_id)")
        .set_excluded("route")
        .set_excluded("accuracy")
        .set_excluded("end_time");
    let build = || {
        StatementBuilder::new(EntityKind::Trip, "stage")
            .version("0.3.2")
            .on_conflict(directive.clone())
            .build()
            .unwrap()
    };
    assert_eq!(build(), build());
}
