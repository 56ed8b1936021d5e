use pointr_core::pipeline::{filter_by_contact_info, sort_records};
use pointr_core::{
    CategoryRegistry, ColumnSet, ColumnSpec, Config, ContactFilterConfig, ContactFilters,
    DataTable, ExportFormat, Exporter, FieldValue, FilterCriteria, JsonFileSource, Record,
    RecordPipeline, SortConfig, SortDirection,
};
use std::io::Write;

fn type_phone_columns() -> ColumnSet {
    ColumnSet::new(vec![
        ColumnSpec::new("type", "Type"),
        ColumnSpec::new("phone", "Phone"),
    ])
    .unwrap()
}

fn cafe_bank_unknown() -> Vec<Record> {
    vec![
        Record::new().with("type", "cafe").with("phone", "555"),
        Record::new().with("type", "bank").with("phone", ""),
        Record::new().with("type", "unknown_tag").with("phone", "777"),
    ]
}

fn business(name: &str, kind: &str, phone: Option<&str>, source: &str) -> Record {
    let mut record = Record::new()
        .with("name", name)
        .with("type", kind)
        .with("source", source);
    if let Some(phone) = phone {
        record.set("phone", phone);
    }
    record
}

#[test]
fn test_phone_filter_scenario() {
    let records = cafe_bank_unknown();
    let pipeline = RecordPipeline::new(type_phone_columns());
    let criteria = FilterCriteria::default().contacts(ContactFilters {
        has_phone: true,
        ..Default::default()
    });

    let result = pipeline.apply(&records, &criteria);
    assert_eq!(result, vec![records[0].clone(), records[2].clone()]);
}

#[test]
fn test_standalone_contact_stage() {
    let records = vec![
        Record::new().with("phone", " 12 "),
        Record::new().with("phone", "\t"),
        Record::new(),
        Record::new().with("phone", FieldValue::Null),
    ];
    let filters = ContactFilters {
        has_phone: true,
        ..Default::default()
    };
    let kept = filter_by_contact_info(
        records.iter().collect(),
        &filters,
        &ContactFilterConfig { enabled: true },
    );
    assert_eq!(kept, vec![&records[0]]);
}

#[test]
fn test_category_lookup_scenario() {
    let registry = CategoryRegistry::builtin();
    assert_eq!(registry.category_for_type("cafe").name, "Food & Dining");
    assert_eq!(registry.category_for_type("spaceship").name, "Other");
}

#[test]
fn test_csv_export_scenario() {
    let records = cafe_bank_unknown();
    let visible = vec![&records[0], &records[2]];
    let csv = Exporter::to_csv(&visible, &type_phone_columns()).unwrap();
    assert_eq!(
        String::from_utf8(csv).unwrap(),
        "\"Type\",\"Phone\"\n\"cafe\",\"555\"\n\"unknown_tag\",\"777\""
    );
}

#[test]
fn test_json_export_round_trip() {
    let records = vec![
        business("Harbor Cafe", "cafe", Some("555"), "osm"),
        business("Old Mill", "memorial", None, "custom").with("lat", 51.5),
    ];
    let columns = ColumnSet::new(vec![
        ColumnSpec::new("name", "Name"),
        ColumnSpec::new("phone", "Phone"),
        ColumnSpec::new("lat", "Latitude"),
    ])
    .unwrap();

    let json = Exporter::to_json(&records, &columns).unwrap();
    let parsed: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_slice(&json).unwrap();

    assert_eq!(parsed.len(), 2);
    for (row, record) in parsed.iter().zip(&records) {
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        let mut expected_keys = columns.ids();
        expected_keys.sort();
        let mut sorted_keys = keys.clone();
        sorted_keys.sort();
        assert_eq!(sorted_keys, expected_keys);

        for id in columns.ids() {
            let expected = match record.get(id) {
                Some(value) => serde_json::to_value(value).unwrap(),
                None => serde_json::Value::Null,
            };
            assert_eq!(row[id], expected, "field {}", id);
        }
    }
}

#[test]
fn test_full_pipeline_order() {
    let records = vec![
        business("Zeta Bakery", "bakery", Some("1"), "osm"),
        business("Alpha Pharmacy", "pharmacy", Some("2"), "osm"),
        business("Beta Bistro", "restaurant", None, "custom"),
        business("Gamma Bar", "bar", Some("3"), "custom"),
        business("Delta Bank", "bank", Some("4"), "osm"),
    ];
    let columns = ColumnSet::new(vec![
        ColumnSpec::new("name", "Name"),
        ColumnSpec::new("type", "Type"),
        ColumnSpec::new("phone", "Phone"),
    ])
    .unwrap();
    let pipeline = RecordPipeline::new(columns);

    let criteria = FilterCriteria::default()
        .search("a")
        .categories(["Food & Dining"])
        .contacts(ContactFilters {
            has_phone: true,
            ..Default::default()
        })
        .sort_by("name", SortDirection::Desc);

    let names: Vec<&str> = pipeline
        .view(&records, &criteria)
        .into_iter()
        .filter_map(|r| r.get_str("name"))
        .collect();
    assert_eq!(names, vec!["Zeta Bakery", "Gamma Bar"]);
}

#[test]
fn test_sort_by_formatted_category_is_stable() {
    let registry = CategoryRegistry::builtin();
    let columns = ColumnSet::new(vec![ColumnSpec::new("type", "Category").with_format(
        move |value, _| registry.category_for_type(&value.to_string()).name.clone(),
    )])
    .unwrap();

    let records = vec![
        Record::new().with("id", 1i64).with("type", "bank"),
        Record::new().with("id", 2i64).with("type", "cafe"),
        Record::new().with("id", 3i64).with("type", "hairdresser"),
        Record::new().with("id", 4i64).with("type", "bar"),
    ];
    let ids = |rows: Vec<&Record>| -> Vec<String> {
        rows.iter()
            .map(|r| r.get("id").map(ToString::to_string).unwrap_or_default())
            .collect()
    };

    let asc = SortConfig {
        column: Some("type".to_string()),
        direction: Some(SortDirection::Asc),
    };
    // "food & dining" < "services"; ties keep input order
    assert_eq!(
        ids(sort_records(records.iter().collect(), &asc, &columns)),
        vec!["2", "4", "1", "3"]
    );

    let desc = SortConfig {
        direction: Some(SortDirection::Desc),
        ..asc
    };
    assert_eq!(
        ids(sort_records(records.iter().collect(), &desc, &columns)),
        vec!["1", "3", "2", "4"]
    );
}

#[test]
fn test_table_from_json_file_with_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"name": "Harbor Cafe", "type": "cafe", "phone": "555", "source": "osm"}},
            {{"name": "Quay Hazard", "type": "hazard", "source": "custom"}},
            {{"name": "Ferry Pier", "type": "ferry_terminal", "website": "https://ferry.example", "source": "osm"}}
        ]"#
    )
    .unwrap();

    let config = Config::default();
    let table = DataTable::load(&JsonFileSource::new(file.path()), config.pipeline().unwrap())
        .unwrap();

    let criteria = FilterCriteria::default().categories(["Hazard", "Transportation"]);
    let visible = table.view(&criteria);
    assert_eq!(visible.len(), 2);

    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("visible.json");
    let visible_owned: Vec<Record> = visible.into_iter().cloned().collect();
    let written =
        Exporter::export_to_file(&visible_owned, table.pipeline().columns(), &out_path).unwrap();
    assert!(written);

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed[0]["name"], "Quay Hazard");
    assert_eq!(parsed[0]["phone"], serde_json::Value::Null);
    assert_eq!(parsed[1]["website"], "https://ferry.example");
    assert_eq!(parsed[0].as_object().unwrap().len(), 7);
}

#[test]
fn test_empty_export_writes_nothing() {
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("nothing.csv");
    let records: Vec<Record> = Vec::new();

    let written = Exporter::export_to_file(&records, &type_phone_columns(), &out_path).unwrap();
    assert!(!written);
    assert!(!out_path.exists());

    let payload = Exporter::export(&records, &type_phone_columns(), ExportFormat::Json, None)
        .unwrap();
    assert!(payload.is_none());
}

#[test]
fn test_csv_writes_integral_floats_without_fraction() {
    let records: Vec<Record> = serde_json::from_str(r#"[{"lat": 5.0}, {"lat": 51.25}]"#).unwrap();
    let columns = ColumnSet::new(vec![ColumnSpec::new("lat", "Lat")]).unwrap();

    let csv = Exporter::to_csv(&records, &columns).unwrap();
    assert_eq!(
        String::from_utf8(csv).unwrap(),
        "\"Lat\"\n\"5\"\n\"51.25\""
    );
}
