use data_updater::manifest::{ParseError, parse_manifest};
use data_updater::resolver::{ClientState, resolve};
use data_updater::storage::VersionTable;
use data_updater::version::AppVersion;

fn client(app_version: &str, test: bool) -> ClientState<VersionTable, VersionTable> {
    ClientState {
        app_version: AppVersion::parse(app_version).unwrap(),
        is_test_client: test,
        build_versions: VersionTable::default(),
        downloaded_versions: VersionTable::default(),
    }
}

#[test]
fn later_entry_takes_precedence_over_higher_version() {
    let manifest = parse_manifest(
        r#"[{"fileName": "table.csv", "versions": [
            {"minAppVersion": "1.0.0", "versionNumber": 5, "test": false},
            {"minAppVersion": "1.0.0", "versionNumber": 3, "test": false}
        ]}]"#,
    )
    .unwrap();

    let plan = resolve(&manifest, &client("2.0.0", false));
    let pairs: Vec<_> = plan
        .into_iter()
        .map(|d| (d.file_name, d.version_number))
        .collect();
    assert_eq!(pairs, [("table.csv".to_owned(), 3)]);
}

#[test]
fn held_versions_come_from_both_tables() {
    let manifest = parse_manifest(
        r#"[
            {"fileName": "a.csv", "versions": [{"minAppVersion": "1.0", "versionNumber": 2, "test": false}]},
            {"fileName": "b.csv", "versions": [{"minAppVersion": "1.0", "versionNumber": 2, "test": false}]},
            {"fileName": "c.csv", "versions": [{"minAppVersion": "1.0", "versionNumber": 2, "test": false}]}
        ]"#,
    )
    .unwrap();

    let mut state = client("1.0", false);
    state.build_versions = [("a.csv".to_owned(), 2)].into_iter().collect();
    state.downloaded_versions = [("b.csv".to_owned(), 7)].into_iter().collect();

    let plan = resolve(&manifest, &state);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.get("c.csv"), Some(2));
}

#[test]
fn one_bad_entry_rejects_every_file() {
    let err = parse_manifest(
        r#"[
            {"fileName": "a.csv", "versions": [{"minAppVersion": "1.0", "versionNumber": 2, "test": false}]},
            {"fileName": "b.csv", "versions": [{"minAppVersion": "1.0", "test": false}]}
        ]"#,
    )
    .unwrap_err();

    assert!(matches!(err, ParseError::MissingField { .. }));
    assert_eq!(err.file(), Some("b.csv"));
    assert_eq!(err.field(), Some("versionNumber"));
}
