mod common;

use common::{batch, scripted_db};
use mssql_db::prelude::*;

#[test]
fn fetch_all_maps_rows_to_snake_case_records() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![batch(
        &["UserID", "DisplayName", ""],
        vec![
            vec![RowValues::Int(1), RowValues::Text("Ada".into()), RowValues::Int(10)],
            vec![RowValues::Int(2), RowValues::Null, RowValues::Int(20)],
        ],
    )]);

    let users = db.fetch_all("SELECT UserID, DisplayName, Score * 10 FROM dbo.Users", &[])?;

    assert_eq!(users.len(), 2);
    assert_eq!(users.column_names(), ["user_id", "display_name", "column_2"]);
    let first = users.first().expect("first row");
    assert_eq!(first.get("user_id"), Some(&RowValues::Int(1)));
    assert_eq!(first.get("display_name").and_then(RowValues::as_text), Some("Ada"));
    assert_eq!(first.get("column_2"), Some(&RowValues::Int(10)));
    assert!(users.get(1).and_then(|r| r.get("display_name")).is_some_and(RowValues::is_null));
    Ok(())
}

#[test]
fn fetch_all_binds_params_and_rewrites_placeholders() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    db.fetch_all(
        "SELECT * FROM dbo.Orders WHERE Region = ? AND Note <> '?' AND Total > ?",
        &[RowValues::Text("EMEA".into()), RowValues::Float(9.5)],
    )?;

    let executed = connector.executed();
    assert_eq!(
        executed[0].0,
        "SELECT * FROM dbo.Orders WHERE Region = @P1 AND Note <> '?' AND Total > @P2"
    );
    assert_eq!(
        executed[0].1,
        vec![RowValues::Text("EMEA".into()), RowValues::Float(9.5)]
    );
    Ok(())
}

#[test]
fn fetch_all_with_no_rows_is_empty_not_missing() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![batch(&["Id"], Vec::new())]);
    let rows = db.fetch_all("SELECT Id FROM dbo.Empty", &[])?;
    assert!(rows.is_empty());

    // no result set at all, e.g. an UPDATE
    let rows = db.fetch_all("UPDATE dbo.T SET x = 1", &[])?;
    assert!(rows.is_empty());
    Ok(())
}

#[test]
fn fetch_all_reads_only_the_first_result_set() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![
        batch(&["A"], vec![vec![RowValues::Int(1)]]),
        batch(&["B"], vec![vec![RowValues::Int(2)]]),
    ]);
    let rows = db.fetch_all("SELECT 1 AS A; SELECT 2 AS B", &[])?;
    assert_eq!(rows.len(), 1);
    assert!(rows.first().is_some_and(|r| r.contains_key("a")));
    Ok(())
}

#[test]
fn fetch_one_returns_first_record_or_none() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector
        .respond(vec![batch(
            &["Name"],
            vec![
                vec![RowValues::Text("first".into())],
                vec![RowValues::Text("second".into())],
            ],
        )])
        .respond(vec![batch(&["Name"], Vec::new())]);

    let hit = db.fetch_one("SELECT Name FROM dbo.T WHERE Id = ?", &[RowValues::Int(1)])?;
    assert_eq!(
        hit.as_ref().and_then(|r| r.get("name")).and_then(RowValues::as_text),
        Some("first")
    );

    let miss = db.fetch_one("SELECT Name FROM dbo.T WHERE Id = ?", &[RowValues::Int(2)])?;
    assert!(miss.is_none());
    Ok(())
}

#[test]
fn placeholder_count_mismatch_is_rejected_before_sending() {
    let (mut db, connector) = scripted_db();
    let err = db
        .fetch_all("SELECT * FROM t WHERE a = ? AND b = ?", &[RowValues::Int(1)])
        .unwrap_err();
    assert!(matches!(err, MssqlDbError::ParameterError(_)));
    assert!(connector.executed().is_empty());
}

#[test]
fn driver_errors_propagate() {
    let (mut db, connector) = scripted_db();
    connector.fail_next("Invalid object name 'dbo.Nope'.");
    let err = db.fetch_all("SELECT * FROM dbo.Nope", &[]).unwrap_err();
    assert!(err.to_string().contains("dbo.Nope"));
    // the connection stays usable
    assert!(db.is_connected());
}
