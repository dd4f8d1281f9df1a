mod common;

use chrono::NaiveDate;
use common::{batch, scripted_db};
use mssql_db::prelude::*;

#[test]
fn call_sends_exec_statement_with_text_args() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    let since = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date");

    db.call_procedure(
        "dbo.usp_LoadOrders",
        &[
            ("Region", RowValues::Text("EMEA".into())),
            ("Limit", RowValues::Int(50)),
            ("Since", RowValues::Timestamp(since)),
            ("Tag", RowValues::Null),
        ],
        None,
        true,
    )?;

    let executed = connector.executed();
    assert_eq!(
        executed[0].0,
        "EXEC dbo.usp_LoadOrders @Region = @P1, @Limit = @P2, @Since = @P3, @Tag = @P4;"
    );
    assert_eq!(
        executed[0].1,
        vec![
            RowValues::Text("EMEA".into()),
            RowValues::Text("50".into()),
            RowValues::Text("2024-03-01 00:00:00".into()),
            RowValues::Null,
        ]
    );
    Ok(())
}

#[test]
fn out_arg_is_declared_captured_and_read_back() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![
        batch(
            &["OrderID", "Total"],
            vec![
                vec![RowValues::Int(10), RowValues::Float(1.5)],
                vec![RowValues::Int(11), RowValues::Float(2.5)],
            ],
        ),
        batch(&["rowcount"], vec![vec![RowValues::Int(5)]]),
    ]);

    let results = db.call_procedure(
        "dbo.usp_Archive",
        &[("Before", RowValues::Int(2024))],
        Some("RowCount"),
        true,
    )?;

    assert_eq!(
        connector.executed()[0].0,
        "DECLARE @rowcount INTEGER;EXEC @rowcount = dbo.usp_Archive @Before = @P1;SELECT @rowcount AS rowcount;"
    );
    assert_eq!(results.len(), 2);
    assert_eq!(results.out_value()?, &RowValues::Int(5));
    assert_eq!(
        get_out_value(results.sets(), "RowCount")?,
        &RowValues::Int(5)
    );
    assert_eq!(
        results.first_record().and_then(|r| r.get("order_id")),
        Some(&RowValues::Int(10))
    );
    let orders = results
        .result_set(0)
        .and_then(CapturedSet::as_records)
        .expect("orders set");
    assert_eq!(orders.len(), 2);
    Ok(())
}

#[test]
fn missing_out_value_fails_the_call() {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![batch(&["OrderID"], vec![vec![RowValues::Int(1)]])]);

    let err = db
        .call_procedure("dbo.usp_Archive", &[], Some("RowCount"), true)
        .unwrap_err();
    assert!(err.is_missing_out_argument());
    assert_eq!(
        err.to_string(),
        "The out argument \"rowcount\" was not captured from call to the stored procedure."
    );
}

#[test]
fn only_the_out_row_means_no_data() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![batch(&["rowcount"], vec![vec![RowValues::Int(0)]])]);

    let results = db.call_procedure("dbo.usp_Nothing", &[], Some("rowcount"), true)?;
    assert!(results.result_set(0).is_none());
    assert!(results.first_record().is_none());
    assert_eq!(results.out_value()?, &RowValues::Int(0));
    Ok(())
}

#[test]
fn raw_mode_returns_columns_then_rows() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![
        batch(&["ProductName"], vec![vec![RowValues::Text("widget".into())]]),
        batch(&["rowcount"], vec![vec![RowValues::Int(1)]]),
    ]);

    let results = db.call_procedure("dbo.usp_Products", &[], Some("rowcount"), false)?;
    assert_eq!(
        results.sets(),
        [
            CapturedSet::Columns(vec!["product_name".into()]),
            CapturedSet::Rows(vec![vec![RowValues::Text("widget".into())]]),
            CapturedSet::Columns(vec!["rowcount".into()]),
            CapturedSet::Rows(vec![vec![RowValues::Int(1)]]),
        ]
    );
    assert_eq!(results.out_value()?, &RowValues::Int(1));
    Ok(())
}

#[test]
fn column_less_batches_pass_through() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    connector.respond(vec![
        ResultBatch::default().with_row(vec![RowValues::Int(3)]),
        batch(&["Id"], vec![vec![RowValues::Int(7)]]),
    ]);

    let results = db.call_procedure("dbo.usp_Mixed", &[], None, true)?;
    assert_eq!(results.sets()[0], CapturedSet::Rows(vec![vec![RowValues::Int(3)]]));
    assert!(results.sets()[1].as_records().is_some());
    Ok(())
}

#[test]
fn native_binding_keeps_types() -> Result<(), MssqlDbError> {
    let (mut db, connector) = scripted_db();
    let call = ProcedureCall::new("dbo.usp_Score")
        .arg("Points", RowValues::Float(2.75))
        .arg("Active", RowValues::Bool(true))
        .binding(ArgBinding::Native);
    db.call(&call)?;

    assert_eq!(
        connector.executed()[0].1,
        vec![RowValues::Float(2.75), RowValues::Bool(true)]
    );
    Ok(())
}

#[test]
fn invalid_names_never_reach_the_server() {
    let (mut db, connector) = scripted_db();
    let err = db
        .call_procedure("dbo.usp_x; DROP TABLE users", &[], None, true)
        .unwrap_err();
    assert!(matches!(err, MssqlDbError::ParameterError(_)));
    assert!(connector.executed().is_empty());
    assert!(!db.is_connected());
}
