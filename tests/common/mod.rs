#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use mssql_db::prelude::*;

/// What a scripted session saw and what it should answer.
#[derive(Default)]
pub struct Script {
    pub responses: VecDeque<Result<Vec<ResultBatch>, String>>,
    pub executed: Vec<(String, Vec<RowValues>)>,
    pub opened: usize,
    pub closed: usize,
    pub refuse_connect: bool,
    pub fail_close: bool,
}

/// In-memory connector: hands out sessions that replay canned batches.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    pub script: Rc<RefCell<Script>>,
}

impl ScriptedConnector {
    pub fn respond(&self, batches: Vec<ResultBatch>) -> &Self {
        self.script.borrow_mut().responses.push_back(Ok(batches));
        self
    }

    pub fn fail_next(&self, message: &str) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .push_back(Err(message.to_string()));
        self
    }

    pub fn executed(&self) -> Vec<(String, Vec<RowValues>)> {
        self.script.borrow().executed.clone()
    }

    pub fn opened(&self) -> usize {
        self.script.borrow().opened
    }

    pub fn closed(&self) -> usize {
        self.script.borrow().closed
    }
}

pub struct ScriptedSession {
    pub id: usize,
    script: Rc<RefCell<Script>>,
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    fn connect(&self, _config: &DbConfig) -> Result<ScriptedSession, MssqlDbError> {
        let mut script = self.script.borrow_mut();
        if script.refuse_connect {
            return Err(MssqlDbError::ConnectionError("login refused".to_string()));
        }
        script.opened += 1;
        Ok(ScriptedSession {
            id: script.opened,
            script: Rc::clone(&self.script),
        })
    }
}

impl Session for ScriptedSession {
    fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultBatches, MssqlDbError> {
        let mut script = self.script.borrow_mut();
        script.executed.push((sql.to_string(), params.to_vec()));
        match script.responses.pop_front() {
            Some(Ok(batches)) => Ok(ResultBatches::new(batches)),
            Some(Err(message)) => Err(MssqlDbError::ExecutionError(message)),
            None => Ok(ResultBatches::default()),
        }
    }

    fn close(self) -> Result<(), MssqlDbError> {
        let mut script = self.script.borrow_mut();
        script.closed += 1;
        if script.fail_close {
            return Err(MssqlDbError::ConnectionError("connection reset during logout".to_string()));
        }
        Ok(())
    }
}

pub fn test_config() -> DbConfig {
    DbConfig::builder("ODBC Driver 18 for SQL Server", "localhost", "testing")
        .credentials("testlogin", "pw")
        .build()
        .unwrap()
}

pub fn scripted_db() -> (Database<ScriptedConnector>, ScriptedConnector) {
    let connector = ScriptedConnector::default();
    let db = Database::with_connector(test_config(), connector.clone()).unwrap();
    (db, connector)
}

pub fn batch(columns: &[&str], rows: Vec<Vec<RowValues>>) -> ResultBatch {
    ResultBatch {
        columns: columns.iter().map(|c| (*c).to_string()).collect(),
        rows,
    }
}
