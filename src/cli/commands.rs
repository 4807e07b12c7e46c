//! CLI command implementations
//!
//! `init` boots once and shuts down, leaving a data directory with a
//! checkpointed log. `start` boots and serves one request per stdin line,
//! each in its own transaction: committed when the request succeeds,
//! rolled back when it fails.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::observability::{emit, DiagnosticRecord, Event, Logger, Severity};
use crate::planner::{ExplainPlan, PlannerError, PlannerKind, QueryData, UpdateCommand};
use crate::query::collect_rows;
use crate::server::{Engine, EngineConfig};
use crate::tx::Transaction;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response};

/// One request line
///
/// ```json
/// {"op": "update", "command": {"kind": "insert", "table_name": "t", "fields": ["a"], "values": [1]}}
/// {"op": "query", "query": {"tables": ["t"], "fields": ["t.a"]}, "planner": "sort"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// DDL or DML
    Update { command: UpdateCommand },
    /// Plan and run a query; `planner` overrides the engine strategy
    Query {
        query: QueryData,
        #[serde(default)]
        planner: Option<String>,
    },
    /// Plan a query and describe the tree without running it
    Explain {
        query: QueryData,
        #[serde(default)]
        planner: Option<String>,
    },
}

impl Request {
    fn op(&self) -> &'static str {
        match self {
            Request::Update { .. } => "update",
            Request::Query { .. } => "query",
            Request::Explain { .. } => "explain",
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config, planner } => start(&config, planner.as_deref()),
    }
}

/// Initialize a new data directory
///
/// Refuses a directory that already holds a durability log.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    if config.log_path().exists() {
        return Err(CliError::already_initialized());
    }

    let data_dir = config.data_dir.clone();
    Engine::boot(config)?.shutdown()?;

    write_response(
        &mut io::stdout().lock(),
        json!({"initialized": true, "data_dir": data_dir}),
    )
}

/// Boot and serve stdin until EOF, then shut down
pub fn start(config_path: &Path, planner: Option<&str>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(key) = planner {
        config = config.with_query_planner(key);
    }
    if !config.log_path().exists() {
        return Err(CliError::not_initialized());
    }

    let engine = Engine::boot(config)?;
    let served = serve(&engine, io::stdin().lock(), &mut io::stdout().lock());
    // shut down even when the loop stopped on an I/O error
    let shutdown = engine.shutdown();
    let served = served?;
    shutdown?;

    Logger::log_stderr(
        Severity::Info,
        "SERVING_STOPPED",
        &[("requests", &served.to_string())],
    );
    Ok(())
}

/// Serving loop; returns the number of requests answered.
///
/// Malformed lines get an error response. Read or write failures end
/// the loop with an error.
pub fn serve<R: BufRead, W: Write>(engine: &Engine, input: R, out: &mut W) -> CliResult<usize> {
    let mut served = 0;

    for line in read_requests(input) {
        let request = match line.and_then(|value| {
            serde_json::from_value::<Request>(value)
                .map_err(|e| CliError::bad_request(format!("Invalid request: {}", e)))
        }) {
            Ok(request) => request,
            Err(e) if e.is_recoverable() => {
                write_error(out, e.code_str(), e.message())?;
                served += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match execute(engine, &request)? {
            Ok(data) => write_response(out, data)?,
            Err(e) => write_error(out, e.code().code(), e.message())?,
        }
        served += 1;
    }

    Ok(served)
}

/// Runs one request in its own transaction.
///
/// The outer error is a logging failure; the inner one is the request's.
fn execute(engine: &Engine, request: &Request) -> CliResult<Result<Value, PlannerError>> {
    let tx = engine.new_transaction()?;
    let tx_id = tx.id();

    match dispatch(engine, request, &tx) {
        Ok(data) => {
            tx.commit()?;
            Ok(Ok(data))
        }
        Err(e) => {
            tx.rollback()?;
            emit(
                engine.sink().as_ref(),
                DiagnosticRecord::new(Event::RequestFailed)
                    .with_field("op", request.op())
                    .with_field("code", e.code())
                    .with_field("message", e.message())
                    .with_field("tx_id", tx_id),
            );
            Ok(Err(e))
        }
    }
}

fn dispatch(engine: &Engine, request: &Request, tx: &Transaction) -> Result<Value, PlannerError> {
    match request {
        Request::Update { command } => {
            let affected = engine.planner().execute_update(command, tx)?;
            Ok(json!({ "affected": affected }))
        }
        Request::Query { query, planner } => {
            let plan = engine
                .planner_for(strategy(engine, planner.as_deref()))
                .create_query_plan(query, tx)?;
            let rows = collect_rows(plan.as_ref())?;
            let fields: Vec<&str> = plan.schema().fields().collect();
            Ok(json!({ "fields": fields, "rows": rows }))
        }
        Request::Explain { query, planner } => {
            let explain = match engine
                .planner_for(strategy(engine, planner.as_deref()))
                .create_query_plan(query, tx)
            {
                Ok(plan) => ExplainPlan::from_plan(plan.as_ref()),
                Err(e) => ExplainPlan::from_error(&e),
            };
            Ok(explain.to_json())
        }
    }
}

fn strategy(engine: &Engine, key: Option<&str>) -> PlannerKind {
    match key {
        Some(key) => PlannerKind::resolve(key, engine.sink().as_ref()),
        None => engine.planner_kind(),
    }
}

fn load_config(path: &Path) -> CliResult<EngineConfig> {
    EngineConfig::load(path).map_err(|e| CliError::config_error(e.message()))
}
