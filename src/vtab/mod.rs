//! SQLite binding for remote tables
//!
//! Registers the `remotable` module on a host connection. Each
//! `CREATE VIRTUAL TABLE ... USING remotable(...)` discovers the remote
//! schema once and keeps one remote connection for the table's lifetime.
//!
//! # Host callbacks
//!
//! - xCreate/xConnect: parse arguments, introspect, declare the schema
//! - xBestIndex: plan predicate pushdown
//! - xOpen/xFilter/xNext/xEof/xColumn/xRowid/xClose: stream rows
//! - xDisconnect/xDestroy: close the remote connection

mod args;
mod cursor;
mod table;

use std::sync::{Arc, Mutex};

use rusqlite::vtab::read_only_module;
use rusqlite::Connection;

use crate::config::{Config, TableOptions};
use crate::driver::DriverRegistry;
use crate::executor::SharedConnection;
use crate::observability::{log_event_with_fields, Event, Telemetry};
use crate::schema::{
    IntrospectionError, IntrospectionResult, RemoteSource, SchemaIntrospector, SourceKind,
    TableDescriptor,
};

pub use args::TableArgs;
pub use cursor::RemoteTableCursor;
pub use table::RemoteTable;

/// Name the module is registered under
pub const MODULE_NAME: &str = "remotable";

/// Everything a table needs at creation time, shared by all tables of
/// one registration
#[derive(Debug)]
pub struct ModuleContext {
    registry: DriverRegistry,
    config: Config,
    telemetry: Arc<Telemetry>,
}

impl ModuleContext {
    pub fn new(registry: DriverRegistry, config: Config) -> Self {
        let telemetry = Arc::new(Telemetry::new(config.diagnostics_capacity));
        Self {
            registry,
            config,
            telemetry,
        }
    }

    /// Built-in drivers and the given configuration
    pub fn from_config(config: Config) -> Self {
        Self::new(DriverRegistry::with_builtin(), config)
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }

    pub fn table_options(&self, table: &str) -> TableOptions {
        self.config.table(table)
    }

    /// Resolves the driver, discovers the remote schema and applies the
    /// table's options. Nothing is kept on failure.
    pub fn open_table(
        &self,
        args: &TableArgs,
    ) -> IntrospectionResult<(Arc<TableDescriptor>, SharedConnection)> {
        let driver = self.registry.get(&args.driver_tag).ok_or_else(|| {
            IntrospectionError::unknown_driver(&args.driver_tag, &self.registry.tags())
        })?;

        let options = self.table_options(&args.table_name);
        let kind = options
            .source_kind
            .unwrap_or_else(|| SourceKind::infer(&args.source_expr));
        let source = RemoteSource {
            kind,
            expr: args.source_expr.clone(),
        };

        let discovered =
            SchemaIntrospector::discover(&args.table_name, &source, driver.as_ref(), &args.params)?;
        let descriptor = discovered
            .descriptor
            .with_index_costs(options.index_costs)
            .with_combinator(options.combinator);
        let mut connection = discovered.connection;

        let unknown = descriptor.unknown_index_columns();
        if !unknown.is_empty() {
            let err = IntrospectionError::config_invalid(format!(
                "Indexable columns not returned by the remote source: {}",
                unknown.join(", ")
            ));
            connection.close();
            return Err(err);
        }

        Ok((Arc::new(descriptor), Arc::new(Mutex::new(connection))))
    }
}

/// Registers the `remotable` module on `conn`
pub fn register_module(conn: &Connection, context: Arc<ModuleContext>) -> rusqlite::Result<()> {
    let drivers = context.registry().tags().join(",");
    conn.create_module(MODULE_NAME, read_only_module::<RemoteTable>(), Some(context))?;
    log_event_with_fields(Event::ModuleRegistered, &[("drivers", &drivers)]);
    Ok(())
}

pub(crate) fn module_error(e: impl std::fmt::Display) -> rusqlite::Error {
    rusqlite::Error::ModuleError(e.to_string())
}
