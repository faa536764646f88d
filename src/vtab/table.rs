//! Virtual table: creation, index negotiation, teardown

use std::marker::PhantomData;
use std::sync::Arc;

use rusqlite::ffi;
use rusqlite::vtab::{
    CreateVTab, IndexConstraintOp, IndexInfo, VTab, VTabConnection, VTabKind,
};

use crate::executor::{lock_connection, RowCursor, SharedConnection};
use crate::observability::{log_event_with_fields, Event};
use crate::planner::{Comparator, IndexPlanner, Plan, Predicate};
use crate::schema::TableDescriptor;

use super::args::TableArgs;
use super::cursor::RemoteTableCursor;
use super::{module_error, ModuleContext};

/// One registered remote table
#[repr(C)]
pub struct RemoteTable {
    /// Base class. Must be first.
    base: ffi::sqlite3_vtab,
    descriptor: Arc<TableDescriptor>,
    connection: SharedConnection,
    context: Arc<ModuleContext>,
}

impl RemoteTable {
    /// Plans the constraints the host offers
    fn plan(&self, predicates: &[Predicate]) -> Plan {
        let plan = IndexPlanner::new(&self.descriptor).plan(predicates);
        self.context.telemetry().metrics.record_plan(plan.is_full_scan());

        let identifier = plan.identifier.to_string();
        let cost = plan.estimated_cost.to_string();
        log_event_with_fields(
            Event::PlanBuilt,
            &[
                ("cost", &cost),
                ("identifier", &identifier),
                ("table", self.descriptor.name()),
                ("token", plan.token.as_deref().unwrap_or("")),
            ],
        );
        plan
    }
}

/// Maps a host constraint operator onto a pushable comparator
pub fn comparator_for(op: IndexConstraintOp) -> Option<Comparator> {
    match op {
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ => Some(Comparator::Eq),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GE => Some(Comparator::Ge),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GT => Some(Comparator::Gt),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LE => Some(Comparator::Le),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LT => Some(Comparator::Lt),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_NE => Some(Comparator::Ne),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_IS => Some(Comparator::Is),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_ISNOT => Some(Comparator::IsNot),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_ISNULL => Some(Comparator::IsNull),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_ISNOTNULL => Some(Comparator::IsNotNull),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LIKE => Some(Comparator::Like),
        _ => None,
    }
}

unsafe impl<'vtab> VTab<'vtab> for RemoteTable {
    type Aux = Arc<ModuleContext>;
    type Cursor = RemoteTableCursor<'vtab>;

    fn connect(
        _: &mut VTabConnection,
        aux: Option<&Self::Aux>,
        args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        let context = aux
            .cloned()
            .ok_or_else(|| module_error("remotable module registered without context"))?;

        let table_arg = args
            .get(2)
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .unwrap_or_default();
        log_event_with_fields(Event::TableCreateStart, &[("table", &table_arg)]);

        let opened = TableArgs::parse(args).and_then(|parsed| {
            let (descriptor, connection) = context.open_table(&parsed)?;
            Ok((parsed, descriptor, connection))
        });

        let (parsed, descriptor, connection) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                context.telemetry().metrics.increment_tables_failed();
                let message = e.to_string();
                log_event_with_fields(
                    Event::TableCreateFailed,
                    &[("error", &message), ("table", &table_arg)],
                );
                return Err(module_error(message));
            }
        };

        context.telemetry().metrics.increment_tables_created();
        let columns = descriptor.columns().len().to_string();
        log_event_with_fields(
            Event::TableCreated,
            &[
                ("columns", &columns),
                ("driver", &parsed.driver_tag),
                ("source", &parsed.source_expr),
                ("table", descriptor.name()),
            ],
        );

        let schema = descriptor.schema_sql();
        Ok((
            schema,
            RemoteTable {
                base: ffi::sqlite3_vtab::default(),
                descriptor,
                connection,
                context,
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        let predicates: Vec<Predicate> = info
            .constraints()
            .map(|c| Predicate {
                ordinal: c.column(),
                comparator: comparator_for(c.operator()),
                usable: c.is_usable(),
            })
            .collect();

        let plan = self.plan(&predicates);

        for &position in &plan.consumed {
            let Some(argv) = plan.argv_index(position) else {
                continue;
            };
            let mut usage = info.constraint_usage(position);
            usage.set_argv_index(argv);
            usage.set_omit(plan.omit_consumed);
        }

        info.set_idx_num(plan.identifier);
        if let Some(token) = plan.token.as_deref() {
            info.set_idx_str(token);
        }
        info.set_estimated_cost(plan.estimated_cost);
        info.set_order_by_consumed(plan.order_preserved);
        Ok(())
    }

    fn open(&'vtab mut self) -> rusqlite::Result<RemoteTableCursor<'vtab>> {
        let rows = RowCursor::open(
            Arc::clone(&self.descriptor),
            Arc::clone(&self.connection),
            Arc::clone(self.context.telemetry()),
        );
        Ok(RemoteTableCursor::new(rows, PhantomData))
    }
}

impl<'vtab> CreateVTab<'vtab> for RemoteTable {
    const KIND: VTabKind = VTabKind::Default;
}

impl Drop for RemoteTable {
    fn drop(&mut self) {
        lock_connection(&self.connection).close();
        log_event_with_fields(
            Event::TableDisconnected,
            &[("table", self.descriptor.name())],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_mapping() {
        assert_eq!(
            comparator_for(IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ),
            Some(Comparator::Eq)
        );
        assert_eq!(
            comparator_for(IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_ISNOTNULL),
            Some(Comparator::IsNotNull)
        );
        assert_eq!(
            comparator_for(IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_MATCH),
            None
        );
        assert_eq!(
            comparator_for(IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GLOB),
            None
        );
        assert_eq!(
            comparator_for(IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LIMIT),
            None
        );
    }
}
