//! Remote schema discovery
//!
//! Runs a zero-row probe against the remote source and infers host column
//! types from the result metadata.
//!
//! Inference policy:
//! 1. Declared SQL type: NUMBER → integer, DECIMAL/DATETIME/FLOAT → real,
//!    BINARY → blob, anything string-like → text
//! 2. Runtime class name: str → text, float → real, bool/int → integer,
//!    datetime → text, unrecognized → text
//! 3. An integer column with a declared precision or scale becomes real

use crate::driver::{
    ColumnMeta, ConnectParams, RemoteConnection, RemoteDriver, SqlTypeCode, TypeIndicator,
};

use super::errors::{IntrospectionError, IntrospectionResult};
use super::types::{ColumnDescriptor, HostType, RemoteSource, SourceKind, TableDescriptor};

/// A discovered table and the connection it was discovered through
pub struct DiscoveredTable {
    pub descriptor: TableDescriptor,
    pub connection: Box<dyn RemoteConnection>,
}

/// Stateless schema discovery
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Connects through `driver` and probes `source`.
    ///
    /// On failure the connection is closed and nothing is returned.
    pub fn discover(
        table_name: &str,
        source: &RemoteSource,
        driver: &dyn RemoteDriver,
        params: &ConnectParams,
    ) -> IntrospectionResult<DiscoveredTable> {
        let mut connection = driver
            .connect(params)
            .map_err(IntrospectionError::connect_failed)?;

        let descriptor = Self::probe(source, connection.as_ref())
            .and_then(|columns| TableDescriptor::new(table_name, source.clone(), columns));

        match descriptor {
            Ok(descriptor) => Ok(DiscoveredTable {
                descriptor,
                connection,
            }),
            Err(e) => {
                connection.close();
                Err(e)
            }
        }
    }

    /// Runs the zero-row probe and returns columns in remote order
    pub fn probe(
        source: &RemoteSource,
        connection: &dyn RemoteConnection,
    ) -> IntrospectionResult<Vec<ColumnDescriptor>> {
        let mut cursor = connection
            .cursor()
            .map_err(IntrospectionError::probe_failed)?;

        let described = cursor
            .execute(&Self::probe_sql(source), &[])
            .and_then(|()| cursor.description());
        cursor.close();

        let metas = described.map_err(IntrospectionError::probe_failed)?;
        Ok(metas
            .iter()
            .map(|meta| ColumnDescriptor::new(meta.name.clone(), Self::classify(meta)))
            .collect())
    }

    /// Probe statement returning no rows
    pub fn probe_sql(source: &RemoteSource) -> String {
        match source.kind {
            SourceKind::Table => format!("select * from {} where 0=1", source.expr.trim()),
            SourceKind::Query => format!(
                "select * from ({}) t where 0=1",
                source.expr.trim().trim_end_matches(';')
            ),
        }
    }

    /// Infers the host type of one column
    pub fn classify(meta: &ColumnMeta) -> HostType {
        let host_type = match &meta.type_indicator {
            TypeIndicator::Declared(code) => match code {
                SqlTypeCode::Number | SqlTypeCode::RowId => HostType::Integer,
                SqlTypeCode::Decimal | SqlTypeCode::DateTime | SqlTypeCode::Float => {
                    HostType::Real
                }
                SqlTypeCode::Binary => HostType::Blob,
                SqlTypeCode::String => HostType::Text,
            },
            TypeIndicator::RuntimeClass(class) => match class.as_str() {
                "str" | "datetime" => HostType::Text,
                "float" | "Decimal" => HostType::Real,
                "bool" | "int" => HostType::Integer,
                "bytes" => HostType::Blob,
                _ => HostType::Text,
            },
            TypeIndicator::Unknown => HostType::Text,
        };

        let sized = meta.precision.unwrap_or(0) > 0 || meta.scale.unwrap_or(0) > 0;
        if host_type == HostType::Integer && sized {
            HostType::Real
        } else {
            host_type
        }
    }
}
