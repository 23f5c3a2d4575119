//! Data record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/save/delete/count/page APIs over the `data` table.
//! - Enforce optimistic locking on update through the `version` column.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Insert assigns a fresh id and version `0`.
//! - Update is one conditional `UPDATE ... WHERE id = ? AND version = ?`
//!   statement, so the version check and increment are atomic in SQLite.
//! - A stale or vanished row on update is reported as `RepoError::Conflict`,
//!   never merged or retried.
//! - Paged reads always end their ordering with `id ASC` so page boundaries
//!   are deterministic.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::data::{Data, DataId, DataValidationError, DATE_FORMAT};
use crate::model::field::{DataField, FieldValue};
use crate::model::filter::DataFilter;
use crate::model::page::{Page, PageRequest};
use chrono::NaiveDate;
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATA_TABLE: &str = "data";

const DATA_SELECT_SQL: &str = "SELECT
    id,
    version,
    date,
    moves,
    exercise,
    stand,
    steps,
    calories
FROM data";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for data persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed write-time validation.
    Validation(DataValidationError),
    /// Update carried a version that no longer matches storage, or the row
    /// was deleted concurrently.
    Conflict { id: DataId, version: i32 },
    /// Stored version already sits at the largest representable value.
    VersionExhausted { id: DataId },
    /// Filter predicate cannot be applied to the target field.
    InvalidFilter(String),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { id, version } => write!(
                f,
                "optimistic lock failure: record {id} is no longer at version {version}"
            ),
            Self::VersionExhausted { id } => {
                write!(f, "version of record {id} cannot be incremented")
            }
            Self::InvalidFilter(message) => write!(f, "invalid filter: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "data repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "data repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "data repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Conflict { .. }
            | Self::VersionExhausted { .. }
            | Self::InvalidFilter(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DataValidationError> for RepoError {
    fn from(value: DataValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for data records.
pub trait DataRepository {
    /// Loads one record; `Ok(None)` when the id is unknown.
    fn find_by_id(&self, id: DataId) -> RepoResult<Option<Data>>;
    /// Inserts when `data.id` is `None`, otherwise performs a version-checked
    /// update. Returns the persisted copy.
    fn save(&self, data: &Data) -> RepoResult<Data>;
    /// Removes one record. Unknown ids are not an error.
    fn delete_by_id(&self, id: DataId) -> RepoResult<()>;
    /// Total number of stored records.
    fn count(&self) -> RepoResult<u64>;
    /// Loads one page matching `filter`.
    ///
    /// Count and content come from one read snapshot: a transaction of its
    /// own, or the caller's when the connection is already inside one.
    fn find_all_filtered(&self, filter: &DataFilter, request: &PageRequest)
        -> RepoResult<Page<Data>>;

    /// Loads one page over all records.
    fn find_all(&self, request: &PageRequest) -> RepoResult<Page<Data>> {
        self.find_all_filtered(&DataFilter::new(), request)
    }
}

/// SQLite-backed data repository.
pub struct SqliteDataRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDataRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_data_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert(&self, data: &Data) -> RepoResult<Data> {
        self.conn.execute(
            "INSERT INTO data (
                version,
                date,
                moves,
                exercise,
                stand,
                steps,
                calories
            ) VALUES (0, ?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                data.date.map(date_to_db),
                data.moves,
                data.exercise,
                data.stand,
                data.steps,
                data.calories,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=data_save module=repo status=inserted id={id} version=0");

        Ok(Data {
            id: Some(id),
            version: 0,
            ..data.clone()
        })
    }

    fn update(&self, id: DataId, data: &Data) -> RepoResult<Data> {
        let Some(next_version) = data.version.checked_add(1) else {
            return Err(self.exhausted_version(id, data.version)?);
        };

        let changed = self.conn.execute(
            "UPDATE data
             SET
                version = version + 1,
                date = ?1,
                moves = ?2,
                exercise = ?3,
                stand = ?4,
                steps = ?5,
                calories = ?6
             WHERE id = ?7
               AND version = ?8;",
            params![
                data.date.map(date_to_db),
                data.moves,
                data.exercise,
                data.stand,
                data.steps,
                data.calories,
                id,
                data.version,
            ],
        )?;

        if changed == 0 {
            info!(
                "event=data_save module=repo status=conflict id={id} version={}",
                data.version
            );
            return Err(RepoError::Conflict {
                id,
                version: data.version,
            });
        }

        debug!("event=data_save module=repo status=updated id={id} version={next_version}");
        Ok(Data {
            version: next_version,
            ..data.clone()
        })
    }

    /// Classifies an update whose version cannot be incremented without
    /// writing anything: stale versions are still conflicts.
    fn exhausted_version(&self, id: DataId, version: i32) -> RepoResult<RepoError> {
        let stored: Option<i64> = self
            .conn
            .query_row("SELECT version FROM data WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;

        if stored != Some(i64::from(version)) {
            info!("event=data_save module=repo status=conflict id={id} version={version}");
            return Ok(RepoError::Conflict { id, version });
        }

        warn!("event=data_save module=repo status=rejected id={id} error_code=version_exhausted");
        Ok(RepoError::VersionExhausted { id })
    }
}

impl DataRepository for SqliteDataRepository<'_> {
    fn find_by_id(&self, id: DataId) -> RepoResult<Option<Data>> {
        let row = self
            .conn
            .query_row(
                &format!("{DATA_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_data_columns,
            )
            .optional()?;

        row.map(DataColumns::into_data).transpose()
    }

    fn save(&self, data: &Data) -> RepoResult<Data> {
        data.validate()?;

        match data.id {
            None => self.insert(data),
            Some(id) => self.update(id, data),
        }
    }

    fn delete_by_id(&self, id: DataId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM data WHERE id = ?1;", [id])?;
        debug!("event=data_delete module=repo status=ok id={id} removed={changed}");
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM data;", [], |row| row.get(0))?;
        count_to_u64(total)
    }

    fn find_all_filtered(
        &self,
        filter: &DataFilter,
        request: &PageRequest,
    ) -> RepoResult<Page<Data>> {
        let (where_sql, bind_values) = build_where_clause(filter)?;

        // Inside a caller transaction the snapshot is already shared.
        if !self.conn.is_autocommit() {
            return read_page(self.conn, &where_sql, bind_values, request);
        }

        // Count and slice read from one snapshot.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let page = read_page(&tx, &where_sql, bind_values, request)?;
        tx.commit()?;
        Ok(page)
    }
}

fn read_page(
    conn: &Connection,
    where_sql: &str,
    mut bind_values: Vec<Value>,
    request: &PageRequest,
) -> RepoResult<Page<Data>> {
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM data{where_sql};"),
        params_from_iter(bind_values.iter()),
        |row| row.get(0),
    )?;
    let total = count_to_u64(total)?;

    let mut sql = format!("{DATA_SELECT_SQL}{where_sql}");
    sql.push_str(&build_order_by(request));
    sql.push_str(" LIMIT ? OFFSET ?;");
    bind_values.push(Value::Integer(i64::from(request.size())));
    bind_values.push(Value::Integer(
        i64::try_from(request.offset()).unwrap_or(i64::MAX),
    ));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut content = Vec::new();
    while let Some(row) = rows.next()? {
        content.push(read_data_columns(row)?.into_data()?);
    }

    Ok(Page::new(content, request, total))
}

/// Raw column values, decoded before domain checks.
struct DataColumns {
    id: DataId,
    version: i64,
    date: Option<String>,
    moves: Option<i32>,
    exercise: Option<i32>,
    stand: Option<i32>,
    steps: Option<i32>,
    calories: Option<i32>,
}

fn read_data_columns(row: &Row<'_>) -> rusqlite::Result<DataColumns> {
    Ok(DataColumns {
        id: row.get("id")?,
        version: row.get("version")?,
        date: row.get("date")?,
        moves: row.get("moves")?,
        exercise: row.get("exercise")?,
        stand: row.get("stand")?,
        steps: row.get("steps")?,
        calories: row.get("calories")?,
    })
}

impl DataColumns {
    fn into_data(self) -> RepoResult<Data> {
        let id = self.id;
        let version = i32::try_from(self.version)
            .ok()
            .filter(|version| *version >= 0)
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid version `{}` for record {id} in data.version",
                    self.version
                ))
            })?;

        let date = match self.date {
            Some(text) => Some(NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid date `{text}` for record {id} in data.date"
                ))
            })?),
            None => None,
        };

        let data = Data {
            id: Some(id),
            version,
            date,
            moves: self.moves,
            exercise: self.exercise,
            stand: self.stand,
            steps: self.steps,
            calories: self.calories,
        };
        data.validate()?;
        Ok(data)
    }
}

fn build_where_clause(filter: &DataFilter) -> RepoResult<(String, Vec<Value>)> {
    let mut clauses = Vec::with_capacity(filter.predicates().len());
    let mut bind_values = Vec::with_capacity(filter.predicates().len() + 2);

    for predicate in filter.predicates() {
        if predicate.value.kind() != predicate.field.kind() {
            return Err(RepoError::InvalidFilter(format!(
                "field `{}` cannot be compared with {:?}",
                predicate.field, predicate.value
            )));
        }
        clauses.push(format!(
            "{} {} ?",
            predicate.field.column(),
            predicate.op.sql_operator()
        ));
        bind_values.push(field_value_to_db(predicate.value));
    }

    if clauses.is_empty() {
        return Ok((String::new(), bind_values));
    }
    Ok((format!(" WHERE {}", clauses.join(" AND ")), bind_values))
}

fn build_order_by(request: &PageRequest) -> String {
    let sort = request.sort();
    let mut terms: Vec<String> = sort
        .orders()
        .iter()
        .map(|order| format!("{} {}", order.field.column(), order.direction.sql_keyword()))
        .collect();
    if !sort.contains(DataField::Id) {
        terms.push(format!("{} ASC", DataField::Id.column()));
    }
    format!(" ORDER BY {}", terms.join(", "))
}

fn field_value_to_db(value: FieldValue) -> Value {
    match value {
        FieldValue::Integer(value) => Value::Integer(value),
        FieldValue::Date(date) => Value::Text(date_to_db(date)),
    }
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn count_to_u64(total: i64) -> RepoResult<u64> {
    u64::try_from(total)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{total}`")))
}

fn ensure_data_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, DATA_TABLE)? {
        return Err(RepoError::MissingRequiredTable(DATA_TABLE));
    }

    for field in DataField::ALL {
        let column = field.column();
        if !table_has_column(conn, DATA_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: DATA_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
