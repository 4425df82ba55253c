//! 数据库基础设施

use serde_json::{Map, Number, Value};
use sqlx::{
    mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow},
    pool::PoolConnection,
    query::Query,
    Column, Connection, Error, Row, TypeInfo,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::config::DatabaseConfig;

/// 一行查询结果：列名 -> JSON 值，保持列顺序
pub type Record = Map<String, Value>;

/// 语句参数
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<&Number> for SqlParam {
    fn from(value: &Number) -> Self {
        match value.as_i64() {
            Some(v) => SqlParam::Int(v),
            None => SqlParam::Float(value.as_f64().unwrap_or_default()),
        }
    }
}

pub struct DatabaseManager {
    pool: MySqlPool,
}

impl DatabaseManager {
    /// 按配置创建连接池
    ///
    /// 连接池是惰性的：数据库不可达时服务照常启动，错误在首次获取连接时返回。
    pub fn connect(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy_with(options);

        debug!(
            "Database pool configured for {}@{}:{}/{} (max {} connections)",
            config.user, config.host, config.port, config.name, config.max_connections
        );

        Self { pool }
    }

    /// 从连接池获取一个连接，guard 析构时自动归还
    pub async fn acquire(&self) -> Result<PoolConnection<MySql>, Error> {
        let start = Instant::now();
        self.pool.acquire().await.map_err(|e| {
            warn!(
                "Failed to acquire database connection after {}ms: {}",
                start.elapsed().as_millis(),
                e
            );
            e
        })
    }

    /// 在事务中执行一条写语句并立即提交，返回受影响的行数
    pub async fn execute_write(&self, sql: &str, params: &[SqlParam]) -> Result<u64, Error> {
        let mut conn = self.acquire().await?;
        let mut tx = conn.begin().await?;

        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("{} -> {} row(s) affected", sql, result.rows_affected());
        Ok(result.rows_affected())
    }

    /// 执行一条查询语句，把所有行转换为键值记录
    pub async fn execute_read(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Record>, Error> {
        let mut conn = self.acquire().await?;

        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut *conn)
            .await?;

        debug!("{} -> {} row(s)", sql, rows.len());
        Ok(rows.iter().map(row_to_record).collect())
    }

    /// 健康检查
    pub async fn ping(&self) -> Result<(), Error> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlParam],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
        };
    }
    query
}

/// 列值到 JSON 的解码方式，由列类型名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    Decimal,
    DateTime,
    Date,
    Time,
    Text,
    Binary,
    Other,
}

impl ColumnKind {
    /// 解析 MySQL 列类型名，如 `INT`、`BIGINT UNSIGNED`、`VARCHAR`
    pub fn from_type_name(name: &str) -> Self {
        let name = name.to_ascii_uppercase();
        let (base, unsigned) = match name.strip_suffix(" UNSIGNED") {
            Some(base) => (base, true),
            None => (name.as_str(), false),
        };

        match base {
            "BOOLEAN" | "BOOL" => ColumnKind::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" if unsigned => {
                ColumnKind::Unsigned
            }
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
                ColumnKind::Signed
            }
            "FLOAT" | "DOUBLE" | "REAL" => ColumnKind::Float,
            "DECIMAL" | "NUMERIC" => ColumnKind::Decimal,
            "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
            "DATE" => ColumnKind::Date,
            "TIME" => ColumnKind::Time,
            "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
            | "SET" | "JSON" => ColumnKind::Text,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                ColumnKind::Binary
            }
            _ => ColumnKind::Other,
        }
    }
}

/// 把一行结果转换为有序的键值记录
///
/// 无法解码的值记为 `null`，不影响同一行的其他列。
pub fn row_to_record(row: &MySqlRow) -> Record {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        let kind = ColumnKind::from_type_name(column.type_info().name());
        let value = value_or_null(column.name(), decode_column(row, index, kind));
        record.insert(column.name().to_string(), value);
    }
    record
}

fn value_or_null(column: &str, decoded: Result<Option<Value>, Error>) -> Value {
    match decoded {
        Ok(value) => value.unwrap_or(Value::Null),
        Err(e) => {
            warn!("Column `{}` could not be decoded, returning null: {}", column, e);
            Value::Null
        }
    }
}

fn decode_column(row: &MySqlRow, index: usize, kind: ColumnKind) -> Result<Option<Value>, Error> {
    let value = match kind {
        ColumnKind::Bool => row.try_get::<Option<bool>, _>(index)?.map(Value::from),
        // 整数按字节长度解码，不同宽度共用 i64/u64
        ColumnKind::Signed => row
            .try_get_unchecked::<Option<i64>, _>(index)?
            .map(Value::from),
        ColumnKind::Unsigned => row
            .try_get_unchecked::<Option<u64>, _>(index)?
            .map(Value::from),
        ColumnKind::Float => row.try_get::<Option<f64>, _>(index)?.map(Value::from),
        ColumnKind::DateTime => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)?
            .map(|v| Value::from(v.format("%Y-%m-%d %H:%M:%S").to_string())),
        ColumnKind::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)?
            .map(|v| Value::from(v.to_string())),
        ColumnKind::Time => row
            .try_get::<Option<chrono::NaiveTime>, _>(index)?
            .map(|v| Value::from(v.to_string())),
        ColumnKind::Text => row.try_get::<Option<String>, _>(index)?.map(Value::from),
        ColumnKind::Binary => row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(Value::from),
        // DECIMAL 等在二进制协议中以文本传输
        ColumnKind::Decimal | ColumnKind::Other => row
            .try_get_unchecked::<Option<String>, _>(index)?
            .map(Value::from),
    };
    Ok(value)
}
