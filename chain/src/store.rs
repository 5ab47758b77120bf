use std::path::Path;
use std::sync::RwLock;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::error::{ChainError, Result};
use crate::models::{parse_option_type, OptionContract};

const DATE_FORMAT: &str = "%Y-%m-%d";

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS option_contracts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        symbol TEXT NOT NULL,
        option_type TEXT NOT NULL,
        strike_price REAL NOT NULL,
        expiration_date TEXT NOT NULL,
        bid_price REAL,
        ask_price REAL
    );";

const INSERT_CONTRACT: &str = "
    INSERT INTO option_contracts (symbol, option_type, strike_price, expiration_date, bid_price, ask_price)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6);";

const SELECT_BY_SYMBOL: &str = "
    SELECT id, symbol, option_type, strike_price, expiration_date, bid_price, ask_price
    FROM option_contracts WHERE symbol = ?1 ORDER BY id;";

/// Persistence for fetched option chains, keyed by underlying symbol.
pub trait ContractStore {
    /// Inserts all contracts or none; returns how many were written.
    fn insert(&self, contracts: &[OptionContract]) -> Result<usize>;

    /// All contracts of `symbol` in insertion order, with their ids.
    fn retrieve(&self, symbol: &str) -> Result<Vec<OptionContract>>;
}

/// Row as stored, before the text columns are decoded.
struct StoredRow {
    id: i64,
    symbol: String,
    option_type: String,
    strike_price: f64,
    expiration_date: String,
    bid_price: Option<f64>,
    ask_price: Option<f64>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            symbol: row.get(1)?,
            option_type: row.get(2)?,
            strike_price: row.get(3)?,
            expiration_date: row.get(4)?,
            bid_price: row.get(5)?,
            ask_price: row.get(6)?,
        })
    }

    fn into_contract(self) -> Result<OptionContract> {
        let expiration_date = NaiveDate::parse_from_str(&self.expiration_date, DATE_FORMAT)
            .map_err(|e| {
                ChainError::InvalidRecord(format!(
                    "row {}: expiration date '{}': {}",
                    self.id, self.expiration_date, e
                ))
            })?;

        Ok(OptionContract {
            id: Some(self.id),
            symbol: self.symbol,
            option_type: parse_option_type(&self.option_type)?,
            strike_price: self.strike_price,
            expiration_date,
            bid_price: self.bid_price,
            ask_price: self.ask_price,
        })
    }
}

/// SQLite-backed store; the connection is opened once and closed on drop.
pub struct SqliteContractStore {
    connection: Connection,
}

impl SqliteContractStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening contract store");
        Self::initialize(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(connection: Connection) -> Result<Self> {
        connection.execute_batch(CREATE_TABLE)?;
        Ok(Self { connection })
    }
}

impl ContractStore for SqliteContractStore {
    fn insert(&self, contracts: &[OptionContract]) -> Result<usize> {
        for contract in contracts {
            contract.check()?;
        }

        let tx = self.connection.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_CONTRACT)?;
            for contract in contracts {
                stmt.execute(params![
                    contract.symbol,
                    contract.option_type.as_str(),
                    contract.strike_price,
                    contract.expiration_date.format(DATE_FORMAT).to_string(),
                    contract.bid_price,
                    contract.ask_price,
                ])?;
            }
        }
        tx.commit()?;

        debug!(count = contracts.len(), "inserted option contracts");
        Ok(contracts.len())
    }

    fn retrieve(&self, symbol: &str) -> Result<Vec<OptionContract>> {
        let mut stmt = self.connection.prepare_cached(SELECT_BY_SYMBOL)?;
        let rows = stmt.query_map(params![symbol], StoredRow::from_row)?;

        let contracts = rows
            .map(|row| row.map_err(ChainError::from).and_then(StoredRow::into_contract))
            .collect::<Result<Vec<_>>>()?;
        Ok(contracts)
    }
}

/// Volatile store, mostly for wiring and tests.
#[derive(Default)]
pub struct InMemoryContractStore {
    rows: RwLock<Vec<OptionContract>>,
}

impl InMemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContractStore for InMemoryContractStore {
    fn insert(&self, contracts: &[OptionContract]) -> Result<usize> {
        for contract in contracts {
            contract.check()?;
        }

        let mut rows = self.rows.write().map_err(|_| ChainError::Poisoned)?;
        let first_id = rows.len() as i64 + 1;
        rows.extend(contracts.iter().enumerate().map(|(i, contract)| OptionContract {
            id: Some(first_id + i as i64),
            ..contract.clone()
        }));
        Ok(contracts.len())
    }

    fn retrieve(&self, symbol: &str) -> Result<Vec<OptionContract>> {
        let rows = self.rows.read().map_err(|_| ChainError::Poisoned)?;
        Ok(rows
            .iter()
            .filter(|contract| contract.symbol == symbol)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionType;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()
    }

    fn contracts() -> Vec<OptionContract> {
        vec![
            OptionContract::new("KHODRO", OptionType::Call, 2000.0, expiry())
                .with_quotes(Some(150.0), Some(170.0)),
            OptionContract::new("KHODRO", OptionType::Put, 2200.0, expiry()).with_quotes(Some(90.0), None),
            OptionContract::new("FOLD", OptionType::Call, 5000.0, expiry()),
        ]
    }

    fn round_trip(store: &impl ContractStore) {
        assert_eq!(store.insert(&contracts()).unwrap(), 3);

        let khodro = store.retrieve("KHODRO").unwrap();
        assert_eq!(khodro.len(), 2);
        assert_eq!(khodro[0].id, Some(1));
        assert_eq!(khodro[1].id, Some(2));
        assert_eq!(
            OptionContract { id: None, ..khodro[0].clone() },
            contracts()[0]
        );
        assert_eq!(khodro[1].option_type, OptionType::Put);
        assert_eq!(khodro[1].bid_price, Some(90.0));
        assert_eq!(khodro[1].ask_price, None);

        let fold = store.retrieve("FOLD").unwrap();
        assert_eq!(fold.len(), 1);
        assert_eq!(fold[0].id, Some(3));

        assert!(store.retrieve("UNKNOWN").unwrap().is_empty());
    }

    fn rejects_whole_batch(store: &impl ContractStore) {
        let mut batch = contracts();
        batch.push(OptionContract::new("KHODRO", OptionType::Call, 0.0, expiry()));

        assert!(matches!(store.insert(&batch), Err(ChainError::InvalidRecord(_))));
        assert!(store.retrieve("KHODRO").unwrap().is_empty());
    }

    #[test]
    fn sqlite_round_trip() {
        round_trip(&SqliteContractStore::open_in_memory().unwrap());
    }

    #[test]
    fn in_memory_round_trip() {
        round_trip(&InMemoryContractStore::new());
    }

    #[test]
    fn sqlite_rejects_whole_batch() {
        rejects_whole_batch(&SqliteContractStore::open_in_memory().unwrap());
    }

    #[test]
    fn in_memory_rejects_whole_batch() {
        rejects_whole_batch(&InMemoryContractStore::new());
    }

    #[test]
    fn sqlite_file_survives_reopen() {
        let path = std::env::temp_dir().join(format!("chain-store-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let store = SqliteContractStore::open(&path).unwrap();
            store.insert(&contracts()).unwrap();
        }
        let store = SqliteContractStore::open(&path).unwrap();
        assert_eq!(store.retrieve("KHODRO").unwrap().len(), 2);

        drop(store);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn undecodable_row_is_reported() {
        let store = SqliteContractStore::open_in_memory().unwrap();
        store
            .connection
            .execute(
                "INSERT INTO option_contracts (symbol, option_type, strike_price, expiration_date)
                 VALUES ('KHODRO', 'call', 2000.0, 'someday')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.retrieve("KHODRO"),
            Err(ChainError::InvalidRecord(_))
        ));
    }
}
