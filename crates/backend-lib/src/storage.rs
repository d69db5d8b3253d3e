// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs as tokio_fs, sync::Mutex};

use crate::error::AppError;
use crate::models::{NewCalculation, NewRegistration, NewUser, UserRecord};
use kokupocket_common::{Calculation, StudentRegistration, UserId};

const USERS_FILE: &str = "users.json";
const REGISTRATIONS_FILE: &str = "registrations.json";
const CALCULATIONS_FILE: &str = "calculations.json";

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a user. Fails with [`AppError::DuplicateIdentifier`] when the
    /// matric or IC is already taken, without saying which.
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// Look up a user by matric
    async fn find_user_by_matric(&self, matric: &str) -> Result<Option<UserRecord>, AppError>;

    /// Look up a user by internal id
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, AppError>;

    /// Store a student registration
    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<StudentRegistration, AppError>;

    /// A user's registrations, newest first
    async fn list_registrations(&self, user_id: UserId)
        -> Result<Vec<StudentRegistration>, AppError>;

    /// Store a calculation
    async fn insert_calculation(&self, calculation: NewCalculation)
        -> Result<Calculation, AppError>;

    /// A user's calculations, newest first, optionally capped at `limit`
    async fn list_calculations(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Calculation>, AppError>;
}

/// One JSON document per collection
#[derive(Serialize, Deserialize)]
struct Table<T> {
    next_id: i64,
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Flat-file implementation of the Storage trait
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    /// Serializes read-modify-write cycles; uniqueness depends on it
    write_lock: Arc<Mutex<()>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_table<T: DeserializeOwned>(&self, file: &str) -> Result<Table<T>, AppError> {
        let path = self.root.join(file);
        match tokio_fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Table::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a temp file + rename so readers never see a partial table.
    async fn write_table<T: Serialize>(&self, file: &str, table: &Table<T>) -> Result<(), AppError> {
        let path = self.root.join(file);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(table)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut table: Table<UserRecord> = self.read_table(USERS_FILE).await?;

        if table
            .rows
            .iter()
            .any(|existing| existing.matric == user.matric || existing.ic == user.ic)
        {
            return Err(AppError::DuplicateIdentifier);
        }

        let record = UserRecord {
            id: table.allocate_id(),
            matric: user.matric,
            name: user.name,
            ic: user.ic,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table.rows.push(record.clone());
        self.write_table(USERS_FILE, &table).await?;

        Ok(record)
    }

    async fn find_user_by_matric(&self, matric: &str) -> Result<Option<UserRecord>, AppError> {
        let table: Table<UserRecord> = self.read_table(USERS_FILE).await?;
        Ok(table.rows.into_iter().find(|user| user.matric == matric))
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, AppError> {
        let table: Table<UserRecord> = self.read_table(USERS_FILE).await?;
        Ok(table.rows.into_iter().find(|user| user.id == id))
    }

    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<StudentRegistration, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut table: Table<StudentRegistration> = self.read_table(REGISTRATIONS_FILE).await?;

        let record = StudentRegistration {
            id: table.allocate_id(),
            user_id: registration.user_id,
            name: registration.name,
            matric: registration.matric,
            ic: registration.ic,
            timestamp: Utc::now(),
        };
        table.rows.push(record.clone());
        self.write_table(REGISTRATIONS_FILE, &table).await?;

        Ok(record)
    }

    async fn list_registrations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StudentRegistration>, AppError> {
        let table: Table<StudentRegistration> = self.read_table(REGISTRATIONS_FILE).await?;
        let mut rows: Vec<_> = table
            .rows
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        newest_first(&mut rows, |r| (r.timestamp, r.id));
        Ok(rows)
    }

    async fn insert_calculation(
        &self,
        calculation: NewCalculation,
    ) -> Result<Calculation, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut table: Table<Calculation> = self.read_table(CALCULATIONS_FILE).await?;

        let record = Calculation {
            id: table.allocate_id(),
            user_id: calculation.user_id,
            attendance: calculation.attendance,
            assessment: calculation.assessment,
            involvement: calculation.involvement,
            achievement: calculation.achievement,
            position: calculation.position,
            bonus: calculation.bonus,
            total: calculation.total,
            final_percent: calculation.final_percent,
            timestamp: Utc::now(),
        };
        table.rows.push(record.clone());
        self.write_table(CALCULATIONS_FILE, &table).await?;

        Ok(record)
    }

    async fn list_calculations(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Calculation>, AppError> {
        let table: Table<Calculation> = self.read_table(CALCULATIONS_FILE).await?;
        let mut rows: Vec<_> = table
            .rows
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect();
        newest_first(&mut rows, |c| (c.timestamp, c.id));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}
