pub mod memory;
pub mod user_store;

pub use memory::MemoryUserStore;
pub use user_store::{MongoUserStore, UserStore, USERS_COLLECTION};

use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

const DEFAULT_DB_NAME: &str = "MERNAPP25";

const DUPLICATE_KEY_CODE: i32 = 11000;

/// E11000: a write hit the unique index, or the index cannot be built
/// because duplicates are already stored.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// MongoDB connection handle, created once at startup and injected into the
/// stores that need it. Cloning shares the driver's connection pool.
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
    /// Set once the unique email index is known to exist. Shared by clones.
    indexes: Arc<OnceCell<()>>,
}

impl MongoDB {
    /// Builds the client without touching the network (beyond SRV lookups
    /// for `mongodb+srv://` URIs). Use [`MongoDB::ping`] to verify the server.
    pub async fn new(uri: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        // Defaults unless the URI sets connectTimeoutMS / serverSelectionTimeoutMS
        client_options
            .connect_timeout
            .get_or_insert(Duration::from_secs(5));
        client_options
            .server_selection_timeout
            .get_or_insert(Duration::from_secs(5));

        // Database name comes from the URI path, e.g. mongodb://host:27017/MERNAPP25
        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        Ok(Self {
            db,
            indexes: Arc::new(OnceCell::new()),
        })
    }

    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Makes sure the unique index on `users.email` exists. Only the first
    /// successful call talks to the server; failures leave it unset so the
    /// next caller tries again.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        self.indexes
            .get_or_try_init(|| self.create_indexes())
            .await
            .map(|_| ())
    }

    pub fn indexes_ready(&self) -> bool {
        self.indexes.initialized()
    }

    async fn create_indexes(&self) -> Result<(), mongodb::error::Error> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users.create_index(email_index).await?;
        log::info!("   ✅ Index ready: {}(email, unique)", USERS_COLLECTION);

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
