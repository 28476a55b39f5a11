// ==================== INDEX BOOTSTRAP ====================
// Connects to MongoDB in the background and creates the unique email index.
// If the server is unreachable at startup the HTTP server keeps running and
// this job retries until the index exists. Writes that need the index create
// it themselves (see MongoUserStore), so this job only warms it up.

use crate::database::{is_duplicate_key, MongoDB};
use tokio::time::{interval, Duration};

const RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Spawns the bootstrap task. The first attempt runs immediately.
pub fn start_index_bootstrap(db: MongoDB) {
    tokio::spawn(async move {
        let mut ticker = interval(RETRY_INTERVAL);

        loop {
            // First tick completes immediately
            ticker.tick().await;

            if db.indexes_ready() {
                log::debug!("Index already created by a write, bootstrap done");
                break;
            }

            match bootstrap(&db).await {
                Ok(()) => {
                    log::info!("✅ MongoDB connected successfully");
                    break;
                }
                Err(e) if is_duplicate_key(&e) => {
                    log::error!(
                        "❌ Unique email index cannot be built: duplicate emails already stored. \
                         Remove the duplicates; creates and updates fail until then: {}",
                        e
                    );
                    break;
                }
                Err(e) => {
                    log::error!(
                        "❌ MongoDB unavailable, serving in degraded mode (retry in {}s): {}",
                        RETRY_INTERVAL.as_secs(),
                        e
                    );
                }
            }
        }
    });
}

async fn bootstrap(db: &MongoDB) -> Result<(), mongodb::error::Error> {
    db.ping().await?;
    db.ensure_indexes().await
}
