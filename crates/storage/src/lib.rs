pub mod attendance;
pub mod classes;
pub mod db;

use attendance::AttendanceStore;
use classes::ClassStore;
use db::Db;
use eyre::Result;

const DB_NAME: &str = "kindergarten";

#[derive(Clone)]
pub struct Storage {
    pub db: Db,
    pub attendance: AttendanceStore,
    pub classes: ClassStore,
}

impl Storage {
    pub async fn new(uri: &str) -> Result<Self> {
        Storage::with_db_name(uri, DB_NAME).await
    }

    pub async fn with_db_name(uri: &str, db_name: &str) -> Result<Self> {
        let db = Db::new(uri, db_name).await?;
        let attendance = AttendanceStore::new(&db).await?;
        let classes = ClassStore::new(&db);

        Ok(Storage {
            db,
            attendance,
            classes,
        })
    }
}
