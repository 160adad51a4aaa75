use bson::doc;
use eyre::Result;
use futures_util::TryStreamExt as _;
use model::classes::{Class, Student};
use mongodb::Collection;

use crate::db::Db;

const CLASSES_COLLECTION: &str = "classes";
const STUDENTS_COLLECTION: &str = "students";

#[derive(Clone)]
pub struct ClassStore {
    classes: Collection<Class>,
    students: Collection<Student>,
}

impl ClassStore {
    pub(crate) fn new(db: &Db) -> Self {
        ClassStore {
            classes: db.collection(CLASSES_COLLECTION),
            students: db.collection(STUDENTS_COLLECTION),
        }
    }

    pub async fn classes(&self) -> Result<Vec<Class>> {
        Ok(self.classes.find(doc! {}).await?.try_collect().await?)
    }

    pub async fn students(&self, class_id: &str) -> Result<Vec<Student>> {
        Ok(self
            .students
            .find(doc! { "class_id": class_id })
            .await?
            .try_collect()
            .await?)
    }
}
