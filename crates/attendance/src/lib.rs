use std::sync::Arc;

use storage::classes::ClassStore;
use storage::Storage;

pub mod service;
pub mod source;

use service::register::Register;
use service::reports::Reports;
use source::AttendanceSource;

/// Root service facade, one per application session.
#[derive(Clone)]
pub struct Attendance {
    pub reports: Reports,
    pub register: Register,
    pub classes: ClassStore,
}

impl Attendance {
    pub fn new(storage: Storage) -> Self {
        let source: Arc<dyn AttendanceSource> = Arc::new(storage.attendance);
        let reports = Reports::new(source.clone());
        let register = Register::new(source, reports.clone());
        Attendance {
            reports,
            register,
            classes: storage.classes,
        }
    }
}
