use std::sync::Arc;

use classhub_config::Settings;
use classhub_db::RecordStore;
use classhub_services::{
    ReminderScheduler, ReminderService,
    dao::{AssignmentDao, AttendanceDao, ClassDao, EnrollmentDao, GradeDao, StudentDao},
    notifications::{NotificationService, NotificationSink},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn RecordStore>,
    pub students: Arc<StudentDao>,
    pub classes: Arc<ClassDao>,
    pub enrollments: Arc<EnrollmentDao>,
    pub assignments: Arc<AssignmentDao>,
    pub grades: Arc<GradeDao>,
    pub attendance: Arc<AttendanceDao>,
    pub notifications: Arc<NotificationService>,
    pub reminders: Arc<ReminderService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifications: Arc<NotificationService>,
        settings: Settings,
    ) -> Self {
        let students = Arc::new(StudentDao::new(store.clone()));
        let classes = Arc::new(ClassDao::new(store.clone()));
        let enrollments = Arc::new(EnrollmentDao::new(store.clone()));
        let assignments = Arc::new(AssignmentDao::new(store.clone()));
        let grades = Arc::new(GradeDao::new(store.clone()));
        let attendance = Arc::new(AttendanceDao::new(store.clone()));
        let reminders = Arc::new(ReminderService::new(
            assignments.clone(),
            notifications.clone() as Arc<dyn NotificationSink>,
        ));

        Self {
            settings,
            store,
            students,
            classes,
            enrollments,
            assignments,
            grades,
            attendance,
            notifications,
            reminders,
        }
    }

    /// Scheduler wired to the same store, assignments and notifications as
    /// the HTTP handlers.
    pub fn scheduler(&self) -> ReminderScheduler {
        ReminderScheduler::new(
            self.store.clone(),
            self.assignments.clone(),
            self.notifications.clone() as Arc<dyn NotificationSink>,
            self.settings.reminders.clone(),
        )
    }
}
