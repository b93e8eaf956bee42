pub mod assignment;
pub mod attendance;
pub mod base;
pub mod class;
pub mod enrollment;
pub mod grade;
pub mod student;

pub use assignment::{AssignmentDao, AssignmentInput};
pub use attendance::{AttendanceDao, AttendanceFilter, AttendanceInput};
pub use base::{BaseDao, DaoError, DaoResult};
pub use class::{ClassDao, ClassInput};
pub use enrollment::EnrollmentDao;
pub use grade::{GradeDao, GradeInput};
pub use student::{StudentDao, StudentInput};
