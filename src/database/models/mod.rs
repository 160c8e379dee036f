pub mod assessment;
pub mod assignment;
pub mod attendance;
pub mod course;
pub mod course_material;
pub mod institution;
pub mod message;
pub mod notification;
pub mod quiz;
pub mod school_class;
pub mod student;
pub mod teacher;
pub mod user;

pub use assessment::Assessment;
pub use assignment::Assignment;
pub use attendance::AttendanceRecord;
pub use course::Course;
pub use course_material::CourseMaterial;
pub use institution::Institution;
pub use message::Message;
pub use notification::Notification;
pub use quiz::Quiz;
pub use school_class::SchoolClass;
pub use student::Student;
pub use teacher::Teacher;
pub use user::User;
