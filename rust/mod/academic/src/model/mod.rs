mod shift;
mod student;
mod subject;
mod teacher;

pub use shift::Shift;
pub use student::Student;
pub use subject::{Subject, SubjectRef};
pub use teacher::Teacher;
