pub mod file;
pub mod job;
pub mod request;
pub mod response;
pub mod tool;

pub use file::*;
pub use job::*;
pub use request::*;
pub use response::*;
pub use tool::*;
