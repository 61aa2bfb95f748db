pub mod course;
pub mod dates;
pub mod days;
pub mod guideline;
pub mod macros;
pub mod reference;
pub mod schedule;
pub mod term;
pub mod time;

pub use course::*;
pub use days::DayPattern;
pub use guideline::*;
pub use reference::*;
pub use schedule::*;
pub use term::*;
pub use time::*;
