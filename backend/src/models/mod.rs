pub mod assignment;
pub mod macros;
pub mod scope;
pub mod series;
pub mod shift;
pub mod time;

pub use assignment::*;
pub use scope::*;
pub use series::*;
pub use shift::*;
pub use time::*;
