pub mod maintenance;
pub mod parts;
pub mod projects;
pub mod reports;
pub mod transfer;
pub mod util;
pub mod workspace;

pub use maintenance::*;
pub use parts::*;
pub use projects::*;
pub use reports::*;
pub use transfer::*;
pub use util::*;
pub use workspace::*;
