pub mod dashboard;
pub mod event;
pub mod pet;
pub mod profile;
pub mod roadmap;
pub mod session;
pub mod settings;
pub mod task;

pub use dashboard::*;
pub use event::*;
pub use pet::*;
pub use profile::*;
pub use roadmap::*;
pub use session::*;
pub use settings::*;
pub use task::*;
