pub mod delivery;
pub mod events;
pub mod listing;
pub mod opportunity;
pub mod order;

pub use delivery::*;
pub use events::*;
pub use listing::*;
pub use opportunity::*;
pub use order::*;
