//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lifecycle transitions are
//! conditional writes keyed on the expected prior status; a write that
//! loses a race affects zero rows and returns `None`.

pub mod application_repo;
pub mod deadline_extension_repo;
pub mod event_repo;
pub mod spot_repo;

pub use application_repo::ApplicationRepo;
pub use deadline_extension_repo::DeadlineExtensionRepo;
pub use event_repo::EventRepo;
pub use spot_repo::SpotRepo;
