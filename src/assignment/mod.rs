pub mod partition;
pub mod reference;
pub mod resolver;
pub mod save;
pub mod selection;
pub mod session;
pub mod summary;

pub use partition::{Direction, LocationPartition};
pub use reference::{load_reference_data, ReferenceData};
pub use resolver::{resolve_locations, LocationSnapshot};
pub use save::save_assignment;
pub use selection::{LocationTicket, Selection, SelectionKey, SummaryTicket};
pub use session::{Applied, AssignmentSession, Notice, SessionOptions, Severity};
pub use summary::resolve_summary;
