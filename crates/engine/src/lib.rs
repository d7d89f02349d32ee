pub mod cell;
pub mod cell_id;
pub mod dep_graph;
pub mod edit;
pub mod error;
pub mod events;
pub mod host;
pub mod input;
pub mod layout;
pub mod model;
pub mod numfmt;
pub mod render;
pub mod router;
pub mod selection;
pub mod view;

#[cfg(test)]
pub mod harness;

pub use cell::{CellPayload, GridCell};
pub use dep_graph::{DependencyCallback, DependencyId};
pub use edit::{ControlId, EditorEvent, EditorFactory, EditorSpec, EditorValue};
pub use error::{GridError, GridResult};
pub use events::{GridNotification, NotificationCollector};
pub use host::WindowHost;
pub use input::{CursorShape, Key, MouseState};
pub use layout::{Layout, ScrolledViewport, Viewport};
pub use model::GridDataModel;
pub use render::Surface;
pub use router::{GridMessage, MessageReply, WindowEvent};
pub use view::{CellSnapshot, GridDimensions, GridView, ScrollRequest};
