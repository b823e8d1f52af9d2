// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod child;
pub mod detail;
pub mod format;
pub mod ids;
pub mod labels;
pub mod layout;
pub mod node;
pub mod projection;
pub mod registry;
pub mod request;
pub mod search;
pub mod session;

pub use child::{
    ChildLoader, ChildView, ChildViewMode, DetailContext, DetailRenderer, LoadContext, RowLoader,
};
pub use detail::DetailItem;
pub use ids::*;
pub use layout::Viewport;
pub use node::{Node, NodeError, ValueClass, to_node};
pub use projection::{ProjectionError, TableData};
pub use registry::Registry;
pub use request::{PendingRequest, RequestCoordinator, RequestKind, RequestTarget};
pub use session::{
    Clipboard, DetailFrame, Frame, FrameKind, Key, LoadJob, LoadOutcome, Session, SessionCommand,
    SessionEvent, SessionOptions, StatusRow, TableFrame, TextFrame,
};
