pub mod session;

pub use session::FlowEditorSession;
