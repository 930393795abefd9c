pub mod document;
pub mod event;
pub mod focus;
pub mod node;

pub use document::{Document, KeyListener, ListenerId};
pub use event::{Key, KeyEvent, KeyEventKind, Modifiers};
pub use focus::{collect_focusable, first_focusable, is_focusable};
pub use node::{Node, NodeKey};
