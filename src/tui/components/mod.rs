//! # TUI Components
//!
//! Two kinds of component live here:
//!
//! - **Stateless**, rebuilt every frame from props: [`TitleBar`],
//!   [`MessageView`](message::MessageView)
//! - **Stateful**, kept in `TuiState` across frames: [`InputBox`],
//!   [`MessageListState`] (driven through the per-frame [`MessageList`])
//!
//! Components receive data as props instead of reaching into `App`, so each
//! one can be rendered against a `TestBackend` in isolation.
//!
//! ```text
//! components/
//! ├── title_bar.rs     header line
//! ├── message.rs       one transcript entry
//! ├── message_list.rs  scrollable transcript
//! └── input_box/       draft editor
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub use input_box::{InputBox, InputEvent};

pub mod message;

pub mod message_list;
pub use message_list::{MessageList, MessageListState};
