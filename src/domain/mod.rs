//! Domain layer: swap records, event windows, the swap index and the
//! event system.
//!
//! [`SwapIndex`] is the only stateful component here; everything else is
//! a value type or a pure helper.

pub mod event_bus;
pub mod event_window;
pub mod index_event;
pub mod swap_index;
pub mod swap_record;
pub mod symbol;

pub use event_bus::EventBus;
pub use event_window::{EventWindow, load_event_windows, parse_event_windows};
pub use index_event::IndexEvent;
pub use swap_index::{PairStats, SwapIndex};
pub use swap_record::{SwapLeg, SwapRecord, SwapRole, decimal_to_f64};
pub use symbol::{PairKey, canonical_symbol, normalize_coin};
