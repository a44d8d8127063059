//! Page-side controller for the spell overlay.
//!
//! [`SpellController`] owns everything that lives for one page load: the
//! debounce and sentence-end trigger, the result cache, the ignore set,
//! the tooltip and the setup notice. Hosts feed it DOM events and timer
//! polls; checks travel over a [`extensions_bridge::MessageChannel`].

pub mod api;
pub mod errors;
pub mod events;
pub mod model;
pub mod notice;
pub mod policy;
pub mod timer;
pub mod tooltip;
pub mod trigger;

pub use api::{SpellController, SpellControllerBuilder};
pub use errors::ControllerError;
pub use events::ControllerEvent;
pub use model::{CheckOutcome, CheckRequest, CheckStart, CheckTicket, ClickOutcome, SkipReason};
pub use notice::SetupNotice;
pub use policy::InteractionPolicy;
pub use tooltip::{Tooltip, TooltipPhase};
pub use trigger::SmartTrigger;
