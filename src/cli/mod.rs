pub mod convert;
pub mod favorites;
pub mod metals;
pub mod picker;
pub mod rates;
pub mod setup;
pub mod ui;
pub mod watch;
