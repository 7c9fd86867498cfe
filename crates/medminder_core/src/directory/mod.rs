//! Static reference directories bundled with the app.

pub mod pharmacy;
