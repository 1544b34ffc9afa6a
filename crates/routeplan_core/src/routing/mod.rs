//! Provider-backed route ordering with an explicit "unavailable" outcome.

pub mod external;
