pub mod coerce;
pub mod encoding;
pub mod observation;
pub mod panel;
pub mod schema;
pub mod table;
