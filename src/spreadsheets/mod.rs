pub mod properties_xlsx;

pub use properties_xlsx::export_properties_xlsx;
