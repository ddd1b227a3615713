pub mod encoding;
pub mod software_surface;
pub mod source_selection;
pub mod surface_sizing;
