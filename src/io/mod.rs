/// Copies the textures of an export next to the output file.
pub mod asset_copy;

/// Reading, converting and writing texture images.
pub mod texture_io;

/// Loads obj files into the in-memory scene model.
pub mod obj;

/// Format dispatch for reading and writing scene files.
pub mod scene_io;
