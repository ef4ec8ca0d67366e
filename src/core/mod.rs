/// Host-facing capability traits the encoder reads through.
pub mod view;

/// In-memory scene hierarchy.
pub mod scene;

pub mod mesh;
pub mod material;
pub mod texture;

/// Small vector and color types, resource identity, and the config trait.
pub mod shared;
