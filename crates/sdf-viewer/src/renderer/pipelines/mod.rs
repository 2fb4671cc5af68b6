pub mod raymarch;
pub mod spheres;
