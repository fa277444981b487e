/// Overlay model: annotations, the surface they live on, and the renderer that fills it.
pub mod annotation;
pub mod renderer;
pub mod surface;

pub use annotation::{Annotation, BoxAnnotation, Color, Label, PathAnnotation, Stroke, TextAlignment};
pub use renderer::{OverlayRenderer, OverlayStyle};
pub use surface::{OverlaySurface, SurfaceSnapshot, SurfaceTransaction};
