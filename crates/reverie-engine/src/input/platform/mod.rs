//! Native windowing glue.

pub mod winit;

pub use self::winit::WinitTranslator;
