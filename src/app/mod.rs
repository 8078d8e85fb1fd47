// Application layer - Use case interactors

pub mod container;
pub mod extraction_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use extraction_interactor::{ExtractionInteractor, RunHandle, RunReport};
