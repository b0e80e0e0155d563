// Application layer - Use case interactors

pub mod container;
pub mod extract_interactor;
pub mod highlight_interactor;
pub mod inspect_interactor;

// Re-export interactors
pub use extract_interactor::ExtractInteractor;
pub use highlight_interactor::{
    HighlightInteractor, PipelineSettings, RunReport, RunRequest, SelectRequest, SelectionOutcome,
};
pub use inspect_interactor::{InspectInteractor, SourceReport};
