//! ledgerlens-report: collaborator interfaces (narrator, chart renderer)
//! and the monthly report assembler.

pub mod charts;
pub mod html;
pub mod narrator;
pub mod pipeline;

pub use charts::{ChartFragment, ChartRenderer, ChartRequest, EchartsRenderer};
pub use html::Section;
pub use narrator::{ChatNarrator, Narrator, NarratorConfig, OfflineNarrator};
pub use pipeline::{build_report, PipelineConfig, ReportOutcome, SYSTEM_PROMPT};
