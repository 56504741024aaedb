/// Role-driven visibility: field redaction and ownership scoping
pub mod visibility;

pub use visibility::{can_modify_exam, can_view_exam, redact, ResourceKind};
