//! Per-field redaction and ownership predicates
//!
//! Redaction runs on the serialized representation just before it leaves the
//! service, keyed by resource kind and the viewer's role. A redaction path is
//! a dot-separated chain of field names where a `*` segment fans out over
//! every element of an array. Removing a field that is already absent is a
//! no-op, so redaction is idempotent and tolerant of partial documents.

use crate::models::{Principal, UserRole};
use serde_json::Value;
use uuid::Uuid;

/// Resource kinds with role-dependent field visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Exam,
    ExamResult,
}

/// Fields hidden from the given role, as redaction paths
fn hidden_paths(kind: ResourceKind, role: UserRole) -> &'static [&'static str] {
    match (kind, role) {
        // Students and parents must never see answer keys, whether the exam
        // document nests them per question or carries a flat key.
        (ResourceKind::Exam, UserRole::Student) | (ResourceKind::Exam, UserRole::Parent) => {
            &["correctAnswer", "questions.*.correctAnswer"]
        }
        _ => &[],
    }
}

/// Strip fields the viewer's role is not allowed to see
pub fn redact(kind: ResourceKind, role: UserRole, document: &mut Value) {
    for path in hidden_paths(kind, role) {
        let segments: Vec<&str> = path.split('.').collect();
        remove_path(document, &segments);
    }
}

fn remove_path(value: &mut Value, segments: &[&str]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if *head == "*" {
        if let Value::Array(items) = value {
            for item in items {
                if rest.is_empty() {
                    *item = Value::Null;
                } else {
                    remove_path(item, rest);
                }
            }
        }
        return;
    }

    if let Value::Object(map) = value {
        if rest.is_empty() {
            map.remove(*head);
        } else if let Some(child) = map.get_mut(*head) {
            remove_path(child, rest);
        }
    }
}

/// Whether a principal may view an exam belonging to the given class
///
/// Students are restricted to exams of their own class; teachers, admins and
/// parents are scoped elsewhere (parents through their linked students).
pub fn can_view_exam(principal: &Principal, exam_class: Uuid) -> bool {
    match principal.role {
        UserRole::Student => principal.student_class == Some(exam_class),
        UserRole::Admin | UserRole::Teacher | UserRole::Parent => true,
    }
}

/// Whether a principal may mutate an exam authored by `author`
///
/// Teachers may only touch their own exams; admins may touch any.
pub fn can_modify_exam(principal: &Principal, author: Uuid) -> bool {
    match principal.role {
        UserRole::Admin => true,
        UserRole::Teacher => principal.id == author,
        UserRole::Student | UserRole::Parent => false,
    }
}
