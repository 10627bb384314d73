use uuid::Uuid;

/// Where an operation originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Api,
    System,
}

/// Context that flows through service and store layers.
///
/// Carries the information needed for logging and audit attribution. The
/// calling layer (HTTP, job runner, bootstrap) constructs one per operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Unique identifier for this operation (for tracing across layers)
    pub request_id: Uuid,

    /// Actor who initiated the operation
    pub actor_id: String,

    /// Source of the operation
    pub source: RequestSource,
}

impl RequestContext {
    /// Context for an API-originated operation acting as the given user.
    pub fn for_user(actor_id: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor_id: actor_id.into(),
            source: RequestSource::Api,
        }
    }

    /// Context for internal operations (seeding, maintenance).
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor_id: format!("system:{}", operation_name),
            source: RequestSource::System,
        }
    }

}
