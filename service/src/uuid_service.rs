use mockall::automock;
use uuid::Uuid;

/// Source of ids and version stamps for new rows.
///
/// `usage` names the caller and the field, for example
/// `"queue-service::enqueue id"`, so mocks can tell the calls apart.
#[automock]
pub trait UuidService {
    fn new_uuid(&self, usage: &str) -> Uuid;
}
