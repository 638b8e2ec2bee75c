use service::uuid_service::UuidService;
use tracing::trace;
use uuid::Uuid;

pub struct UuidServiceImpl;

impl UuidService for UuidServiceImpl {
    fn new_uuid(&self, usage: &str) -> Uuid {
        let id = Uuid::new_v4();
        trace!("New id {} for {}", id, usage);
        id
    }
}
